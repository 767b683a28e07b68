use crate::error::{FertilogError, Result};
use crate::models::ReferenceData;
use std::path::Path;
use tracing::{info, warn};

/// Load the reference tables from a JSON file.
pub fn load_reference(path: &Path) -> Result<ReferenceData> {
    if !path.exists() {
        return Err(FertilogError::NotFound(format!(
            "Reference data not found at {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let data: ReferenceData = serde_json::from_str(&content)?;

    info!(
        path = %path.display(),
        usage_norms = data.usage_norms.len(),
        companies = data.companies.len(),
        parcels = data.parcels.len(),
        products = data.products.len(),
        "Reference data loaded"
    );

    let orphaned = data
        .usage_norms
        .iter()
        .filter(|n| data.parcel(&n.parcel_id).is_none())
        .count();
    if orphaned > 0 {
        warn!(orphaned, "Usage norms refer to parcels missing from the reference data");
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fertilog-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_reference_json() {
        let path = temp_file(
            "reference.json",
            r#"{"bedrijven": [{"id": 1, "naam": "De Hoeve"}],
                "meststoffen": [{"id": 2, "naam": "KAS", "n": 27, "toepassing": "kunstmest"}]}"#,
        );
        let data = load_reference(&path).unwrap();
        assert_eq!(data.companies.len(), 1);
        assert_eq!(data.products[0].nitrogen_pct, 27.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn loads_uuid_keyed_reference_json() {
        let path = temp_file(
            "reference-uuid.json",
            r#"{"gebruiksnormen": [{"id": "7d3f0a2e-8c41-4b6a-9e2d-1f5a6b7c8d90", "jaar": 2024,
                                    "bedrijf_id": "9b1c2d3e-0000-4000-8000-000000000001",
                                    "perceel_id": "4e5f6a7b-1111-4222-8333-444455556666",
                                    "gewas": "Mais", "oppervlakte": 2.5}],
                "bedrijven": [{"id": "9b1c2d3e-0000-4000-8000-000000000001", "naam": "De Hoeve"}],
                "percelen": [{"id": "4e5f6a7b-1111-4222-8333-444455556666", "naam": "Akker"}]}"#,
        );
        let data = load_reference(&path).unwrap();
        assert_eq!(data.usage_norms[0].company_id, "9b1c2d3e-0000-4000-8000-000000000001");
        assert_eq!(
            data.parcel_options(2024, "9b1c2d3e-0000-4000-8000-000000000001")[0].name,
            "Akker"
        );
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_reference(Path::new("/nonexistent/fertilog/reference.json")).unwrap_err();
        assert!(matches!(err, FertilogError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let path = temp_file("broken.json", "{\"bedrijven\": [");
        let err = load_reference(&path).unwrap_err();
        assert!(matches!(err, FertilogError::Json(_)));
        std::fs::remove_file(path).ok();
    }
}

use super::id::{deserialize_id, RecordId};
use serde::{Deserialize, Serialize};

/// Application type marking a product as animal manure.
pub const ANIMAL_MANURE: &str = "dierlijke mest";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerProduct {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: RecordId,
    #[serde(alias = "naam", alias = "meststof")]
    pub name: String,
    #[serde(alias = "n", default)]
    pub nitrogen_pct: f64,
    #[serde(alias = "p2o5", default)]
    pub phosphate_pct: f64,
    #[serde(alias = "k2o", default)]
    pub potassium_pct: f64,
    #[serde(alias = "toepassing", default)]
    pub application_type: Option<String>,
}

impl FertilizerProduct {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            nitrogen_pct: 0.0,
            phosphate_pct: 0.0,
            potassium_pct: 0.0,
            application_type: None,
        }
    }

    pub fn with_npk(mut self, n: f64, p2o5: f64, k2o: f64) -> Self {
        self.nitrogen_pct = n;
        self.phosphate_pct = p2o5;
        self.potassium_pct = k2o;
        self
    }

    pub fn with_application_type(mut self, application_type: &str) -> Self {
        self.application_type = Some(application_type.to_string());
        self
    }

    pub fn is_animal_manure(&self) -> bool {
        self.application_type
            .as_deref()
            .map_or(false, |t| t.trim().eq_ignore_ascii_case(ANIMAL_MANURE))
    }

    /// One-line composition summary as shown next to the product picker.
    pub fn composition_label(&self) -> String {
        if self.is_animal_manure() {
            "Animal manure - enter N, P2O5 and K2O manually".to_string()
        } else {
            format!(
                "N: {}% - P2O5: {}% - K2O: {}%",
                self.nitrogen_pct, self.phosphate_pct, self.potassium_pct
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animal_manure_detection_is_case_insensitive() {
        let p = FertilizerProduct::new("1", "Rundveedrijfmest").with_application_type("Dierlijke Mest");
        assert!(p.is_animal_manure());

        let p = FertilizerProduct::new("2", "KAS 27%").with_application_type("kunstmest");
        assert!(!p.is_animal_manure());

        let p = FertilizerProduct::new("3", "Unknown");
        assert!(!p.is_animal_manure());
    }

    #[test]
    fn deserializes_page_field_names() {
        let json = r#"{"id": 7, "naam": "KAS", "n": 27, "p2o5": 0, "k2o": 0, "toepassing": "kunstmest"}"#;
        let p: FertilizerProduct = serde_json::from_str(json).unwrap();
        assert_eq!(p.name, "KAS");
        assert_eq!(p.nitrogen_pct, 27.0);
        assert_eq!(p.application_type.as_deref(), Some("kunstmest"));
    }

    #[test]
    fn composition_label_for_mineral_fertilizer() {
        let p = FertilizerProduct::new("1", "NPK").with_npk(12.0, 10.0, 18.0);
        assert_eq!(p.composition_label(), "N: 12% - P2O5: 10% - K2O: 18%");
    }
}

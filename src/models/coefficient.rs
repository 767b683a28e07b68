use serde::{Deserialize, Deserializer, Serialize};

/// One row of the regulatory working-coefficient table.
///
/// The API serves rows from two table generations: the older one carries a
/// year (`jaar`, `meststof`, `werking`), the newer one does not
/// (`meststof_naam`, `werking_pct`). Both deserialize into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCoefficientEntry {
    #[serde(rename = "jaar", default)]
    pub year: Option<i32>,
    #[serde(rename = "meststof", alias = "meststof_naam", default)]
    pub manure_category: String,
    #[serde(
        rename = "toepassing",
        default,
        deserialize_with = "deserialize_use_case"
    )]
    pub use_case: String,
    #[serde(
        rename = "werking",
        alias = "werking_pct",
        default,
        deserialize_with = "deserialize_pct"
    )]
    pub effectiveness_pct: f64,
}

impl WorkingCoefficientEntry {
    pub fn new(year: Option<i32>, manure_category: &str, use_case: &str, pct: f64) -> Self {
        Self {
            year,
            manure_category: manure_category.to_string(),
            use_case: normalize_use_case(use_case),
            effectiveness_pct: pct,
        }
    }

    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.year.map(|y| y.to_string()).unwrap_or_else(|| "*".into()),
            self.manure_category,
            if self.use_case.is_empty() {
                "none"
            } else {
                &self.use_case
            }
        )
    }
}

/// Blank, `NaN` and `None` qualifiers all mean "no use case".
pub fn normalize_use_case(value: &str) -> String {
    let s = value.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        s.to_string()
    }
}

fn deserialize_use_case<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map(normalize_use_case).unwrap_or_default())
}

fn deserialize_pct<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_placeholder_use_cases() {
        assert_eq!(normalize_use_case(""), "");
        assert_eq!(normalize_use_case("  "), "");
        assert_eq!(normalize_use_case("NaN"), "");
        assert_eq!(normalize_use_case("None"), "");
        assert_eq!(normalize_use_case(" Op klei en veen "), "Op klei en veen");
    }

    #[test]
    fn deserializes_legacy_rows() {
        let json = r#"[
            {"jaar": 2024, "meststof": "Drijfmest van varkens", "toepassing": "NaN", "werking": 60.0},
            {"jaar": null, "meststof_naam": "Compost", "toepassing": null, "werking_pct": null}
        ]"#;
        let rows: Vec<WorkingCoefficientEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].year, Some(2024));
        assert_eq!(rows[0].use_case, "");
        assert_eq!(rows[0].effectiveness_pct, 60.0);
        assert_eq!(rows[1].year, None);
        assert_eq!(rows[1].manure_category, "Compost");
        assert_eq!(rows[1].effectiveness_pct, 0.0);
    }

    #[test]
    fn key_marks_missing_parts() {
        let entry = WorkingCoefficientEntry::new(None, "Compost", "", 10.0);
        assert_eq!(entry.key(), "*-Compost-none");
    }
}

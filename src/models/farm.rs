use super::id::{deserialize_id, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: RecordId,
    #[serde(alias = "naam")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: RecordId,
    #[serde(alias = "naam", alias = "perceelnaam")]
    pub name: String,
    #[serde(alias = "oppervlakte", default)]
    pub area_ha: f64,
    #[serde(alias = "grondsoort", default)]
    pub soil_type: Option<String>,
}

impl Parcel {
    pub fn new(id: &str, name: &str, area_ha: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            area_ha,
            soil_type: None,
        }
    }

    pub fn with_soil(mut self, soil_type: &str) -> Self {
        self.soil_type = Some(soil_type.to_string());
        self
    }
}

/// Regulatory allowance linking a parcel, crop and year to a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageNorm {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: RecordId,
    #[serde(alias = "jaar")]
    pub year: i32,
    #[serde(alias = "bedrijf_id", deserialize_with = "deserialize_id")]
    pub company_id: RecordId,
    #[serde(alias = "perceel_id", deserialize_with = "deserialize_id")]
    pub parcel_id: RecordId,
    #[serde(alias = "gewas", default)]
    pub crop: String,
    #[serde(alias = "oppervlakte", default)]
    pub area_ha: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_norm_from_page_json() {
        let json = r#"{"id": 3, "jaar": 2024, "bedrijf_id": 1, "perceel_id": 9,
                       "gewas": "Grasland met beweiden", "oppervlakte": 4.25}"#;
        let norm: UsageNorm = serde_json::from_str(json).unwrap();
        assert_eq!(norm.year, 2024);
        assert_eq!(norm.parcel_id, "9");
        assert_eq!(norm.crop, "Grasland met beweiden");
        assert_eq!(norm.area_ha, 4.25);
    }

    #[test]
    fn usage_norm_with_uuid_keys() {
        let json = r#"{"id": "5f0e8a52-1c1d-4f43-9a61-2b0d8d1e7c10", "jaar": 2024,
                       "bedrijf_id": "0b7f6c7e-3d55-4b43-8f7e-5a0c2b7d9e11",
                       "perceel_id": "c1a2b3c4-d5e6-4f70-8a9b-0c1d2e3f4a5b", "gewas": "Mais"}"#;
        let norm: UsageNorm = serde_json::from_str(json).unwrap();
        assert_eq!(norm.company_id, "0b7f6c7e-3d55-4b43-8f7e-5a0c2b7d9e11");
        assert_eq!(norm.parcel_id, "c1a2b3c4-d5e6-4f70-8a9b-0c1d2e3f4a5b");
        assert_eq!(norm.area_ha, 0.0);
    }

    #[test]
    fn parcel_soil_is_optional() {
        let json = r#"{"id": 9, "perceelnaam": "Achterweide", "oppervlakte": 4.25}"#;
        let parcel: Parcel = serde_json::from_str(json).unwrap();
        assert_eq!(parcel.name, "Achterweide");
        assert_eq!(parcel.soil_type, None);
    }
}

use super::id::RecordId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityMode {
    #[default]
    PerHectare,
    Total,
}

impl QuantityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityMode::PerHectare => "kg/ha",
            QuantityMode::Total => "kg total",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', ' ', '_', '/'], "").as_str() {
            "perhectare" | "kgha" | "ha" => Some(QuantityMode::PerHectare),
            "total" | "kgtotal" | "tot" => Some(QuantityMode::Total),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuantityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the applied product came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    OwnFarm,
    #[default]
    Imported,
}

impl Origin {
    pub fn from_own_farm(own_farm: bool) -> Self {
        if own_farm {
            Origin::OwnFarm
        } else {
            Origin::Imported
        }
    }

    pub fn is_own_farm(&self) -> bool {
        matches!(self, Origin::OwnFarm)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::OwnFarm => "Own farm",
            Origin::Imported => "Imported",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Nutrient load in kg per hectare.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrients {
    pub n: f64,
    pub p2o5: f64,
    pub k2o: f64,
}

impl Nutrients {
    pub fn new(n: f64, p2o5: f64, k2o: f64) -> Self {
        Self { n, p2o5, k2o }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            n: self.n * factor,
            p2o5: self.p2o5 * factor,
            k2o: self.k2o * factor,
        }
    }
}

/// A registered fertilization for one parcel, as sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizationEvent {
    pub year: i32,
    pub company_id: RecordId,
    pub usage_norm_id: RecordId,
    pub parcel_id: RecordId,
    pub date: NaiveDate,
    pub product_id: RecordId,
    pub quantity_kg_ha: f64,
    pub n_kg_ha: f64,
    pub p2o5_kg_ha: f64,
    pub k2o_kg_ha: f64,
    pub origin: Origin,
    pub notes: Option<String>,
}

impl FertilizationEvent {
    pub fn nutrients(&self) -> Nutrients {
        Nutrients::new(self.n_kg_ha, self.p2o5_kg_ha, self.k2o_kg_ha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_mode_from_str() {
        assert_eq!(QuantityMode::from_str("kg/ha"), Some(QuantityMode::PerHectare));
        assert_eq!(QuantityMode::from_str("per-hectare"), Some(QuantityMode::PerHectare));
        assert_eq!(QuantityMode::from_str("Total"), Some(QuantityMode::Total));
        assert_eq!(QuantityMode::from_str("kg total"), Some(QuantityMode::Total));
        assert_eq!(QuantityMode::from_str("tonnes"), None);
    }

    #[test]
    fn origin_from_flag() {
        assert!(Origin::from_own_farm(true).is_own_farm());
        assert_eq!(Origin::from_own_farm(false), Origin::Imported);
    }

    #[test]
    fn nutrients_scale() {
        let n = Nutrients::new(10.0, 4.0, 2.0).scaled(0.5);
        assert_eq!(n, Nutrients::new(5.0, 2.0, 1.0));
    }
}

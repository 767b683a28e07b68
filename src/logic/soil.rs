use serde::{Deserialize, Serialize};

/// Soil categories used for fertilization norms, as derived from the
/// national soil map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrySoil {
    Loess,
    Peat,
    Clay,
    SouthernSand,
    OtherSand,
}

impl RegistrySoil {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrySoil::Loess => "Löss",
            RegistrySoil::Peat => "Veen",
            RegistrySoil::Clay => "Klei",
            RegistrySoil::SouthernSand => "Zuidelijk zand",
            RegistrySoil::OtherSand => "Noordelijk, westelijk, centraal zand",
        }
    }

    fn sand(in_southern: bool) -> Self {
        if in_southern {
            RegistrySoil::SouthernSand
        } else {
            RegistrySoil::OtherSand
        }
    }
}

impl std::fmt::Display for RegistrySoil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a main soil type from the soil map to a norm category.
///
/// Loess is checked first, then peat, then clay (`zavel` counts as clay).
/// Sand and anything unrecognized fall into a sand category chosen by region.
pub fn map_registry_soil(raw: &str, in_southern: bool, in_loess: bool) -> RegistrySoil {
    let soil = raw.trim().to_lowercase().replace('ö', "o");
    let has = |kw: &str| soil.contains(kw);

    if in_loess || has("loss") || has("loess") || has("leem") {
        RegistrySoil::Loess
    } else if has("veen") {
        RegistrySoil::Peat
    } else if has("klei") || has("zavel") {
        RegistrySoil::Clay
    } else {
        RegistrySoil::sand(in_southern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::use_case::SoilClass;

    #[test]
    fn maps_soil_map_values() {
        assert_eq!(map_registry_soil("LÖSS", false, false), RegistrySoil::Loess);
        assert_eq!(map_registry_soil("Leem", false, false), RegistrySoil::Loess);
        assert_eq!(map_registry_soil("KLEI", true, false), RegistrySoil::Clay);
        assert_eq!(map_registry_soil("zavel", false, false), RegistrySoil::Clay);
        assert_eq!(map_registry_soil("Veen", false, false), RegistrySoil::Peat);
        assert_eq!(map_registry_soil("ZAND", true, false), RegistrySoil::SouthernSand);
        assert_eq!(map_registry_soil("podzol", false, false), RegistrySoil::OtherSand);
    }

    #[test]
    fn loess_region_overrides_map_value() {
        assert_eq!(map_registry_soil("KLEI", false, true), RegistrySoil::Loess);
    }

    #[test]
    fn empty_value_falls_back_by_region() {
        assert_eq!(map_registry_soil("", true, false), RegistrySoil::SouthernSand);
        assert_eq!(map_registry_soil("", false, false), RegistrySoil::OtherSand);
    }

    #[test]
    fn categories_feed_the_use_case_resolver() {
        assert_eq!(SoilClass::classify(RegistrySoil::Clay.as_str()), SoilClass::ClayOrPeat);
        assert_eq!(SoilClass::classify(RegistrySoil::Peat.as_str()), SoilClass::ClayOrPeat);
        assert_eq!(SoilClass::classify(RegistrySoil::Loess.as_str()), SoilClass::SandOrLoess);
        assert_eq!(SoilClass::classify(RegistrySoil::OtherSand.as_str()), SoilClass::SandOrLoess);
    }
}

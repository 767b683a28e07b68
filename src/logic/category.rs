use serde::{Deserialize, Serialize};

/// Regulatory manure category a fertilizer product is classified under.
///
/// The canonical names are the keys used by the working-coefficient table.
/// Names that match no rule are carried through as `Unmapped`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManureCategory {
    LiquidPigs,
    LiquidOtherAnimals,
    LiquidGrazingOwnFarm,
    LiquidGrazingImported,
    SolidGrazingOwnFarm,
    SolidGrazingImported,
    SolidPigsPoultryMink,
    SolidOtherAnimals,
    Compost,
    SewageSludge,
    OtherOrganic,
    Mixtures,
    ThinFraction,
    MushroomCompost,
    Unmapped(String),
}

const GRAZING_ANIMALS: &[&str] = &["geiten", "schapen", "rund"];
const SOLID_PIG_POULTRY_MINK: &[&str] = &["varkens", "kippen", "pluimvee", "nertsen", "leghennen"];

const CANONICAL: &[ManureCategory] = &[
    ManureCategory::LiquidPigs,
    ManureCategory::LiquidOtherAnimals,
    ManureCategory::LiquidGrazingOwnFarm,
    ManureCategory::LiquidGrazingImported,
    ManureCategory::SolidGrazingOwnFarm,
    ManureCategory::SolidGrazingImported,
    ManureCategory::SolidPigsPoultryMink,
    ManureCategory::SolidOtherAnimals,
    ManureCategory::Compost,
    ManureCategory::SewageSludge,
    ManureCategory::OtherOrganic,
    ManureCategory::Mixtures,
    ManureCategory::ThinFraction,
    ManureCategory::MushroomCompost,
];

impl ManureCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ManureCategory::LiquidPigs => "Drijfmest van varkens",
            ManureCategory::LiquidOtherAnimals => "Drijfmest van overige diersoorten",
            ManureCategory::LiquidGrazingOwnFarm => {
                "Drijfmest van graasdieren op het eigen bedrijf geproduceerd"
            }
            ManureCategory::LiquidGrazingImported => "Drijfmest van graasdieren aangevoerd",
            ManureCategory::SolidGrazingOwnFarm => {
                "Vaste mest van graasdieren op het eigen bedrijf geproduceerd"
            }
            ManureCategory::SolidGrazingImported => "Vaste mest van graasdieren aangevoerd",
            ManureCategory::SolidPigsPoultryMink => "Vaste mest van varkens, pluimvee en nertsen",
            ManureCategory::SolidOtherAnimals => "Vaste mest van overige diersoorten",
            ManureCategory::Compost => "Compost",
            ManureCategory::SewageSludge => "Zuiveringsslib",
            ManureCategory::OtherOrganic => "Overige organische meststoffen",
            ManureCategory::Mixtures => "Mengsels van meststoffen",
            ManureCategory::ThinFraction => "Dunne fractie na mestbewerking en gier",
            ManureCategory::MushroomCompost => "Champost",
            ManureCategory::Unmapped(name) => name,
        }
    }

    pub fn canonical() -> &'static [ManureCategory] {
        CANONICAL
    }

    /// Exact (case-insensitive) match against the canonical names.
    pub fn from_canonical(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::canonical()
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self, ManureCategory::Unmapped(_))
    }
}

impl std::fmt::Display for ManureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a free-text product name into its regulatory manure category.
///
/// `own_farm` only matters for manure from grazing animals, which the
/// regulation splits by origin.
pub fn map_category(raw_name: &str, own_farm: bool) -> ManureCategory {
    if let Some(category) = ManureCategory::from_canonical(raw_name) {
        return category;
    }

    let name = raw_name.to_lowercase();
    let has = |kw: &str| name.contains(kw);
    let has_any = |kws: &[&str]| kws.iter().any(|kw| name.contains(kw));
    let liquid = has("drijfmest");

    if liquid && has("varkens") {
        return ManureCategory::LiquidPigs;
    }
    if liquid && has("overige") {
        return ManureCategory::LiquidOtherAnimals;
    }
    if liquid && has_any(GRAZING_ANIMALS) {
        return if own_farm {
            ManureCategory::LiquidGrazingOwnFarm
        } else {
            ManureCategory::LiquidGrazingImported
        };
    }

    if !liquid && has_any(GRAZING_ANIMALS) {
        return if own_farm {
            ManureCategory::SolidGrazingOwnFarm
        } else {
            ManureCategory::SolidGrazingImported
        };
    }
    if !liquid && has_any(SOLID_PIG_POULTRY_MINK) {
        return ManureCategory::SolidPigsPoultryMink;
    }
    if !liquid && has("overige") {
        return ManureCategory::SolidOtherAnimals;
    }

    if has("compost") {
        return ManureCategory::Compost;
    }
    if has("zuiveringsslib") {
        return ManureCategory::SewageSludge;
    }
    if has("overige organische") {
        return ManureCategory::OtherOrganic;
    }
    if has("mengsel") || has("meststoffen") {
        return ManureCategory::Mixtures;
    }
    if has("dunne fractie") || has("gier") {
        return ManureCategory::ThinFraction;
    }
    if has("champost") {
        return ManureCategory::MushroomCompost;
    }

    ManureCategory::Unmapped(raw_name.to_string())
}

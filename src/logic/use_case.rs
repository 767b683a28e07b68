use super::category::ManureCategory;
use serde::{Deserialize, Serialize};

/// Qualifier that refines a manure category's working coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UseCase {
    #[default]
    None,
    WithGrazing,
    WithoutGrazing,
    ClayAndPeat,
    SandAndLoess,
    ArableClayPeatAutumn,
    OtherWithGrazing,
    OtherWithoutGrazing,
    Other,
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::None => "",
            UseCase::WithGrazing => "Op bedrijf met beweiding",
            UseCase::WithoutGrazing => "Op bedrijf zonder beweiding",
            UseCase::ClayAndPeat => "Op klei en veen",
            UseCase::SandAndLoess => "Op zand en löss",
            UseCase::ArableClayPeatAutumn => {
                "Op bouwland op klei en veen, van 1 september t/m 31 januari"
            }
            UseCase::OtherWithGrazing => "Overige toepassingen op bedrijf met beweiding",
            UseCase::OtherWithoutGrazing => "Overige toepassingen op bedrijf zonder beweiding",
            UseCase::Other => "Overige toepassingen",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, UseCase::None)
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse soil grouping the regulation distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoilClass {
    ClayOrPeat,
    SandOrLoess,
    Unknown,
}

impl SoilClass {
    pub fn classify(soil_type: &str) -> Self {
        let soil = soil_type.to_lowercase();
        let has_any = |kws: &[&str]| kws.iter().any(|kw| soil.contains(kw));

        if has_any(&["klei", "veen", "clay", "peat"]) {
            SoilClass::ClayOrPeat
        } else if has_any(&["zand", "löss", "loss", "loess", "sand"]) {
            SoilClass::SandOrLoess
        } else {
            SoilClass::Unknown
        }
    }
}

/// September through January, wrapping over the year boundary.
pub fn in_autumn_window(month: u32) -> bool {
    (9..=12).contains(&month) || month == 1
}

/// Farm and parcel circumstances of one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationContext {
    pub soil: SoilClass,
    pub grazing: bool,
    pub month: u32,
}

impl ApplicationContext {
    pub fn new(crop: &str, soil_type: &str, month: u32) -> Self {
        Self {
            soil: SoilClass::classify(soil_type),
            grazing: crop.to_lowercase().contains("met beweiden"),
            month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    ClayOrPeat,
    SandOrLoess,
    ClayOrPeatAutumn,
    Grazing,
}

impl Condition {
    pub fn holds(&self, ctx: &ApplicationContext) -> bool {
        match self {
            Condition::Always => true,
            Condition::ClayOrPeat => ctx.soil == SoilClass::ClayOrPeat,
            Condition::SandOrLoess => ctx.soil == SoilClass::SandOrLoess,
            Condition::ClayOrPeatAutumn => {
                ctx.soil == SoilClass::ClayOrPeat && in_autumn_window(ctx.month)
            }
            Condition::Grazing => ctx.grazing,
        }
    }
}

pub struct UseCaseRule {
    pub category: ManureCategory,
    pub condition: Condition,
    pub use_case: UseCase,
}

const fn rule(category: ManureCategory, condition: Condition, use_case: UseCase) -> UseCaseRule {
    UseCaseRule {
        category,
        condition,
        use_case,
    }
}

/// Rows are evaluated top to bottom; the first row for the category whose
/// condition holds decides. Categories without a matching row get no use case.
pub const USE_CASE_TABLE: &[UseCaseRule] = &[
    rule(ManureCategory::LiquidGrazingOwnFarm, Condition::Grazing, UseCase::WithGrazing),
    rule(ManureCategory::LiquidGrazingOwnFarm, Condition::Always, UseCase::WithoutGrazing),
    rule(ManureCategory::LiquidPigs, Condition::ClayOrPeat, UseCase::ClayAndPeat),
    rule(ManureCategory::LiquidPigs, Condition::SandOrLoess, UseCase::SandAndLoess),
    rule(ManureCategory::ThinFraction, Condition::ClayOrPeat, UseCase::ClayAndPeat),
    rule(ManureCategory::ThinFraction, Condition::SandOrLoess, UseCase::SandAndLoess),
    rule(ManureCategory::SolidGrazingOwnFarm, Condition::ClayOrPeatAutumn, UseCase::ArableClayPeatAutumn),
    rule(ManureCategory::SolidGrazingOwnFarm, Condition::Grazing, UseCase::OtherWithGrazing),
    rule(ManureCategory::SolidGrazingOwnFarm, Condition::Always, UseCase::OtherWithoutGrazing),
    rule(ManureCategory::SolidGrazingImported, Condition::ClayOrPeatAutumn, UseCase::ArableClayPeatAutumn),
    rule(ManureCategory::SolidGrazingImported, Condition::Always, UseCase::Other),
    rule(ManureCategory::SolidPigsPoultryMink, Condition::ClayOrPeatAutumn, UseCase::ArableClayPeatAutumn),
    rule(ManureCategory::SolidPigsPoultryMink, Condition::Always, UseCase::Other),
    rule(ManureCategory::SolidOtherAnimals, Condition::ClayOrPeatAutumn, UseCase::ArableClayPeatAutumn),
    rule(ManureCategory::SolidOtherAnimals, Condition::Always, UseCase::Other),
];

pub fn resolve_in(table: &[UseCaseRule], category: &ManureCategory, ctx: &ApplicationContext) -> UseCase {
    table
        .iter()
        .filter(|r| &r.category == category)
        .find(|r| r.condition.holds(ctx))
        .map(|r| r.use_case)
        .unwrap_or_default()
}

/// Derive the use case for a category from crop, soil type and month (1-12).
pub fn resolve_use_case(category: &ManureCategory, crop: &str, soil_type: &str, month: u32) -> UseCase {
    let ctx = ApplicationContext::new(crop, soil_type, month);
    resolve_in(USE_CASE_TABLE, category, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autumn_window_boundaries() {
        assert!(in_autumn_window(9));
        assert!(in_autumn_window(12));
        assert!(in_autumn_window(1));
        assert!(!in_autumn_window(2));
        assert!(!in_autumn_window(8));
        assert!(!in_autumn_window(0));
        assert!(!in_autumn_window(13));
    }

    #[test]
    fn soil_classification() {
        assert_eq!(SoilClass::classify("Klei"), SoilClass::ClayOrPeat);
        assert_eq!(SoilClass::classify("Veen"), SoilClass::ClayOrPeat);
        assert_eq!(SoilClass::classify("clay"), SoilClass::ClayOrPeat);
        assert_eq!(
            SoilClass::classify("Noordelijk, westelijk, centraal zand"),
            SoilClass::SandOrLoess
        );
        assert_eq!(SoilClass::classify("Löss"), SoilClass::SandOrLoess);
        assert_eq!(SoilClass::classify("Onbekend"), SoilClass::Unknown);
        assert_eq!(SoilClass::classify(""), SoilClass::Unknown);
    }

    #[test]
    fn liquid_pig_manure_depends_on_soil() {
        let c = ManureCategory::LiquidPigs;
        assert_eq!(resolve_use_case(&c, "Mais", "Klei", 4), UseCase::ClayAndPeat);
        assert_eq!(resolve_use_case(&c, "Mais", "Zuidelijk zand", 4), UseCase::SandAndLoess);
        assert_eq!(resolve_use_case(&c, "Mais", "Onbekend", 4), UseCase::None);
    }

    #[test]
    fn liquid_grazing_own_farm_depends_on_grazing() {
        let c = ManureCategory::LiquidGrazingOwnFarm;
        assert_eq!(
            resolve_use_case(&c, "Grasland met beweiden", "Klei", 3),
            UseCase::WithGrazing
        );
        assert_eq!(
            resolve_use_case(&c, "Grasland zonder beweiden", "Klei", 3),
            UseCase::WithoutGrazing
        );
    }

    #[test]
    fn solid_manure_autumn_rule_on_clay_and_peat() {
        let c = ManureCategory::SolidGrazingOwnFarm;
        for month in [9, 10, 11, 12, 1] {
            assert_eq!(
                resolve_use_case(&c, "Grasland met beweiden", "Veen", month),
                UseCase::ArableClayPeatAutumn,
                "month {}",
                month
            );
        }
        assert_eq!(
            resolve_use_case(&c, "Grasland met beweiden", "Veen", 2),
            UseCase::OtherWithGrazing
        );
        assert_eq!(
            resolve_use_case(&c, "Wintertarwe", "Klei", 8),
            UseCase::OtherWithoutGrazing
        );
        assert_eq!(
            resolve_use_case(&c, "Wintertarwe", "Zand", 10),
            UseCase::OtherWithoutGrazing
        );

        let c = ManureCategory::SolidPigsPoultryMink;
        assert_eq!(resolve_use_case(&c, "", "Klei", 9), UseCase::ArableClayPeatAutumn);
        assert_eq!(resolve_use_case(&c, "", "Klei", 8), UseCase::Other);
    }

    #[test]
    fn categories_without_qualifier() {
        for c in [
            ManureCategory::LiquidGrazingImported,
            ManureCategory::LiquidOtherAnimals,
            ManureCategory::Compost,
            ManureCategory::MushroomCompost,
            ManureCategory::Unmapped("KAS".into()),
        ] {
            assert_eq!(resolve_use_case(&c, "Grasland met beweiden", "Klei", 10), UseCase::None);
        }
    }

    #[test]
    fn resolve_in_custom_table() {
        let table = [rule(ManureCategory::Compost, Condition::SandOrLoess, UseCase::Other)];
        let ctx = ApplicationContext::new("", "zand", 5);
        assert_eq!(resolve_in(&table, &ManureCategory::Compost, &ctx), UseCase::Other);
        let ctx = ApplicationContext::new("", "klei", 5);
        assert_eq!(resolve_in(&table, &ManureCategory::Compost, &ctx), UseCase::None);
    }
}

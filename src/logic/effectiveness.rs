use super::calculations::{parse_dutch_date, sanitize_amount};
use super::category::map_category;
use super::context::RuleContext;
use super::use_case::{resolve_use_case, UseCase};
use crate::models::FertilizerProduct;
use chrono::Datelike;
use tracing::{debug, warn};

/// Why no working coefficient could be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    MissingProduct,
    InvalidDate,
    EmptyTable,
    NoCoefficient,
}

impl UnknownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownReason::MissingProduct => "no product selected",
            UnknownReason::InvalidDate => "invalid application date",
            UnknownReason::EmptyTable => "working-coefficient table not loaded",
            UnknownReason::NoCoefficient => "no working coefficient for category",
        }
    }
}

impl std::fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Working coefficient as a percentage, or the reason it is not known.
///
/// `Known(0.0)` is a genuine 0% entry in the table; `Unknown` means the
/// lookup never got that far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effectiveness {
    Known(f64),
    Unknown(UnknownReason),
}

impl Effectiveness {
    /// Percentage used in calculations; unknown counts as zero.
    pub fn pct(&self) -> f64 {
        match self {
            Effectiveness::Known(pct) => *pct,
            Effectiveness::Unknown(_) => 0.0,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Effectiveness::Known(_))
    }

    /// Display form: "60.0%" or "–" when unknown.
    pub fn label(&self) -> String {
        match self {
            Effectiveness::Known(pct) => format!("{:.1}%", pct),
            Effectiveness::Unknown(_) => "–".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectivenessResult {
    pub effective_nitrogen: f64,
    pub effectiveness: Effectiveness,
    pub use_case: Option<UseCase>,
    pub mapped_category: Option<String>,
}

impl EffectivenessResult {
    fn unknown(reason: UnknownReason, mapped_category: Option<String>) -> Self {
        Self {
            effective_nitrogen: 0.0,
            effectiveness: Effectiveness::Unknown(reason),
            use_case: None,
            mapped_category,
        }
    }

    pub fn effectiveness_pct(&self) -> f64 {
        self.effectiveness.pct()
    }

    pub fn is_unknown(&self) -> bool {
        !self.effectiveness.is_known()
    }
}

impl RuleContext {
    /// Effective nitrogen for one application on one parcel.
    ///
    /// Products that are not animal manure count at 100%. Manure is mapped to
    /// its category, the use case is derived from soil, crop and the month of
    /// `date` (`DD-MM-YYYY`), and the coefficient is looked up for the year of
    /// `date`. Anything that prevents the lookup yields zero effective
    /// nitrogen with an `Unknown` effectiveness.
    pub fn calculate(
        &self,
        n_kg_ha: f64,
        product: Option<&FertilizerProduct>,
        own_farm: bool,
        soil_type: &str,
        crop: &str,
        date: &str,
    ) -> EffectivenessResult {
        let n = sanitize_amount(n_kg_ha);

        let Some(product) = product else {
            warn!("No product given, effective nitrogen set to 0");
            return EffectivenessResult::unknown(UnknownReason::MissingProduct, None);
        };

        if !product.is_animal_manure() {
            return EffectivenessResult {
                effective_nitrogen: n,
                effectiveness: Effectiveness::Known(100.0),
                use_case: None,
                mapped_category: Some(product.name.clone()),
            };
        }

        let category = map_category(&product.name, own_farm);
        let mapped = Some(category.as_str().to_string());
        if !category.is_mapped() {
            debug!(product = %product.name, "Product name matches no manure category");
        }

        let Some(date) = parse_dutch_date(date) else {
            warn!(date, product = %product.name, "Invalid application date, effective nitrogen set to 0");
            return EffectivenessResult::unknown(UnknownReason::InvalidDate, mapped);
        };

        if self.coefficients().is_empty() {
            warn!("Working-coefficient table is empty, effective nitrogen set to 0");
            return EffectivenessResult::unknown(UnknownReason::EmptyTable, mapped);
        }

        let use_case = resolve_use_case(&category, crop, soil_type, date.month());
        let Some(found) = self
            .coefficients()
            .lookup(date.year(), category.as_str(), use_case.as_str())
        else {
            warn!(
                year = date.year(),
                category = %category,
                use_case = %use_case,
                available = ?self.coefficients().keys(),
                "No working coefficient found"
            );
            return EffectivenessResult {
                use_case: Some(use_case),
                ..EffectivenessResult::unknown(UnknownReason::NoCoefficient, mapped)
            };
        };

        let pct = found.effectiveness_pct();
        EffectivenessResult {
            effective_nitrogen: n * pct / 100.0,
            effectiveness: Effectiveness::Known(pct),
            use_case: Some(use_case),
            mapped_category: mapped,
        }
    }

    pub fn effective_nitrogen(
        &self,
        n_kg_ha: f64,
        product: Option<&FertilizerProduct>,
        own_farm: bool,
        soil_type: &str,
        crop: &str,
        date: &str,
    ) -> f64 {
        self.calculate(n_kg_ha, product, own_farm, soil_type, crop, date)
            .effective_nitrogen
    }
}

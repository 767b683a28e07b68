use crate::logic::calculations::{
    nutrients_per_hectare, parse_dutch_date, to_per_hectare, total_area,
};
use crate::logic::{Effectiveness, ParcelOption, RuleContext};
use crate::models::{
    FertilizationEvent, FertilizerProduct, Nutrients, Origin, QuantityMode, RecordId,
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{}", .0.join("; "))]
    Incomplete(Vec<String>),

    #[error("no usage norm for parcel(s): {}", .0.join(", "))]
    MissingUsageNorm(Vec<String>),

    #[error("unknown {0}")]
    UnknownSelection(String),

    #[error("not available in step {0}")]
    WrongStep(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Selection,
    Product,
    Quantities,
    Review,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Selection => 1,
            WizardStep::Product => 2,
            WizardStep::Quantities => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Selection => "Year, company and parcels",
            WizardStep::Product => "Fertilizer",
            WizardStep::Quantities => "Date and quantities",
            WizardStep::Review => "Review",
        }
    }

    fn previous(&self) -> Self {
        match self {
            WizardStep::Selection | WizardStep::Product => WizardStep::Selection,
            WizardStep::Quantities => WizardStep::Product,
            WizardStep::Review => WizardStep::Quantities,
        }
    }
}

/// Effective nitrogen for one selected parcel, as shown before submitting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewCard {
    pub parcel_name: String,
    pub area_ha: f64,
    pub soil_type: String,
    pub crop: String,
    pub mapped_category: String,
    pub use_case: String,
    pub effectiveness: Effectiveness,
    pub effective_n: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub company: String,
    pub year: i32,
    pub product: String,
    pub date: String,
    pub origin: Origin,
    pub quantity_kg_ha: f64,
    pub nutrients: Nutrients,
    pub cards: Vec<ReviewCard>,
}

impl ReviewSummary {
    pub fn average_effective_n(&self) -> Option<f64> {
        if self.cards.is_empty() {
            return None;
        }
        let sum: f64 = self.cards.iter().map(|c| c.effective_n).sum();
        Some(sum / self.cards.len() as f64)
    }

    pub fn average_label(&self) -> String {
        self.average_effective_n()
            .map(|n| format!("{:.2}", n))
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Four-step registration of one fertilization on one or more parcels.
///
/// The wizard holds only the user's choices. Reference data is read from the
/// [`RuleContext`] passed into each call that needs it.
#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    year: Option<i32>,
    company_id: Option<RecordId>,
    parcels: Vec<ParcelOption>,
    product_id: Option<RecordId>,
    origin: Origin,
    date: String,
    quantity: f64,
    quantity_mode: QuantityMode,
    manual: Nutrients,
    notes: Option<String>,
}

impl Wizard {
    pub fn new(quantity_mode: QuantityMode) -> Self {
        Self {
            step: WizardStep::Selection,
            year: None,
            company_id: None,
            parcels: Vec::new(),
            product_id: None,
            origin: Origin::default(),
            date: String::new(),
            quantity: 0.0,
            quantity_mode,
            manual: Nutrients::default(),
            notes: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn company_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }

    pub fn selected_parcels(&self) -> &[ParcelOption] {
        &self.parcels
    }

    pub fn quantity_mode(&self) -> QuantityMode {
        self.quantity_mode
    }

    /// Entered quantity in kg/ha, derived from the current mode and the
    /// selected area on every call.
    pub fn quantity_kg_ha(&self) -> f64 {
        to_per_hectare(self.quantity, self.quantity_mode, self.selected_area())
    }

    pub fn select_year(&mut self, ctx: &RuleContext, year: i32) -> Result<(), WizardError> {
        if !ctx.reference().available_years().contains(&year) {
            return Err(WizardError::UnknownSelection(format!("year {}", year)));
        }
        if self.year != Some(year) {
            self.year = Some(year);
            self.company_id = None;
            self.parcels.clear();
        }
        Ok(())
    }

    pub fn select_company(&mut self, ctx: &RuleContext, company_id: &str) -> Result<(), WizardError> {
        let year = self
            .year
            .ok_or_else(|| WizardError::Incomplete(vec!["Select a year first".into()]))?;
        let offered = ctx
            .reference()
            .companies_for_year(year)
            .iter()
            .any(|c| c.id == company_id);
        if !offered {
            return Err(WizardError::UnknownSelection(format!(
                "company {} for {}",
                company_id, year
            )));
        }
        if self.company_id.as_deref() != Some(company_id) {
            self.company_id = Some(company_id.to_string());
            self.parcels.clear();
        }
        Ok(())
    }

    /// Parcel options for the current year and company.
    pub fn parcel_options(&self, ctx: &RuleContext) -> Vec<ParcelOption> {
        match (self.year, self.company_id.as_deref()) {
            (Some(year), Some(company)) => ctx.reference().parcel_options(year, company),
            _ => Vec::new(),
        }
    }

    /// Replace the parcel selection by usage-norm ids.
    pub fn select_parcels<S: AsRef<str>>(
        &mut self,
        ctx: &RuleContext,
        usage_norm_ids: &[S],
    ) -> Result<(), WizardError> {
        let options = self.parcel_options(ctx);
        let mut selected = Vec::with_capacity(usage_norm_ids.len());
        for id in usage_norm_ids.iter().map(AsRef::as_ref) {
            let option = options
                .iter()
                .find(|o| o.usage_norm_id == id)
                .ok_or_else(|| WizardError::UnknownSelection(format!("usage norm {}", id)))?;
            if !selected.iter().any(|s: &ParcelOption| s.usage_norm_id == id) {
                selected.push(option.clone());
            }
        }
        self.parcels = selected;
        Ok(())
    }

    pub fn choose_product(&mut self, ctx: &RuleContext, product_id: &str) -> Result<(), WizardError> {
        if ctx.reference().product(product_id).is_none() {
            return Err(WizardError::UnknownSelection(format!("product {}", product_id)));
        }
        self.product_id = Some(product_id.to_string());
        Ok(())
    }

    pub fn product<'a>(&self, ctx: &'a RuleContext) -> Option<&'a FertilizerProduct> {
        self.product_id
            .as_deref()
            .and_then(|id| ctx.reference().product(id))
    }

    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = origin;
    }

    pub fn set_date(&mut self, date: &str) {
        self.date = date.trim().to_string();
    }

    pub fn set_quantity(&mut self, quantity: f64, mode: QuantityMode) {
        self.quantity = quantity;
        self.quantity_mode = mode;
    }

    /// N, P2O5 and K2O for animal manure, in the unit of the quantity mode.
    pub fn set_manual_nutrients(&mut self, manual: Nutrients) {
        self.manual = manual;
    }

    pub fn set_notes(&mut self, notes: &str) {
        let notes = notes.trim();
        self.notes = (!notes.is_empty()).then(|| notes.to_string());
    }

    pub fn selected_area(&self) -> f64 {
        total_area(self.parcels.iter().map(|p| p.area_ha))
    }

    pub fn nutrients(&self, ctx: &RuleContext) -> Nutrients {
        nutrients_per_hectare(
            self.product(ctx),
            self.quantity,
            self.manual,
            self.quantity_mode,
            self.selected_area(),
        )
    }

    /// Advance one step if the current step is complete.
    pub fn next(&mut self, ctx: &RuleContext) -> Result<WizardStep, WizardError> {
        let problems = match self.step {
            WizardStep::Selection => self.selection_problems(),
            WizardStep::Product => self.product_problems(ctx),
            WizardStep::Quantities => self.quantity_problems(),
            WizardStep::Review => return Err(WizardError::WrongStep(self.step.number())),
        };
        if !problems.is_empty() {
            return Err(WizardError::Incomplete(problems));
        }

        self.step = match self.step {
            WizardStep::Selection => WizardStep::Product,
            WizardStep::Product => WizardStep::Quantities,
            WizardStep::Quantities | WizardStep::Review => WizardStep::Review,
        };
        debug!(step = self.step.number(), "Wizard advanced");
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    fn selection_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.year.is_none() {
            problems.push("Select a year".to_string());
        }
        if self.company_id.is_none() {
            problems.push("Select a company".to_string());
        }
        if self.parcels.is_empty() {
            problems.push("Select at least one parcel".to_string());
        }
        problems
    }

    fn product_problems(&self, ctx: &RuleContext) -> Vec<String> {
        if self.product(ctx).is_none() {
            vec!["Choose a fertilizer".to_string()]
        } else {
            Vec::new()
        }
    }

    fn quantity_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.date.is_empty() {
            problems.push("Enter a date".to_string());
        } else if parse_dutch_date(&self.date).is_none() {
            problems.push(format!("Invalid date '{}', use DD-MM-YYYY", self.date));
        }

        let positive = self.quantity.is_finite() && self.quantity > 0.0;
        match self.quantity_mode {
            QuantityMode::PerHectare if !positive => {
                problems.push("Enter a valid quantity per hectare".to_string())
            }
            QuantityMode::Total if !positive => {
                problems.push("Enter a valid total quantity".to_string())
            }
            QuantityMode::Total if self.selected_area() <= 0.0 => {
                problems.push("Selected parcels have no valid area".to_string())
            }
            _ => {}
        }
        problems
    }

    /// Per-parcel effective nitrogen for the current choices.
    pub fn review(&self, ctx: &RuleContext) -> ReviewSummary {
        let product = self.product(ctx);
        let nutrients = self.nutrients(ctx);
        let own_farm = self.origin.is_own_farm();

        let cards = self
            .parcels
            .iter()
            .map(|parcel| {
                let result = ctx.calculate(
                    nutrients.n,
                    product,
                    own_farm,
                    &parcel.soil_type,
                    &parcel.crop,
                    &self.date,
                );
                ReviewCard {
                    parcel_name: parcel.name.clone(),
                    area_ha: parcel.area_ha,
                    soil_type: parcel.soil_type.clone(),
                    crop: parcel.crop.clone(),
                    mapped_category: result
                        .mapped_category
                        .clone()
                        .or_else(|| product.map(|p| p.name.clone()))
                        .unwrap_or_default(),
                    use_case: result
                        .use_case
                        .filter(|u| !u.is_none())
                        .map(|u| u.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    effectiveness: result.effectiveness,
                    effective_n: result.effective_nitrogen,
                }
            })
            .collect();

        ReviewSummary {
            company: self
                .company_id
                .as_deref()
                .and_then(|id| ctx.reference().company(id))
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            product: product.map(|p| p.name.clone()).unwrap_or_default(),
            date: self.date.clone(),
            origin: self.origin,
            quantity_kg_ha: self.quantity_kg_ha(),
            nutrients,
            cards,
        }
    }

    /// Build one event per selected parcel.
    ///
    /// Every parcel must still have a usage norm for the chosen year and
    /// company. If any is missing the wizard returns to the first step and
    /// the error names those parcels.
    pub fn submit(&mut self, ctx: &RuleContext) -> Result<Vec<FertilizationEvent>, WizardError> {
        if self.step != WizardStep::Review {
            return Err(WizardError::WrongStep(self.step.number()));
        }

        let (Some(year), Some(company_id), Some(product_id)) = (
            self.year,
            self.company_id.clone(),
            self.product_id.clone(),
        ) else {
            self.step = WizardStep::Selection;
            return Err(WizardError::Incomplete(self.selection_problems()));
        };
        let Some(date) = parse_dutch_date(&self.date) else {
            self.step = WizardStep::Quantities;
            return Err(WizardError::Incomplete(self.quantity_problems()));
        };

        let missing: Vec<String> = self
            .parcels
            .iter()
            .filter(|p| {
                ctx.reference()
                    .usage_norm(year, &company_id, &p.parcel_id)
                    .is_none()
            })
            .map(|p| p.name.clone())
            .collect();
        if !missing.is_empty() {
            self.step = WizardStep::Selection;
            return Err(WizardError::MissingUsageNorm(missing));
        }

        let nutrients = self.nutrients(ctx);
        let quantity_kg_ha = self.quantity_kg_ha();
        let events: Vec<FertilizationEvent> = self
            .parcels
            .iter()
            .filter_map(|p| {
                let norm = ctx.reference().usage_norm(year, &company_id, &p.parcel_id)?;
                Some(FertilizationEvent {
                    year,
                    company_id: company_id.clone(),
                    usage_norm_id: norm.id.clone(),
                    parcel_id: p.parcel_id.clone(),
                    date,
                    product_id: product_id.clone(),
                    quantity_kg_ha,
                    n_kg_ha: nutrients.n,
                    p2o5_kg_ha: nutrients.p2o5,
                    k2o_kg_ha: nutrients.k2o,
                    origin: self.origin,
                    notes: self.notes.clone(),
                })
            })
            .collect();

        info!(parcels = events.len(), year, company_id = %company_id, "Fertilization events built");
        Ok(events)
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(QuantityMode::default())
    }
}

use super::coefficients::CoefficientTable;
use crate::models::ReferenceData;
use tracing::info;

/// Everything the rule engine reads, built once at startup and shared
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RuleContext {
    reference: ReferenceData,
    coefficients: CoefficientTable,
}

impl RuleContext {
    pub fn new(reference: ReferenceData, coefficients: CoefficientTable) -> Self {
        info!(
            usage_norms = reference.usage_norms.len(),
            parcels = reference.parcels.len(),
            products = reference.products.len(),
            coefficients = coefficients.len(),
            "Rule context ready"
        );
        Self {
            reference,
            coefficients,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn coefficients(&self) -> &CoefficientTable {
        &self.coefficients
    }
}

use super::{Company, FertilizerProduct, Parcel, UsageNorm};
use serde::{Deserialize, Serialize};

/// Read-only reference tables the wizard works from, loaded once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(alias = "gebruiksnormen", default)]
    pub usage_norms: Vec<UsageNorm>,
    #[serde(alias = "bedrijven", default)]
    pub companies: Vec<Company>,
    #[serde(alias = "percelen", default)]
    pub parcels: Vec<Parcel>,
    #[serde(alias = "meststoffen", default)]
    pub products: Vec<FertilizerProduct>,
}

impl ReferenceData {
    pub fn product(&self, id: &str) -> Option<&FertilizerProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn parcel(&self, id: &str) -> Option<&Parcel> {
        self.parcels.iter().find(|p| p.id == id)
    }

    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn usage_norm(&self, year: i32, company_id: &str, parcel_id: &str) -> Option<&UsageNorm> {
        self.usage_norms
            .iter()
            .find(|n| n.year == year && n.company_id == company_id && n.parcel_id == parcel_id)
    }

    pub fn is_empty(&self) -> bool {
        self.usage_norms.is_empty()
            && self.companies.is_empty()
            && self.parcels.is_empty()
            && self.products.is_empty()
    }
}

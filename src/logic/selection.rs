use crate::models::{Company, FertilizerProduct, RecordId, ReferenceData};
use std::collections::BTreeSet;

pub const UNKNOWN_SOIL: &str = "Onbekend";

/// A parcel the user can pick for a given year and company.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelOption {
    pub usage_norm_id: RecordId,
    pub parcel_id: RecordId,
    pub name: String,
    pub crop: String,
    pub area_ha: f64,
    pub soil_type: String,
}

impl ParcelOption {
    pub fn label(&self) -> String {
        format!(
            "{} - {} ({:.2} ha, {})",
            self.name, self.crop, self.area_ha, self.soil_type
        )
    }
}

impl ReferenceData {
    /// Years that have at least one usage norm, newest first.
    pub fn available_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.usage_norms.iter().map(|n| n.year).collect();
        years.into_iter().rev().collect()
    }

    pub fn companies_for_year(&self, year: i32) -> Vec<&Company> {
        self.companies
            .iter()
            .filter(|c| {
                self.usage_norms
                    .iter()
                    .any(|n| n.year == year && n.company_id == c.id)
            })
            .collect()
    }

    /// One option per usage norm of the company in that year, sorted by
    /// parcel name.
    pub fn parcel_options(&self, year: i32, company_id: &str) -> Vec<ParcelOption> {
        let mut options: Vec<ParcelOption> = self
            .usage_norms
            .iter()
            .filter(|n| n.year == year && n.company_id == company_id)
            .map(|norm| {
                let parcel = self.parcel(&norm.parcel_id);
                ParcelOption {
                    usage_norm_id: norm.id.clone(),
                    parcel_id: norm.parcel_id.clone(),
                    name: parcel
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| format!("Perceel {}", norm.parcel_id)),
                    crop: norm.crop.clone(),
                    area_ha: norm.area_ha,
                    soil_type: parcel
                        .and_then(|p| p.soil_type.clone())
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_SOIL.to_string()),
                }
            })
            .collect();

        options.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        options
    }

    /// Product autocomplete. An empty query suggests nothing.
    pub fn search_products(&self, query: &str) -> Vec<&FertilizerProduct> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Parcel, UsageNorm};

    fn norm(id: &str, year: i32, company_id: &str, parcel_id: &str) -> UsageNorm {
        UsageNorm {
            id: id.into(),
            year,
            company_id: company_id.into(),
            parcel_id: parcel_id.into(),
            crop: "Grasland met beweiden".into(),
            area_ha: 2.0,
        }
    }

    fn data() -> ReferenceData {
        ReferenceData {
            usage_norms: vec![
                norm("n1", 2023, "c1", "p10"),
                norm("n2", 2024, "c1", "p10"),
                norm("n3", 2024, "c1", "p11"),
                norm("n4", 2024, "c2", "p12"),
                norm("n5", 2024, "c1", "p99"),
            ],
            companies: vec![
                Company { id: "c1".into(), name: "De Hoeve".into() },
                Company { id: "c2".into(), name: "Zuiderhof".into() },
                Company { id: "c3".into(), name: "Leeg".into() },
            ],
            parcels: vec![
                Parcel::new("p10", "Wei", 2.0).with_soil("Klei"),
                Parcel::new("p11", "Akker", 3.0),
                Parcel::new("p12", "Zuid", 1.0).with_soil("Zand"),
            ],
            products: vec![
                FertilizerProduct::new("f1", "KAS 27%"),
                FertilizerProduct::new("f2", "Drijfmest rundvee"),
                FertilizerProduct::new("f3", "Vaste mest rundvee"),
            ],
        }
    }

    #[test]
    fn years_newest_first() {
        assert_eq!(data().available_years(), vec![2024, 2023]);
    }

    #[test]
    fn companies_filtered_by_year() {
        let data = data();
        let names: Vec<&str> = data
            .companies_for_year(2024)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["De Hoeve", "Zuiderhof"]);
        assert_eq!(data.companies_for_year(2023).len(), 1);
        assert!(data.companies_for_year(2020).is_empty());
    }

    #[test]
    fn parcel_options_sorted_with_fallbacks() {
        let options = data().parcel_options(2024, "c1");
        let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Akker", "Perceel p99", "Wei"]);

        let akker = &options[0];
        assert_eq!(akker.soil_type, UNKNOWN_SOIL);
        assert_eq!(akker.usage_norm_id, "n3");

        let missing = &options[1];
        assert_eq!(missing.soil_type, UNKNOWN_SOIL);
        assert_eq!(missing.parcel_id, "p99");

        assert_eq!(options[2].soil_type, "Klei");
    }

    #[test]
    fn product_search() {
        let data = data();
        assert_eq!(data.search_products("RUNDVEE").len(), 2);
        assert_eq!(data.search_products("kas")[0].id, "f1");
        assert!(data.search_products("  ").is_empty());
        assert!(data.search_products("guano").is_empty());
    }
}

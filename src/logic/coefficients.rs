use crate::models::{normalize_use_case, WorkingCoefficientEntry};
use tracing::debug;

/// Which fallback level produced a coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LookupTier {
    /// Same year, category and use case.
    Exact,
    /// Same year and category, entry without use case.
    YearWithoutUseCase,
    /// Category and use case from any year.
    AnyYear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientMatch<'a> {
    pub entry: &'a WorkingCoefficientEntry,
    pub tier: LookupTier,
}

impl CoefficientMatch<'_> {
    pub fn effectiveness_pct(&self) -> f64 {
        self.entry.effectiveness_pct
    }
}

/// Read-only working-coefficient table as served by the API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientTable {
    entries: Vec<WorkingCoefficientEntry>,
}

impl CoefficientTable {
    pub fn new(entries: Vec<WorkingCoefficientEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[WorkingCoefficientEntry] {
        &self.entries
    }

    /// Find the coefficient for a category and use case, falling back from
    /// the exact year to an entry without use case and then to any year.
    pub fn lookup(&self, year: i32, category: &str, use_case: &str) -> Option<CoefficientMatch<'_>> {
        let use_case = normalize_use_case(use_case);
        let find = |pred: &dyn Fn(&WorkingCoefficientEntry) -> bool| {
            self.entries
                .iter()
                .find(|e| e.manure_category == category && pred(*e))
        };

        let found = find(&|e| e.year == Some(year) && e.use_case == use_case)
            .map(|entry| (entry, LookupTier::Exact))
            .or_else(|| {
                find(&|e| e.year == Some(year) && e.use_case.is_empty())
                    .map(|entry| (entry, LookupTier::YearWithoutUseCase))
            })
            .or_else(|| {
                find(&|e| e.use_case == use_case).map(|entry| (entry, LookupTier::AnyYear))
            });

        let (entry, tier) = found?;
        debug!(
            year,
            category,
            use_case = %use_case,
            tier = ?tier,
            pct = entry.effectiveness_pct,
            "Working coefficient found"
        );
        Some(CoefficientMatch { entry, tier })
    }

    /// Keys of all entries, for diagnostics when a lookup misses.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key()).collect()
    }
}

impl From<Vec<WorkingCoefficientEntry>> for CoefficientTable {
    fn from(entries: Vec<WorkingCoefficientEntry>) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIGS: &str = "Drijfmest van varkens";

    fn entry(year: Option<i32>, category: &str, use_case: &str, pct: f64) -> WorkingCoefficientEntry {
        WorkingCoefficientEntry::new(year, category, use_case, pct)
    }

    #[test]
    fn exact_match_wins() {
        let table = CoefficientTable::new(vec![
            entry(Some(2024), PIGS, "", 50.0),
            entry(Some(2024), PIGS, "Op klei en veen", 60.0),
        ]);
        let m = table.lookup(2024, PIGS, "Op klei en veen").unwrap();
        assert_eq!(m.tier, LookupTier::Exact);
        assert_eq!(m.effectiveness_pct(), 60.0);
    }

    #[test]
    fn falls_back_to_entry_without_use_case() {
        let table = CoefficientTable::new(vec![
            entry(Some(2024), PIGS, "Op klei en veen", 60.0),
            entry(Some(2024), PIGS, "", 55.0),
        ]);
        let m = table.lookup(2024, PIGS, "Op zand en löss").unwrap();
        assert_eq!(m.tier, LookupTier::YearWithoutUseCase);
        assert_eq!(m.effectiveness_pct(), 55.0);
    }

    #[test]
    fn falls_back_to_other_year() {
        let table = CoefficientTable::new(vec![
            entry(Some(2023), PIGS, "Op zand en löss", 70.0),
            entry(None, PIGS, "Op zand en löss", 72.0),
        ]);
        let m = table.lookup(2025, PIGS, "Op zand en löss").unwrap();
        assert_eq!(m.tier, LookupTier::AnyYear);
        assert_eq!(m.effectiveness_pct(), 70.0);
    }

    #[test]
    fn same_year_without_use_case_beats_other_year_exact() {
        let table = CoefficientTable::new(vec![
            entry(Some(2023), PIGS, "Op klei en veen", 65.0),
            entry(Some(2024), PIGS, "", 55.0),
        ]);
        let m = table.lookup(2024, PIGS, "Op klei en veen").unwrap();
        assert_eq!(m.tier, LookupTier::YearWithoutUseCase);
    }

    #[test]
    fn placeholder_use_cases_are_empty() {
        let table = CoefficientTable::new(vec![entry(Some(2024), "Compost", "NaN", 10.0)]);
        let m = table.lookup(2024, "Compost", "").unwrap();
        assert_eq!(m.tier, LookupTier::Exact);
    }

    #[test]
    fn missing_entries_yield_none() {
        let table = CoefficientTable::default();
        assert!(table.lookup(2024, PIGS, "").is_none());

        let table = CoefficientTable::new(vec![entry(Some(2024), "Compost", "", 10.0)]);
        assert!(table.lookup(2024, PIGS, "Op klei en veen").is_none());
        // Tier 2 only applies within the requested year
        assert!(table.lookup(2023, "Compost", "Overige toepassingen").is_none());
    }
}

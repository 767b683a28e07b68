use crate::error::{FertilogError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// `nv-gebied` and `nvGebied` address the same attribute.
pub fn data_key(attr: &str) -> String {
    let mut key = String::with_capacity(attr.len());
    let mut upper_next = false;
    for c in attr.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next && c.is_ascii_lowercase() {
            key.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            if upper_next {
                key.push('-');
                upper_next = false;
            }
            key.push(c);
        }
    }
    if upper_next {
        key.push('-');
    }
    key
}

/// A filterable item: a bag of string attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    attrs: BTreeMap<String, String>,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attr: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(data_key(attr), value.into());
        self
    }

    pub fn get(&self, attr: &str) -> Option<&str> {
        self.attrs.get(&data_key(attr)).map(String::as_str)
    }

    fn number(&self, attr: &str) -> Option<f64> {
        self.get(attr)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

/// Numeric bucket; `min` is inclusive, `max` exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBucket {
    pub label: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeBucket {
    pub fn new(label: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            min,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value < max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    /// Card value must equal the selected value.
    Exact,
    /// Selected value names a bucket the card value must fall in.
    Range(Vec<RangeBucket>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub id: String,
    pub label: String,
    pub data_attr: String,
    pub kind: FilterKind,
}

impl FilterSpec {
    pub fn exact(id: &str, label: &str, data_attr: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            data_attr: data_attr.to_string(),
            kind: FilterKind::Exact,
        }
    }

    pub fn range(id: &str, label: &str, data_attr: &str, buckets: Vec<RangeBucket>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            data_attr: data_attr.to_string(),
            kind: FilterKind::Range(buckets),
        }
    }

    fn matches(&self, card: &Card, value: &str) -> bool {
        match &self.kind {
            FilterKind::Exact => card.get(&self.data_attr).unwrap_or("") == value,
            FilterKind::Range(buckets) => {
                let Some(bucket) = buckets.iter().find(|b| b.label == value) else {
                    return true;
                };
                card.number(&self.data_attr)
                    .map_or(true, |n| bucket.contains(n))
            }
        }
    }
}

/// Active filter as shown above the results.
#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub filter_id: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStats {
    pub count: usize,
    pub total: f64,
}

pub struct FilterManager {
    cards: Vec<Card>,
    filters: Vec<FilterSpec>,
    selected: BTreeMap<String, String>,
    total_attribute: Option<String>,
}

impl FilterManager {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            filters: Vec::new(),
            selected: BTreeMap::new(),
            total_attribute: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    /// Attribute summed over the visible cards in the stats line.
    pub fn with_total_attribute(mut self, attr: &str) -> Self {
        self.total_attribute = Some(attr.to_string());
        self
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    /// Select a value for a filter. An empty value clears it.
    pub fn set_filter(&mut self, id: &str, value: &str) -> Result<()> {
        if !self.filters.iter().any(|f| f.id == id) {
            return Err(FertilogError::NotFound(format!("filter '{}'", id)));
        }
        let value = value.trim();
        if value.is_empty() {
            self.selected.remove(id);
        } else {
            self.selected.insert(id.to_string(), value.to_string());
        }
        Ok(())
    }

    pub fn clear_filter(&mut self, id: &str) {
        self.selected.remove(id);
    }

    pub fn reset(&mut self) {
        self.selected.clear();
    }

    fn is_visible(&self, card: &Card) -> bool {
        self.filters.iter().all(|f| match self.selected.get(&f.id) {
            Some(value) => f.matches(card, value),
            None => true,
        })
    }

    pub fn visible_cards(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| self.is_visible(c)).collect()
    }

    pub fn apply(&self) -> FilterStats {
        let visible = self.visible_cards();
        let total = self
            .total_attribute
            .as_deref()
            .map(|attr| visible.iter().filter_map(|c| c.number(attr)).sum())
            .unwrap_or(0.0);
        FilterStats {
            count: visible.len(),
            total,
        }
    }

    pub fn chips(&self) -> Vec<Chip> {
        self.filters
            .iter()
            .filter_map(|f| {
                self.selected.get(&f.id).map(|value| Chip {
                    filter_id: f.id.clone(),
                    label: f.label.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Distinct non-empty values of an attribute, sorted.
    pub fn options_from_cards(&self, attr: &str) -> Vec<String> {
        let values: BTreeSet<&str> = self
            .cards
            .iter()
            .filter_map(|c| c.get(attr))
            .filter(|v| !v.is_empty() && *v != "undefined")
            .collect();
        let mut values: Vec<String> = values.into_iter().map(String::from).collect();
        values.sort_by_key(|v| v.to_lowercase());
        values
    }

    pub fn stats_line(&self) -> String {
        let stats = self.apply();
        let mut line = format!(
            "{} item{} shown",
            stats.count,
            if stats.count == 1 { "" } else { "s" }
        );
        if let Some(attr) = &self.total_attribute {
            if stats.total > 0.0 {
                line.push_str(&format!(" | Total {}: {:.2}", attr, stats.total));
            }
        }
        line
    }

    /// CSV of the visible cards. `fields` maps attributes to column headers;
    /// without fields every attribute of the first visible card is exported.
    pub fn export_csv(&self, fields: &[(&str, &str)]) -> Result<String> {
        let visible = self.visible_cards();
        let Some(first) = visible.first() else {
            return Err(FertilogError::InvalidData(
                "No data to export, adjust the filters".into(),
            ));
        };

        let columns: Vec<(String, String)> = if fields.is_empty() {
            first
                .attrs
                .keys()
                .map(|k| (k.clone(), k.clone()))
                .collect()
        } else {
            fields
                .iter()
                .map(|(attr, header)| (attr.to_string(), header.to_string()))
                .collect()
        };

        let mut rows = Vec::with_capacity(visible.len() + 1);
        rows.push(
            columns
                .iter()
                .map(|(_, header)| csv_field(header))
                .collect::<Vec<_>>()
                .join(","),
        );
        for card in &visible {
            rows.push(
                columns
                    .iter()
                    .map(|(attr, _)| csv_field(card.get(attr).unwrap_or("")))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        Ok(rows.join("\n"))
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_buckets() -> Vec<RangeBucket> {
        vec![
            RangeBucket::new("< 1 ha", None, Some(1.0)),
            RangeBucket::new("1 - 5 ha", Some(1.0), Some(5.0)),
            RangeBucket::new(">= 5 ha", Some(5.0), None),
        ]
    }

    fn manager() -> FilterManager {
        let cards = vec![
            Card::new()
                .with("naam", "Akker")
                .with("grondsoort", "Klei")
                .with("oppervlakte", "0.8")
                .with("nv-gebied", "Ja"),
            Card::new()
                .with("naam", "Wei, achter")
                .with("grondsoort", "Zand")
                .with("oppervlakte", "1.0")
                .with("nv-gebied", "Nee"),
            Card::new()
                .with("naam", "Zuid \"groot\"")
                .with("grondsoort", "Klei")
                .with("oppervlakte", "5")
                .with("nv-gebied", "Ja"),
            Card::new()
                .with("naam", "Onbekend")
                .with("grondsoort", "")
                .with("oppervlakte", "n/a"),
        ];
        FilterManager::new(cards)
            .with_filter(FilterSpec::exact("soil", "Grondsoort", "grondsoort"))
            .with_filter(FilterSpec::range("area", "Oppervlakte", "oppervlakte", area_buckets()))
            .with_filter(FilterSpec::exact("nv", "NV-gebied", "nvGebied"))
            .with_total_attribute("oppervlakte")
    }

    #[test]
    fn kebab_and_camel_keys_match() {
        assert_eq!(data_key("nv-gebied"), "nvGebied");
        assert_eq!(data_key("nvGebied"), "nvGebied");
        assert_eq!(data_key("a-b-c"), "aBC");
        let card = Card::new().with("nv-gebied", "Ja");
        assert_eq!(card.get("nvGebied"), Some("Ja"));
    }

    #[test]
    fn exact_filter() {
        let mut m = manager();
        m.set_filter("soil", "Klei").unwrap();
        let names: Vec<&str> = m.visible_cards().iter().filter_map(|c| c.get("naam")).collect();
        assert_eq!(names, vec!["Akker", "Zuid \"groot\""]);
    }

    #[test]
    fn range_bounds_and_non_numeric_values() {
        let mut m = manager();
        m.set_filter("area", "1 - 5 ha").unwrap();
        let names: Vec<&str> = m.visible_cards().iter().filter_map(|c| c.get("naam")).collect();
        // 1.0 is in, 5 is out, "n/a" passes
        assert_eq!(names, vec!["Wei, achter", "Onbekend"]);

        m.set_filter("area", "no such bucket").unwrap();
        assert_eq!(m.visible_cards().len(), 4);
    }

    #[test]
    fn filters_combine_and_stats_sum() {
        let mut m = manager();
        m.set_filter("soil", "Klei").unwrap();
        m.set_filter("nv", "Ja").unwrap();
        let stats = m.apply();
        assert_eq!(stats.count, 2);
        assert!((stats.total - 5.8).abs() < 1e-9);
        assert_eq!(m.stats_line(), "2 items shown | Total oppervlakte: 5.80");
    }

    #[test]
    fn chips_and_reset() {
        let mut m = manager();
        m.set_filter("soil", "Zand").unwrap();
        m.set_filter("area", "").unwrap();
        let chips = m.chips();
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].label, "Grondsoort");
        assert_eq!(chips[0].value, "Zand");

        m.clear_filter("soil");
        assert!(m.chips().is_empty());

        m.set_filter("soil", "Zand").unwrap();
        m.reset();
        assert_eq!(m.visible_cards().len(), 4);
        assert!(m.set_filter("crop", "Mais").is_err());
    }

    #[test]
    fn single_item_stats_without_total() {
        let mut m = manager();
        m.set_filter("soil", "Zand").unwrap();
        m.set_filter("area", "< 1 ha").unwrap();
        assert_eq!(m.stats_line(), "0 items shown");
        m.set_filter("area", "").unwrap();
        assert_eq!(m.stats_line(), "1 item shown | Total oppervlakte: 1.00");
    }

    #[test]
    fn options_are_unique_and_sorted() {
        let m = manager();
        assert_eq!(m.options_from_cards("grondsoort"), vec!["Klei", "Zand"]);
    }

    #[test]
    fn csv_quotes_special_characters() {
        let mut m = manager();
        m.set_filter("area", ">= 5 ha").unwrap();
        m.set_filter("soil", "Klei").unwrap();
        let csv = m
            .export_csv(&[("naam", "Perceel"), ("oppervlakte", "Oppervlakte (ha)")])
            .unwrap();
        assert_eq!(csv, "Perceel,Oppervlakte (ha)\n\"Zuid \"\"groot\"\"\",5");

        m.set_filter("soil", "Zand").unwrap();
        m.set_filter("area", "").unwrap();
        let csv = m.export_csv(&[("naam", "Perceel")]).unwrap();
        assert_eq!(csv, "Perceel\n\"Wei, achter\"");
    }

    #[test]
    fn csv_without_fields_uses_all_attributes() {
        let mut m = manager();
        m.set_filter("soil", "Zand").unwrap();
        let csv = m.export_csv(&[]).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(header, "grondsoort,naam,nvGebied,oppervlakte");
    }

    #[test]
    fn csv_export_requires_visible_cards() {
        let mut m = manager();
        m.set_filter("soil", "Veen").unwrap();
        assert!(matches!(m.export_csv(&[]), Err(FertilogError::InvalidData(_))));
    }
}

use super::wizard::{ReviewCard, ReviewSummary};
use crate::logic::{EffectivenessResult, UseCase};

fn render_card(card: &ReviewCard) -> String {
    [
        format!("  Parcel:          {}", card.parcel_name),
        format!("  Area:            {:.2} ha", card.area_ha),
        format!("  Soil:            {}", card.soil_type),
        format!("  Crop:            {}", card.crop),
        format!("  Category:        {}", card.mapped_category),
        format!("  Use case:        {}", card.use_case),
        format!("  Effectiveness:   {}", card.effectiveness.label()),
        format!("  Effective N:     {:.2} kg/ha", card.effective_n),
    ]
    .join("\n")
}

pub fn render_review(summary: &ReviewSummary) -> String {
    let mut out = vec![
        format!("Company:      {}", summary.company),
        format!("Year:         {}", summary.year),
        format!("Fertilizer:   {}", summary.product),
        format!("Date:         {}", summary.date),
        format!("Origin:       {}", summary.origin),
        format!("Quantity:     {:.2} kg/ha", summary.quantity_kg_ha),
        format!(
            "N/P2O5/K2O:   {:.2} / {:.2} / {:.2} kg/ha",
            summary.nutrients.n, summary.nutrients.p2o5, summary.nutrients.k2o
        ),
        String::new(),
    ];

    for card in &summary.cards {
        out.push(render_card(card));
        out.push(String::new());
    }

    out.push(format!("Average effective N: {} kg/ha", summary.average_label()));
    out.join("\n")
}

/// One-shot calculator output.
pub fn render_effectiveness(result: &EffectivenessResult) -> String {
    let use_case = result
        .use_case
        .filter(|u| !u.is_none())
        .as_ref()
        .map(UseCase::to_string)
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        format!(
            "Category:       {}",
            result.mapped_category.as_deref().unwrap_or("-")
        ),
        format!("Use case:       {}", use_case),
        format!("Effectiveness:  {}", result.effectiveness.label()),
        format!("Effective N:    {:.2} kg/ha", result.effective_nitrogen),
    ];
    if let crate::logic::Effectiveness::Unknown(reason) = result.effectiveness {
        lines.push(format!("Note:           {}", reason));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Effectiveness, UnknownReason};
    use crate::models::{Nutrients, Origin};

    fn card(name: &str, effectiveness: Effectiveness, n: f64) -> ReviewCard {
        ReviewCard {
            parcel_name: name.into(),
            area_ha: 2.5,
            soil_type: "Klei".into(),
            crop: "Mais".into(),
            mapped_category: "Drijfmest van varkens".into(),
            use_case: "Op klei en veen".into(),
            effectiveness,
            effective_n: n,
        }
    }

    #[test]
    fn review_lists_cards_and_average() {
        let summary = ReviewSummary {
            company: "De Hoeve".into(),
            year: 2024,
            product: "Drijfmest varkens".into(),
            date: "15-10-2024".into(),
            origin: Origin::Imported,
            quantity_kg_ha: 30000.0,
            nutrients: Nutrients::new(100.0, 40.0, 120.0),
            cards: vec![
                card("Akker", Effectiveness::Known(60.0), 60.0),
                card("Wei", Effectiveness::Unknown(UnknownReason::NoCoefficient), 0.0),
            ],
        };
        let text = render_review(&summary);
        assert!(text.contains("Parcel:          Akker"));
        assert!(text.contains("Effectiveness:   60.0%"));
        assert!(text.contains("Effectiveness:   –"));
        assert!(text.contains("Average effective N: 30.00 kg/ha"));
    }

    #[test]
    fn effectiveness_output_explains_unknown() {
        let result = EffectivenessResult {
            effective_nitrogen: 0.0,
            effectiveness: Effectiveness::Unknown(UnknownReason::EmptyTable),
            use_case: None,
            mapped_category: Some("Drijfmest van varkens".into()),
        };
        let text = render_effectiveness(&result);
        assert!(text.contains("Use case:       -"));
        assert!(text.contains("working-coefficient table not loaded"));
    }
}

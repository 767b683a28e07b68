use crate::models::{FertilizerProduct, Nutrients, QuantityMode};
use chrono::NaiveDate;

/// Parse a Dutch `DD-MM-YYYY` date. Anything else, including impossible
/// calendar dates, yields `None`.
pub fn parse_dutch_date(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.trim().split('-').collect();
    if parts.len() != 3 {
        return None;
    }

    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_dutch_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Treat missing, negative or non-finite amounts as zero.
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Convert an entered amount to kg per hectare.
///
/// Total amounts are spread over `area_ha`; without a positive area there is
/// nothing to spread over and the result is zero.
pub fn to_per_hectare(amount: f64, mode: QuantityMode, area_ha: f64) -> f64 {
    let amount = sanitize_amount(amount);
    match mode {
        QuantityMode::PerHectare => amount,
        QuantityMode::Total if area_ha > 0.0 => amount / area_ha,
        QuantityMode::Total => 0.0,
    }
}

/// Inverse of [`to_per_hectare`].
pub fn to_total(per_hectare: f64, mode: QuantityMode, area_ha: f64) -> f64 {
    let per_hectare = sanitize_amount(per_hectare);
    match mode {
        QuantityMode::PerHectare => per_hectare,
        QuantityMode::Total if area_ha > 0.0 => per_hectare * area_ha,
        QuantityMode::Total => 0.0,
    }
}

/// Sum of the selected areas, ignoring non-finite values.
pub fn total_area<I>(areas: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    areas.into_iter().filter(|a| a.is_finite()).sum()
}

/// Nutrient load per hectare for one application.
///
/// Animal manure has no fixed composition, so its N/P2O5/K2O come from
/// `manual` (entered in the same unit as the quantity). Other products derive
/// the load from their percentages and the per-hectare quantity.
pub fn nutrients_per_hectare(
    product: Option<&FertilizerProduct>,
    quantity: f64,
    manual: Nutrients,
    mode: QuantityMode,
    area_ha: f64,
) -> Nutrients {
    let Some(product) = product else {
        return Nutrients::default();
    };

    if product.is_animal_manure() {
        return Nutrients::new(
            to_per_hectare(manual.n, mode, area_ha),
            to_per_hectare(manual.p2o5, mode, area_ha),
            to_per_hectare(manual.k2o, mode, area_ha),
        );
    }

    let kg_ha = to_per_hectare(quantity, mode, area_ha);
    Nutrients::new(
        kg_ha * sanitize_amount(product.nitrogen_pct) / 100.0,
        kg_ha * sanitize_amount(product.phosphate_pct) / 100.0,
        kg_ha * sanitize_amount(product.potassium_pct) / 100.0,
    )
}

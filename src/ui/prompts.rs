use super::review::render_review;
use super::wizard::{Wizard, WizardError, WizardStep};
use crate::error::{FertilogError, Result};
use crate::logic::RuleContext;
use crate::models::{FertilizationEvent, Nutrients, Origin, QuantityMode};
use dialoguer::{Confirm, Input, MultiSelect, Select};

fn input_error(e: dialoguer::Error) -> FertilogError {
    FertilogError::InvalidData(format!("Input error: {}", e))
}

/// Walk the user through the wizard in the terminal.
/// Returns `None` when the user cancels at the review.
pub fn run_wizard(ctx: &RuleContext, default_mode: QuantityMode) -> Result<Option<Vec<FertilizationEvent>>> {
    let mut wizard = Wizard::new(default_mode);
    drive(&mut wizard, ctx)
}

/// Each prompt returns `Ok(false)` when the user wants to go back.
fn drive(wizard: &mut Wizard, ctx: &RuleContext) -> Result<Option<Vec<FertilizationEvent>>> {
    loop {
        println!();
        println!("Step {}/4 - {}", wizard.step().number(), wizard.step().title());

        let outcome = match wizard.step() {
            WizardStep::Selection => prompt_selection(wizard, ctx),
            WizardStep::Product => prompt_product(wizard, ctx),
            WizardStep::Quantities => prompt_quantities(wizard, ctx),
            WizardStep::Review => match prompt_review(wizard, ctx)? {
                ReviewChoice::Done(events) => return Ok(events),
                ReviewChoice::Revisit => continue,
            },
        };

        match outcome {
            Ok(true) => {
                if let Err(e) = wizard.next(ctx) {
                    println!("  {}", e);
                }
            }
            Ok(false) => {
                wizard.back();
            }
            Err(FertilogError::Wizard(e)) => println!("  {}", e),
            Err(e) => return Err(e),
        }
    }
}

enum ReviewChoice {
    Done(Option<Vec<FertilizationEvent>>),
    Revisit,
}

fn prompt_selection(wizard: &mut Wizard, ctx: &RuleContext) -> Result<bool> {
    let years = ctx.reference().available_years();
    if years.is_empty() {
        return Err(FertilogError::NotFound(
            "No usage norms in the reference data".into(),
        ));
    }
    let labels: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    let idx = Select::new()
        .with_prompt("Year")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(input_error)?;
    wizard.select_year(ctx, years[idx])?;

    let companies = ctx.reference().companies_for_year(years[idx]);
    let names: Vec<&str> = companies.iter().map(|c| c.name.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Company")
        .items(&names)
        .default(0)
        .interact()
        .map_err(input_error)?;
    wizard.select_company(ctx, &companies[idx].id)?;

    let options = wizard.parcel_options(ctx);
    let labels: Vec<String> = options.iter().map(|o| o.label()).collect();
    let chosen = MultiSelect::new()
        .with_prompt("Parcels (space to toggle)")
        .items(&labels)
        .interact()
        .map_err(input_error)?;
    let norm_ids: Vec<&str> = chosen.iter().map(|i| options[*i].usage_norm_id.as_str()).collect();
    wizard.select_parcels(ctx, &norm_ids)?;

    println!(
        "  {} parcel(s), {:.2} ha",
        wizard.selected_parcels().len(),
        wizard.selected_area()
    );
    Ok(true)
}

fn prompt_product(wizard: &mut Wizard, ctx: &RuleContext) -> Result<bool> {
    let query: String = Input::new()
        .with_prompt("Search fertilizer (blank to go back)")
        .allow_empty(true)
        .interact_text()
        .map_err(input_error)?;
    if query.trim().is_empty() {
        return Ok(false);
    }

    let matches = ctx.reference().search_products(&query);
    if matches.is_empty() {
        return Err(WizardError::UnknownSelection(format!("fertilizer matching '{}'", query)).into());
    }
    let names: Vec<&str> = matches.iter().map(|p| p.name.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Fertilizer")
        .items(&names)
        .default(0)
        .interact()
        .map_err(input_error)?;
    let product = matches[idx];
    wizard.choose_product(ctx, &product.id)?;
    println!("  {}", product.composition_label());

    let own_farm = Confirm::new()
        .with_prompt("Produced on own farm?")
        .default(false)
        .interact()
        .map_err(input_error)?;
    wizard.set_origin(Origin::from_own_farm(own_farm));
    Ok(true)
}

fn prompt_quantities(wizard: &mut Wizard, ctx: &RuleContext) -> Result<bool> {
    let date: String = Input::new()
        .with_prompt("Date (DD-MM-YYYY, blank to go back)")
        .allow_empty(true)
        .interact_text()
        .map_err(input_error)?;
    if date.trim().is_empty() {
        return Ok(false);
    }
    wizard.set_date(&date);

    let modes = [QuantityMode::PerHectare, QuantityMode::Total];
    let labels: Vec<&str> = modes.iter().map(|m| m.as_str()).collect();
    let default_idx = modes
        .iter()
        .position(|m| *m == wizard.quantity_mode())
        .unwrap_or(0);
    let mode = modes[Select::new()
        .with_prompt("Quantity entered as")
        .items(&labels)
        .default(default_idx)
        .interact()
        .map_err(input_error)?];

    let quantity: f64 = Input::new()
        .with_prompt(format!("Quantity ({})", mode))
        .interact_text()
        .map_err(input_error)?;
    wizard.set_quantity(quantity, mode);

    if wizard.product(ctx).is_some_and(|p| p.is_animal_manure()) {
        println!("  Animal manure: enter nutrients in {}", mode);
        let read = |label: &str| -> Result<f64> {
            Input::new()
                .with_prompt(format!("  {}", label))
                .default(0.0)
                .interact_text()
                .map_err(input_error)
        };
        let manual = Nutrients::new(read("N")?, read("P2O5")?, read("K2O")?);
        wizard.set_manual_nutrients(manual);
    }

    let notes: String = Input::new()
        .with_prompt("Notes")
        .allow_empty(true)
        .interact_text()
        .map_err(input_error)?;
    wizard.set_notes(&notes);
    Ok(true)
}

fn prompt_review(wizard: &mut Wizard, ctx: &RuleContext) -> Result<ReviewChoice> {
    println!();
    println!("{}", render_review(&wizard.review(ctx)));
    println!();

    let choice = Select::new()
        .with_prompt("Register this fertilization?")
        .items(&["Register", "Back", "Cancel"])
        .default(0)
        .interact()
        .map_err(input_error)?;

    match choice {
        0 => match wizard.submit(ctx) {
            Ok(events) => Ok(ReviewChoice::Done(Some(events))),
            // The wizard is back at step one
            Err(e @ WizardError::MissingUsageNorm(_)) => {
                println!("  {}", e);
                Ok(ReviewChoice::Revisit)
            }
            Err(e) => Err(e.into()),
        },
        1 => {
            wizard.back();
            Ok(ReviewChoice::Revisit)
        }
        _ => Ok(ReviewChoice::Done(None)),
    }
}

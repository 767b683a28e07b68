mod app;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod ui;

use anyhow::Context;
use app::App;
use clap::Parser;
use cli::{Cli, Commands, EffectiveArgs, ParcelsArgs, RegistryCommand};
use config::Config;
use logic::{map_registry_soil, ParcelOption};
use models::{BoundingBox, FertilizerProduct, LatLng};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use ui::review::render_effectiveness;
use ui::{Card, FilterManager, FilterSpec, RangeBucket};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Subcommands that need no config
    match &cli.command {
        Some(Commands::Init) => {
            Config::setup_interactive()?;
            return Ok(());
        }
        Some(Commands::Registry(RegistryCommand::Soil {
            raw,
            southern,
            loess,
        })) => {
            println!("{}", map_registry_soil(raw, *southern, *loess));
            return Ok(());
        }
        _ => {}
    }

    let config = if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config.clone())?
    } else {
        let (config, _path) = Config::setup_interactive()?;
        config
    };

    let app = App::bootstrap(config, cli.reference.as_ref()).await?;

    match cli.command {
        Some(Commands::Check) => check(&app).await,
        Some(Commands::Effective(args)) => effective(&app, &args),
        Some(Commands::Register { dry_run }) => register(&app, dry_run).await,
        Some(Commands::Parcels(args)) => parcels(&app, &args),
        Some(Commands::Registry(RegistryCommand::Parcels { bbox, soil })) => {
            registry(&app, &bbox, soil).await
        }
        Some(Commands::Registry(RegistryCommand::SoilAt { lat, lng })) => {
            soil_at(&app, LatLng { lat, lng }).await
        }
        // Handled before bootstrap
        Some(Commands::Init) | Some(Commands::Registry(RegistryCommand::Soil { .. })) => Ok(()),
        None => register(&app, false).await,
    }
}

async fn check(app: &App) -> anyhow::Result<()> {
    println!("Config OK");
    println!("  Server: {}", app.config.server.base_url);

    match app.bookkeeping.test_connection().await {
        Ok(true) => println!("  Bookkeeping server: OK"),
        Ok(false) => println!("  Bookkeeping server: responded with an error"),
        Err(e) => println!("  Bookkeeping server: OFFLINE ({})", e),
    }

    let coefficients = app.ctx.coefficients();
    if coefficients.is_empty() {
        println!("  Working coefficients: none loaded");
    } else {
        println!("  Working coefficients: {} entries", coefficients.len());
    }

    let reference = app.ctx.reference();
    if reference.is_empty() {
        println!("  Reference data: none loaded");
    } else {
        println!(
            "  Reference data: {} usage norms, {} parcels, {} fertilizers",
            reference.usage_norms.len(),
            reference.parcels.len(),
            reference.products.len()
        );
    }

    if app.registry.is_enabled() {
        println!("  Parcel registry: {}", app.config.registry.url);
    } else {
        println!("  Parcel registry: disabled");
    }

    match &app.config.soil_map.layer_url {
        Some(url) => println!("  Soil map: {}", url),
        None => println!("  Soil map: not configured"),
    }
    Ok(())
}

fn effective(app: &App, args: &EffectiveArgs) -> anyhow::Result<()> {
    let known = app
        .ctx
        .reference()
        .products
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(args.product.trim()))
        .cloned();

    let product = known.unwrap_or_else(|| {
        let product = FertilizerProduct::new("", args.product.trim());
        if args.manure {
            product.with_application_type("dierlijke mest")
        } else {
            product
        }
    });

    let result = app.ctx.calculate(
        args.nitrogen,
        Some(&product),
        args.own_farm,
        &args.soil,
        &args.crop,
        &args.date,
    );
    println!("{}", render_effectiveness(&result));
    Ok(())
}

async fn register(app: &App, dry_run: bool) -> anyhow::Result<()> {
    let Some(events) = ui::prompts::run_wizard(&app.ctx, app.config.wizard.default_quantity_mode)?
    else {
        println!("Cancelled");
        return Ok(());
    };

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    let count = app
        .bookkeeping
        .submit(&events)
        .await
        .context("Registering the fertilization failed")?;
    println!("Registered fertilization on {} parcel(s)", count);
    Ok(())
}

const AREA_BUCKETS: [(&str, Option<f64>, Option<f64>); 4] = [
    ("<1", None, Some(1.0)),
    ("1-5", Some(1.0), Some(5.0)),
    ("5-10", Some(5.0), Some(10.0)),
    (">=10", Some(10.0), None),
];

fn parcel_card(option: &ParcelOption) -> Card {
    Card::new()
        .with("perceel", option.name.as_str())
        .with("gewas", option.crop.as_str())
        .with("grondsoort", option.soil_type.as_str())
        .with("oppervlakte", format!("{:.2}", option.area_ha))
        .with("gebruiksnorm-id", option.usage_norm_id.as_str())
}

fn parcels(app: &App, args: &ParcelsArgs) -> anyhow::Result<()> {
    let options = app.ctx.reference().parcel_options(args.year, &args.company);
    let cards = options.iter().map(parcel_card).collect();

    let buckets = AREA_BUCKETS
        .iter()
        .map(|(label, min, max)| RangeBucket::new(label, *min, *max))
        .collect();
    let mut manager = FilterManager::new(cards)
        .with_filter(FilterSpec::exact("soil", "Soil", "grondsoort"))
        .with_filter(FilterSpec::exact("crop", "Crop", "gewas"))
        .with_filter(FilterSpec::range("area", "Area", "oppervlakte", buckets))
        .with_total_attribute("oppervlakte");

    for (id, attr, value) in [
        ("soil", "grondsoort", &args.soil),
        ("crop", "gewas", &args.crop),
        ("area", "oppervlakte", &args.area),
    ] {
        let Some(value) = value else { continue };
        manager.set_filter(id, value)?;
        if id != "area" && !manager.options_from_cards(attr).contains(value) {
            println!(
                "No parcel has {} '{}'; available: {}",
                attr,
                value,
                manager.options_from_cards(attr).join(", ")
            );
        }
    }

    for chip in manager.chips() {
        println!("[{}: {}]", chip.label, chip.value);
    }
    for card in manager.visible_cards() {
        println!(
            "{:<24} {:<20} {:<16} {:>8} ha",
            card.get("perceel").unwrap_or(""),
            card.get("gewas").unwrap_or(""),
            card.get("grondsoort").unwrap_or(""),
            card.get("oppervlakte").unwrap_or("")
        );
    }
    println!("{}", manager.stats_line());

    if let Some(path) = &args.export {
        let csv = manager.export_csv(&[
            ("perceel", "Parcel"),
            ("gewas", "Crop"),
            ("grondsoort", "Soil"),
            ("oppervlakte", "Area (ha)"),
        ])?;
        std::fs::write(path, csv)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Exported to {}", path.display());
    }
    Ok(())
}

async fn registry(app: &App, bbox: &str, with_soil: bool) -> anyhow::Result<()> {
    let bbox = BoundingBox::parse(bbox)?;
    let parcels = app.registry.fetch(&bbox).await?;

    if with_soil && !app.soil_map.is_enabled() {
        println!("Soil map not configured; soil column left empty");
    }
    let lookup_soil = with_soil && app.soil_map.is_enabled();

    for parcel in &parcels {
        let centroid = parcel
            .centroid
            .map(|c| format!("{:.5},{:.5}", c.lat, c.lng))
            .unwrap_or_else(|| "-".to_string());
        let soil = match parcel.centroid {
            Some(point) if lookup_soil => match app.soil_map.soil_at(point).await {
                Ok(found) => found.category.to_string(),
                Err(e) => {
                    warn!(error = %e, "Soil lookup failed");
                    "-".to_string()
                }
            },
            _ => String::new(),
        };
        println!(
            "{:<14} {:<32} {:>6} {:>9.2} ha  {}  {}",
            parcel.id.as_deref().unwrap_or("-"),
            parcel.crop.as_deref().unwrap_or("-"),
            parcel.year.map(|y| y.to_string()).unwrap_or_default(),
            parcel.area_ha,
            centroid,
            soil
        );
    }
    println!("{} parcel(s)", parcels.len());
    Ok(())
}

async fn soil_at(app: &App, point: LatLng) -> anyhow::Result<()> {
    let found = app
        .soil_map
        .soil_at(point)
        .await
        .context("Soil map lookup failed")?;
    println!("{}", found.category);
    println!(
        "  soil map: {}  southern region: {}  loess region: {}",
        if found.raw.is_empty() { "-" } else { found.raw.as_str() },
        if found.in_southern { "yes" } else { "no" },
        if found.in_loess { "yes" } else { "no" }
    );
    Ok(())
}

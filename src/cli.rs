use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fertilog",
    version,
    about = "Fertilization bookkeeping with nitrogen working coefficients"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Reference data JSON (usage norms, companies, parcels, fertilizers)
    #[arg(short, long, global = true)]
    pub reference: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
    /// Compute effective nitrogen for one application
    Effective(EffectiveArgs),
    /// Register a fertilization with the step-by-step wizard
    Register {
        /// Print the events as JSON instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// List selectable parcels with filters and CSV export
    Parcels(ParcelsArgs),
    /// Crop-parcel registry lookups
    #[command(subcommand)]
    Registry(RegistryCommand),
}

#[derive(Args)]
pub struct EffectiveArgs {
    /// Fertilizer name, looked up in the reference data
    #[arg(short, long)]
    pub product: String,

    /// Nitrogen applied in kg/ha
    #[arg(short, long)]
    pub nitrogen: f64,

    /// Application date (DD-MM-YYYY)
    #[arg(short, long)]
    pub date: String,

    /// Soil type of the parcel
    #[arg(long, default_value = "")]
    pub soil: String,

    /// Crop on the parcel
    #[arg(long, default_value = "")]
    pub crop: String,

    /// Manure produced on own farm
    #[arg(long)]
    pub own_farm: bool,

    /// Treat an unknown product name as animal manure
    #[arg(long)]
    pub manure: bool,
}

#[derive(Args)]
pub struct ParcelsArgs {
    #[arg(long)]
    pub year: i32,

    /// Company id as stored by the bookkeeping server
    #[arg(long)]
    pub company: String,

    /// Only parcels with this soil type
    #[arg(long)]
    pub soil: Option<String>,

    /// Only parcels with this crop
    #[arg(long)]
    pub crop: Option<String>,

    /// Area bucket: "<1", "1-5", "5-10" or ">=10"
    #[arg(long)]
    pub area: Option<String>,

    /// Write the visible parcels to a CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum RegistryCommand {
    /// Fetch crop parcels within a bounding box
    Parcels {
        /// minx,miny,maxx,maxy in WGS84
        bbox: String,
        /// Look up the soil category at each parcel centroid
        #[arg(long)]
        soil: bool,
    },
    /// Soil category at a point, from the configured soil map
    SoilAt {
        lat: f64,
        lng: f64,
    },
    /// Map a soil-map value to a fertilization soil category
    Soil {
        /// Main soil type as found on the soil map
        raw: String,
        /// Point lies in the southern sand and loess region
        #[arg(long)]
        southern: bool,
        /// Point lies in the loess region
        #[arg(long)]
        loess: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_effective_command() {
        let cli = Cli::parse_from([
            "fertilog",
            "-v",
            "effective",
            "--product",
            "Drijfmest varkens",
            "--nitrogen",
            "100",
            "--date",
            "15-10-2024",
            "--soil",
            "Klei",
            "--manure",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Some(Commands::Effective(args)) => {
                assert_eq!(args.nitrogen, 100.0);
                assert_eq!(args.soil, "Klei");
                assert!(args.manure);
                assert!(!args.own_farm);
                assert_eq!(args.crop, "");
            }
            _ => panic!("expected effective"),
        }
    }

    #[test]
    fn parses_nested_registry_command() {
        let cli = Cli::parse_from(["fertilog", "registry", "soil", "ZAND", "--southern"]);
        match cli.command {
            Some(Commands::Registry(RegistryCommand::Soil { raw, southern, loess })) => {
                assert_eq!(raw, "ZAND");
                assert!(southern);
                assert!(!loess);
            }
            _ => panic!("expected registry soil"),
        }
    }

    #[test]
    fn parcels_accepts_uuid_company() {
        let cli = Cli::parse_from([
            "fertilog",
            "parcels",
            "--year",
            "2024",
            "--company",
            "9b1c2d3e-0000-4000-8000-000000000001",
        ]);
        match cli.command {
            Some(Commands::Parcels(args)) => {
                assert_eq!(args.company, "9b1c2d3e-0000-4000-8000-000000000001");
                assert_eq!(args.year, 2024);
            }
            _ => panic!("expected parcels"),
        }
    }

    #[test]
    fn parses_registry_soil_lookups() {
        let cli = Cli::parse_from(["fertilog", "registry", "parcels", "5.1,52.0,5.2,52.1", "--soil"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Registry(RegistryCommand::Parcels { soil: true, .. }))
        ));

        let cli = Cli::parse_from(["fertilog", "registry", "soil-at", "51.45", "5.48"]);
        match cli.command {
            Some(Commands::Registry(RegistryCommand::SoilAt { lat, lng })) => {
                assert_eq!(lat, 51.45);
                assert_eq!(lng, 5.48);
            }
            _ => panic!("expected registry soil-at"),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["fertilog", "register", "--dry-run", "--reference", "ref.json"]);
        assert_eq!(cli.reference, Some(PathBuf::from("ref.json")));
        assert!(matches!(cli.command, Some(Commands::Register { dry_run: true })));
    }
}

use crate::config::Config;
use crate::datasources::{load_reference, BookkeepingClient, ParcelRegistryClient, SoilMapClient};
use crate::error::{FertilogError, Result};
use crate::logic::RuleContext;
use crate::models::ReferenceData;
use std::path::PathBuf;
use tracing::{info, warn};

/// Connected state shared by the subcommands.
pub struct App {
    pub config: Config,
    pub ctx: RuleContext,
    pub bookkeeping: BookkeepingClient,
    pub registry: ParcelRegistryClient,
    pub soil_map: SoilMapClient,
}

impl App {
    /// Build clients and load reference data and working coefficients.
    ///
    /// Missing or unparseable reference data is not fatal: the calculator still works for
    /// products given on the command line, only the selection lists are empty.
    pub async fn bootstrap(config: Config, reference_override: Option<&PathBuf>) -> Result<Self> {
        let bookkeeping = BookkeepingClient::new(config.server.clone())?;
        let registry = ParcelRegistryClient::new(config.registry.clone());
        let soil_map = SoilMapClient::new(config.soil_map.clone());

        let reference_path = config.reference_path(reference_override)?;
        let reference = match load_reference(&reference_path) {
            Ok(r) => r,
            Err(FertilogError::NotFound(msg)) => {
                warn!("{}", msg);
                ReferenceData::default()
            }
            Err(FertilogError::Json(e)) => {
                warn!(path = %reference_path.display(), error = %e, "Reference data unreadable, continuing without it");
                ReferenceData::default()
            }
            Err(e) => return Err(e),
        };

        let coefficients = bookkeeping.load_coefficient_table().await;
        info!(path = %reference_path.display(), "Bootstrap complete");

        Ok(Self {
            ctx: RuleContext::new(reference, coefficients),
            config,
            bookkeeping,
            registry,
            soil_map,
        })
    }
}

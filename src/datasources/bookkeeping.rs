use crate::config::ServerConfig;
use crate::error::{FertilogError, Result};
use crate::logic::calculations::format_dutch_date;
use crate::logic::CoefficientTable;
use crate::models::{FertilizationEvent, WorkingCoefficientEntry};
use reqwest::header::COOKIE;
use std::time::Duration;
use tracing::{info, warn};

const COEFFICIENTS_PATH: &str = "/bemestingen/api/werkingscoefficienten";
const SUBMIT_PATH: &str = "/bemestingen/toevoegen";

/// Client for the bookkeeping server: working coefficients in, registered
/// fertilizations out.
pub struct BookkeepingClient {
    client: reqwest::Client,
    config: ServerConfig,
}

impl BookkeepingClient {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn with_session(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    pub async fn fetch_coefficients(&self) -> Result<Vec<WorkingCoefficientEntry>> {
        let response = self
            .with_session(self.client.get(self.url(COEFFICIENTS_PATH)))
            .send()
            .await
            .map_err(|e| FertilogError::DataSourceUnavailable(format!("Coefficient API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FertilogError::DataSourceUnavailable(format!(
                "Coefficient API returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            FertilogError::DataSourceUnavailable(format!(
                "Failed to parse coefficient response: {}",
                e
            ))
        })
    }

    /// Fetch the coefficient table, falling back to an empty table on any
    /// failure. Manure then evaluates as unknown effectiveness.
    pub async fn load_coefficient_table(&self) -> CoefficientTable {
        match self.fetch_coefficients().await {
            Ok(entries) => {
                info!(count = entries.len(), "Working coefficients loaded");
                CoefficientTable::new(entries)
            }
            Err(e) => {
                warn!(error = %e, "Working coefficients unavailable, continuing with empty table");
                CoefficientTable::default()
            }
        }
    }

    /// Register fertilizations. All events must come from one wizard run:
    /// they share company, product, date and amounts and differ by parcel.
    pub async fn submit(&self, events: &[FertilizationEvent]) -> Result<usize> {
        let form = submission_form(events)?;

        let response = self
            .with_session(self.client.post(self.url(SUBMIT_PATH)))
            .form(&form)
            .send()
            .await
            .map_err(|e| FertilogError::DataSourceUnavailable(format!("Bookkeeping server: {}", e)))?;

        if !response.status().is_success() {
            return Err(FertilogError::DataSourceUnavailable(format!(
                "Bookkeeping server returned {}",
                response.status()
            )));
        }

        info!(parcels = events.len(), "Fertilization registered");
        Ok(events.len())
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .with_session(self.client.get(self.url(COEFFICIENTS_PATH)))
            .send()
            .await
            .map_err(|e| FertilogError::DataSourceUnavailable(format!("Bookkeeping server: {}", e)))?;

        Ok(response.status().is_success())
    }
}

/// Form fields for the registration endpoint.
pub fn submission_form(events: &[FertilizationEvent]) -> Result<Vec<(String, String)>> {
    let first = events
        .first()
        .ok_or_else(|| FertilogError::InvalidData("No fertilization events to submit".into()))?;

    if let Some(other) = events.iter().find(|e| {
        e.company_id != first.company_id || e.product_id != first.product_id || e.date != first.date
    }) {
        return Err(FertilogError::InvalidData(format!(
            "Event for parcel {} does not belong to the same registration",
            other.parcel_id
        )));
    }

    let mut form: Vec<(String, String)> = events
        .iter()
        .map(|e| ("gebruiksnorm_ids[]".to_string(), e.usage_norm_id.clone()))
        .collect();

    form.extend([
        ("bedrijf_id".to_string(), first.company_id.clone()),
        ("meststof_id".to_string(), first.product_id.clone()),
        ("datum".to_string(), format_dutch_date(first.date)),
        ("hoeveelheid_kg_ha".to_string(), first.quantity_kg_ha.to_string()),
        ("n_kg_ha".to_string(), first.n_kg_ha.to_string()),
        ("p2o5_kg_ha".to_string(), first.p2o5_kg_ha.to_string()),
        ("k2o_kg_ha".to_string(), first.k2o_kg_ha.to_string()),
        ("notities".to_string(), first.notes.clone().unwrap_or_default()),
    ]);

    // Checkbox semantics: present means own farm
    if first.origin.is_own_farm() {
        form.push(("eigen_bedrijf".to_string(), "on".to_string()));
    }

    Ok(form)
}

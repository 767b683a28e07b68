use crate::config::SoilMapConfig;
use crate::error::{FertilogError, Result};
use crate::logic::map_registry_soil;
use crate::logic::soil::RegistrySoil;
use crate::models::LatLng;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Client for point queries against the soil-map FeatureServer layers.
pub struct SoilMapClient {
    client: reqwest::Client,
    config: SoilMapConfig,
}

/// Soil category at a point plus the raw values it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilLookup {
    pub category: RegistrySoil,
    pub raw: String,
    pub in_southern: bool,
    pub in_loess: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<QueryFeature>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryFeature {
    #[serde(default)]
    attributes: Option<Map<String, Value>>,
}

fn parse_response(body: &str) -> Result<QueryResponse> {
    let response: QueryResponse = serde_json::from_str(body)?;
    if let Some(error) = &response.error {
        return Err(FertilogError::DataSourceUnavailable(format!(
            "Soil map query failed: {}",
            error
        )));
    }
    Ok(response)
}

/// Main soil type of the first intersecting feature; empty when none.
pub fn parse_soil_attribute(body: &str, field: &str) -> Result<String> {
    let response = parse_response(body)?;
    let value = response
        .features
        .first()
        .and_then(|f| f.attributes.as_ref())
        .and_then(|attrs| attrs.get(field))
        .map(|v| match v {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    Ok(value)
}

/// Whether a region layer has any feature at the point.
pub fn parse_has_features(body: &str) -> Result<bool> {
    Ok(!parse_response(body)?.features.is_empty())
}

fn point_geometry(point: LatLng) -> String {
    format!(
        r#"{{"x":{},"y":{},"spatialReference":{{"wkid":4326}}}}"#,
        point.lng, point.lat
    )
}

impl SoilMapClient {
    pub fn new(config: SoilMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.layer_url.is_some()
    }

    async fn query_point(&self, layer_url: &str, point: LatLng, out_fields: &str) -> Result<String> {
        let url = format!("{}/query", layer_url.trim_end_matches('/'));
        debug!(%url, lat = point.lat, lng = point.lng, "Querying soil map");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("f", "json".to_string()),
                ("geometry", point_geometry(point)),
                ("geometryType", "esriGeometryPoint".to_string()),
                ("inSR", "4326".to_string()),
                ("spatialRel", "esriSpatialRelIntersects".to_string()),
                ("outFields", out_fields.to_string()),
                ("returnGeometry", "false".to_string()),
                ("where", "1=1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| FertilogError::DataSourceUnavailable(format!("Soil map: {}", e)))?;

        if !response.status().is_success() {
            return Err(FertilogError::DataSourceUnavailable(format!(
                "Soil map returned {}",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }

    /// Region membership. A failing region layer counts as outside.
    async fn in_region(&self, layer_url: Option<&str>, point: LatLng) -> bool {
        let Some(layer_url) = layer_url else {
            return false;
        };
        match self
            .query_point(layer_url, point, "OBJECTID")
            .await
            .and_then(|body| parse_has_features(&body))
        {
            Ok(inside) => inside,
            Err(e) => {
                warn!(error = %e, "Region layer lookup failed, assuming outside");
                false
            }
        }
    }

    /// Norm soil category at a WGS84 point.
    pub async fn soil_at(&self, point: LatLng) -> Result<SoilLookup> {
        let layer_url = self.config.layer_url.as_deref().ok_or_else(|| {
            FertilogError::DataSourceUnavailable("No soil map layer configured".into())
        })?;

        let body = self
            .query_point(layer_url, point, &self.config.soil_field)
            .await?;
        let raw = parse_soil_attribute(&body, &self.config.soil_field)?;

        let in_southern = self
            .in_region(self.config.southern_region_url.as_deref(), point)
            .await;
        let in_loess = self
            .in_region(self.config.loess_region_url.as_deref(), point)
            .await;

        Ok(SoilLookup {
            category: map_registry_soil(&raw, in_southern, in_loess),
            raw,
            in_southern,
            in_loess,
        })
    }
}

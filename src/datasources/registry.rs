use crate::config::RegistryConfig;
use crate::error::{FertilogError, Result};
use crate::models::{polygon_area_ha, ring_centroid, BoundingBox, LatLng, RegistryParcel};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

const COLLECTION: &str = "brpgewas";
const MAX_LIMIT: u32 = 1000;

/// Client for the BRP crop-parcel OGC API.
pub struct ParcelRegistryClient {
    client: reqwest::Client,
    config: RegistryConfig,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// Rings of the polygon to draw; multipolygons use their first part.
    fn rings(&self) -> Vec<Vec<[f64; 2]>> {
        let polygon = match self {
            Geometry::Polygon { coordinates } => Some(coordinates),
            Geometry::MultiPolygon { coordinates } => coordinates.first(),
            Geometry::Unsupported => None,
        };
        polygon
            .map(|rings| rings.iter().map(|ring| to_positions(ring)).collect())
            .unwrap_or_default()
    }
}

fn to_positions(ring: &[Vec<f64>]) -> Vec<[f64; 2]> {
    ring.iter()
        .filter_map(|p| match p.as_slice() {
            [lng, lat, ..] => Some([*lng, *lat]),
            _ => None,
        })
        .collect()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn property<'a>(props: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| props.get(*k))
        .find(|v| !v.is_null())
}

fn parse_feature(feature: Feature) -> RegistryParcel {
    let props = feature.properties.unwrap_or_default();
    let rings = feature
        .geometry
        .as_ref()
        .map(Geometry::rings)
        .unwrap_or_default();
    let exterior = rings.first().cloned().unwrap_or_default();

    RegistryParcel {
        id: feature
            .id
            .as_ref()
            .or_else(|| property(&props, &["id"]))
            .and_then(value_to_string),
        crop: property(&props, &["gewas", "gewascode"]).and_then(value_to_string),
        year: property(&props, &["jaar", "teeltjaar"]).and_then(|v| match v {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }),
        category: property(&props, &["category"]).and_then(value_to_string),
        outline: exterior
            .iter()
            .map(|[lng, lat]| LatLng {
                lat: *lat,
                lng: *lng,
            })
            .collect(),
        centroid: ring_centroid(&exterior),
        area_ha: polygon_area_ha(&rings),
    }
}

/// Parse a GeoJSON FeatureCollection into registry parcels.
pub fn parse_features(body: &str) -> Result<Vec<RegistryParcel>> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    Ok(collection.features.into_iter().map(parse_feature).collect())
}

impl ParcelRegistryClient {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<RegistryParcel>> {
        if !self.config.enabled {
            return Err(FertilogError::DataSourceUnavailable(
                "Parcel registry is disabled in the configuration".into(),
            ));
        }

        let url = format!(
            "{}/collections/{}/items",
            self.config.url.trim_end_matches('/'),
            COLLECTION
        );
        let limit = self.config.limit.clamp(1, MAX_LIMIT);
        debug!(%url, bbox = %bbox, limit, "Querying parcel registry");

        let response = self
            .client
            .get(&url)
            .query(&[("bbox", bbox.to_query()), ("limit", limit.to_string())])
            .header("Accept", "application/geo+json")
            .send()
            .await
            .map_err(|e| FertilogError::DataSourceUnavailable(format!("Parcel registry: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FertilogError::DataSourceUnavailable(format!(
                "Parcel registry returned {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let parcels = parse_features(&body)?;
        info!(count = parcels.len(), "Registry parcels fetched");
        Ok(parcels)
    }
}

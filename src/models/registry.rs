use crate::error::{FertilogError, Result};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_378_137.0;
const MAX_BBOX_SQUARE_DEGREES: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// WGS84 bounding box, `minx,miny,maxx,maxy` in lon/lat order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let bbox = Self {
            min_x,
            min_y,
            max_x,
            max_y,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Parse `minx,miny,maxx,maxy`, optionally followed by `,EPSG:4326`.
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let coords = match parts.as_slice() {
            [a, b, c, d] => [*a, *b, *c, *d],
            [a, b, c, d, crs] if crs.eq_ignore_ascii_case("EPSG:4326") => [*a, *b, *c, *d],
            _ => {
                return Err(FertilogError::InvalidData(
                    "Give bbox as 'minx,miny,maxx,maxy' (WGS84)".into(),
                ))
            }
        };

        let mut numbers = [0.0; 4];
        for (slot, raw) in numbers.iter_mut().zip(coords) {
            *slot = raw.parse::<f64>().map_err(|_| {
                FertilogError::InvalidData(format!("bbox contains an invalid number: {}", raw))
            })?;
        }

        Self::new(numbers[0], numbers[1], numbers[2], numbers[3])
    }

    fn validate(&self) -> Result<()> {
        let all_finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(FertilogError::InvalidData("bbox contains an invalid number".into()));
        }
        if self.max_x <= self.min_x || self.max_y <= self.min_y {
            return Err(FertilogError::InvalidData("bbox is invalid (max <= min)".into()));
        }
        if self.square_degrees() > MAX_BBOX_SQUARE_DEGREES {
            return Err(FertilogError::InvalidData("bbox too large, zoom in further".into()));
        }
        Ok(())
    }

    pub fn square_degrees(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    pub fn to_query(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_query())
    }
}

/// Crop parcel from the national crop-parcel registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryParcel {
    pub id: Option<String>,
    pub crop: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    /// Exterior ring
    pub outline: Vec<LatLng>,
    pub centroid: Option<LatLng>,
    pub area_ha: f64,
}

/// Planar centroid of a ring given as `[lon, lat]` positions.
pub fn ring_centroid(ring: &[[f64; 2]]) -> Option<LatLng> {
    if ring.len() < 3 {
        return None;
    }

    let (mut area2, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for pair in ring.windows(2) {
        let [x1, y1] = pair[0];
        let [x2, y2] = pair[1];
        let cross = x1 * y2 - x2 * y1;
        area2 += cross;
        cx += (x1 + x2) * cross;
        cy += (y1 + y2) * cross;
    }

    if area2 == 0.0 {
        return None;
    }
    Some(LatLng {
        lat: cy / (3.0 * area2),
        lng: cx / (3.0 * area2),
    })
}

/// Area of a ring on the sphere in square metres.
pub fn ring_area_m2(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let [lng1, lat1] = ring[i];
        let [lng2, lat2] = ring[(i + 1) % n];
        area += (lng2 - lng1).to_radians()
            * (2.0 + lat1.to_radians().sin() + lat2.to_radians().sin());
    }
    (area * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

/// Polygon area in hectares: exterior ring minus holes.
pub fn polygon_area_ha(rings: &[Vec<[f64; 2]>]) -> f64 {
    let Some((exterior, holes)) = rings.split_first() else {
        return 0.0;
    };
    let holes: f64 = holes.iter().map(|r| ring_area_m2(r)).sum();
    ((ring_area_m2(exterior) - holes) / 10_000.0).max(0.0)
}

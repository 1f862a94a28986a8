use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use anyhow::{bail, Context};
use geo::Point;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.total_cmp(&other.latitude) == Ordering::Equal
            && self.longitude.total_cmp(&other.longitude) == Ordering::Equal
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s.split_once(',').context("expected \"lat,lon\"")?;
        let coordinate = Self::new(
            lat.trim().parse().context("invalid latitude")?,
            lon.trim().parse().context("invalid longitude")?,
        );
        if !coordinate.is_valid() {
            bail!("coordinate out of range: {coordinate}");
        }
        Ok(coordinate)
    }
}

impl From<Coordinate> for Point {
    fn from(value: Coordinate) -> Self {
        Point::new(value.longitude, value.latitude)
    }
}

/// A single store from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub location: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub county: String,
    pub coordinate: Coordinate,
}

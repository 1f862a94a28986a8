use std::{collections::BTreeMap, time::Duration};

use itertools::Itertools;
use serde::Deserialize;
use tracing::debug;
use ureq::{Agent, AgentBuilder};

use crate::{error::ResolveError, model::Coordinate};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Turns a free-text address or postal code into a coordinate.
pub trait Geocoder: Send + Sync {
    fn resolve(&self, query: &str) -> Result<Coordinate, ResolveError>;
}

/// Forward geocoding through a Nominatim search endpoint. Only the best match
/// is used.
pub struct Nominatim {
    agent: Agent,
    base_url: String,
    email: Option<String>,
}

impl Nominatim {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: AgentBuilder::new()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: None,
        }
    }

    /// Contact address sent along with each request, as Nominatim's usage
    /// policy asks for.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Default for Nominatim {
    fn default() -> Self {
        Self::new(NOMINATIM_URL, Duration::from_secs(10))
    }
}

impl Geocoder for Nominatim {
    fn resolve(&self, query: &str) -> Result<Coordinate, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::NotFound(query.to_string()));
        }

        let mut request = self
            .agent
            .get(&format!("{}/search", self.base_url))
            .query("q", query)
            .query("format", "jsonv2")
            .query("limit", "1");
        if let Some(email) = &self.email {
            request = request.query("email", email);
        }

        debug!(query, "geocoding");
        let places: Vec<Place> = request.call().map_err(Box::new)?.into_json()?;
        best_match(query, places)
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    // nominatim sends coordinates as strings
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

fn best_match(query: &str, places: Vec<Place>) -> Result<Coordinate, ResolveError> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::NotFound(query.to_string()))?;

    let invalid = |reason: String| ResolveError::InvalidCoordinate {
        query: query.to_string(),
        reason,
    };
    let coordinate = Coordinate::new(
        place
            .lat
            .parse()
            .map_err(|_| invalid(format!("latitude {:?}", place.lat)))?,
        place
            .lon
            .parse()
            .map_err(|_| invalid(format!("longitude {:?}", place.lon)))?,
    );
    if !coordinate.is_valid() {
        return Err(invalid(format!("{coordinate} is out of range")));
    }

    debug!(
        query,
        place = place.display_name.as_deref().unwrap_or_default(),
        %coordinate,
        "resolved"
    );
    Ok(coordinate)
}

/// A lookup table of known places. Literal `"lat,lon"` queries resolve to
/// themselves.
#[derive(Clone, Debug, Default)]
pub struct FixedGeocoder {
    places: BTreeMap<String, Coordinate>,
}

impl FixedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, coordinate: Coordinate) -> Self {
        self.places.insert(normalize(query), coordinate);
        self
    }
}

impl Geocoder for FixedGeocoder {
    fn resolve(&self, query: &str) -> Result<Coordinate, ResolveError> {
        if let Ok(x) = query.parse::<Coordinate>() {
            return Ok(x);
        }
        self.places
            .get(&normalize(query))
            .copied()
            .ok_or_else(|| ResolveError::NotFound(query.to_string()))
    }
}

fn normalize(query: &str) -> String {
    query.split_whitespace().join(" ").to_lowercase()
}

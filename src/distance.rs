use core::fmt;

use clap::ValueEnum;
use geo::{GeodesicDistance, Point};
use typed_floats::tf64::PositiveFinite;

use crate::{error::DistanceError, model::Coordinate};

// kilometres
const EARTH_RADIUS: f64 = 6371.0;
// miles per kilometre for the approximate model
const IMPERIAL_RATIO: f64 = 0.62371;
// metres per statute mile
const METRES_PER_MILE: f64 = 1609.344;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Units {
    #[default]
    #[value(name = "mi")]
    Miles,
    #[value(name = "km")]
    Kilometers,
}

impl Units {
    pub fn from_metric(metric: bool) -> Self {
        if metric {
            Self::Kilometers
        } else {
            Self::Miles
        }
    }

    pub fn is_metric(&self) -> bool {
        matches!(self, Self::Kilometers)
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Miles => "mi",
            Self::Kilometers => "km",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// How the earth is modelled when measuring between two coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum DistanceModel {
    /// Haversine on a sphere. Drifts up to ~0.5% from the geodesic over long
    /// distances.
    #[default]
    Approximate,
    /// Geodesic on the WGS-84 ellipsoid.
    Accurate,
}

impl DistanceModel {
    pub fn from_accurate(accurate: bool) -> Self {
        if accurate {
            Self::Accurate
        } else {
            Self::Approximate
        }
    }
}

impl fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approximate => write!(f, "approximate"),
            Self::Accurate => write!(f, "accurate"),
        }
    }
}

/// A non-negative distance tagged with the units it was measured in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Distance {
    value: PositiveFinite,
    units: Units,
}

impl Distance {
    pub(crate) fn new(value: f64, units: Units) -> Option<Self> {
        if !(value >= 0.0) {
            return None;
        }
        // -0.0 is rejected by PositiveFinite
        let value = PositiveFinite::try_from(value.abs()).ok()?;
        Some(Self { value, units })
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub(crate) fn magnitude(&self) -> PositiveFinite {
        self.value
    }
}

/// Distance from `origin` to `target`.
///
/// Fails only when either coordinate is outside the valid latitude/longitude
/// range or the computation does not produce a usable number.
pub fn distance(
    origin: Coordinate,
    target: Coordinate,
    units: Units,
    model: DistanceModel,
) -> Result<Distance, DistanceError> {
    for coordinate in [origin, target] {
        if !coordinate.is_valid() {
            return Err(DistanceError::InvalidCoordinate(coordinate));
        }
    }

    let value = match model {
        DistanceModel::Approximate => {
            let km = haversine(origin, target);
            match units {
                Units::Kilometers => km,
                Units::Miles => km * IMPERIAL_RATIO,
            }
        }
        DistanceModel::Accurate => {
            let metres = geodesic(origin, target);
            match units {
                Units::Kilometers => metres / 1000.0,
                Units::Miles => metres / METRES_PER_MILE,
            }
        }
    };

    Distance::new(value, units).ok_or(DistanceError::NonFinite(origin, target))
}

/// Great-circle distance in kilometres.
fn haversine(origin: Coordinate, target: Coordinate) -> f64 {
    let phi_origin = origin.latitude.to_radians();
    let phi_target = target.latitude.to_radians();
    let delta_phi = (target.latitude - origin.latitude).to_radians();
    let delta_lambda = (target.longitude - origin.longitude).to_radians();

    let a = ((delta_phi / 2.0).sin().powi(2)
        + phi_origin.cos() * phi_target.cos() * (delta_lambda / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS * c
}

/// Ellipsoidal distance in metres.
fn geodesic(origin: Coordinate, target: Coordinate) -> f64 {
    if origin == target {
        return 0.0;
    }
    Point::from(origin).geodesic_distance(&Point::from(target))
}

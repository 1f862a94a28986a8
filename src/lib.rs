//! Find the stores closest to an address or zip code.
//!
//! The origin is resolved once through a [`Geocoder`], then every store in the
//! [`Dataset`] is measured against it on a bounded worker pool and the closest
//! ones are returned as [`RankedResult`]s.

pub mod dataset;
pub mod distance;
pub mod error;
pub mod finder;
pub mod geocode;
pub mod model;
pub mod result;
pub mod search;

pub use dataset::Dataset;
pub use distance::{distance, Distance, DistanceModel, Units};
pub use error::{DatasetError, DistanceError, Error, ResolveError, ValidationError};
pub use finder::{StoreFinder, DEFAULT_WORKERS};
pub use geocode::{FixedGeocoder, Geocoder, Nominatim};
pub use model::{Coordinate, Store};
pub use result::RankedResult;
pub use search::{search, SearchRequest, ValidQuery};

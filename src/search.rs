use tracing::debug;

use crate::{
    dataset::Dataset,
    distance::{DistanceModel, Units},
    error::{Error, ValidationError},
    finder::StoreFinder,
    geocode::Geocoder,
    result::RankedResult,
};

/// What the user asked for, before validation.
#[derive(Clone, Debug, Default)]
pub struct SearchRequest {
    pub address: Option<String>,
    pub zipcode: Option<String>,
    pub results: i64,
    pub units: Units,
    pub model: DistanceModel,
}

/// A request that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidQuery {
    pub query: String,
    pub results: usize,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<ValidQuery, ValidationError> {
        if self.address.is_some() && self.zipcode.is_some() {
            return Err(ValidationError::AmbiguousQuery);
        }
        let results = match usize::try_from(self.results) {
            Ok(x) if x > 0 => x,
            _ => return Err(ValidationError::ResultCount(self.results)),
        };
        // the geocoder doesn't tell addresses and zip codes apart
        let query = self
            .address
            .clone()
            .or_else(|| self.zipcode.clone())
            .ok_or(ValidationError::MissingQuery)?;

        Ok(ValidQuery { query, results })
    }
}

/// Validate, resolve the origin once, then rank the whole dataset.
pub fn search(
    request: &SearchRequest,
    geocoder: &dyn Geocoder,
    finder: &StoreFinder,
    dataset: &Dataset,
) -> Result<Vec<RankedResult>, Error> {
    let ValidQuery { query, results } = request.validate()?;
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let origin = geocoder.resolve(&query)?;
    debug!(%query, %origin, units = %request.units, model = %request.model, "searching");

    finder.find_nearest(origin, dataset, request.units, request.model, results)
}

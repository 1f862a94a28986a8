use std::{io, path::PathBuf};

use thiserror::Error;

use crate::model::Coordinate;

/// Bad input from the caller. Always raised before any geocoding or ranking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected either an address or a zip code (not both)")]
    AmbiguousQuery,

    #[error("expected either an address or a zip code")]
    MissingQuery,

    #[error("must ask for at least 1 result, got {0}")]
    ResultCount(i64),

    #[error("the worker pool needs at least 1 worker")]
    NoWorkers,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("failed to read geocoding response: {0}")]
    Body(#[from] io::Error),

    #[error("no location found for {0:?}")]
    NotFound(String),

    #[error("geocoder returned an unusable coordinate for {query:?}: {reason}")]
    InvalidCoordinate { query: String, reason: String },
}

/// Failure of a single distance computation. Recoverable at the ranking level.
#[derive(Debug, Error, PartialEq)]
pub enum DistanceError {
    #[error("coordinate {0} is out of range")]
    InvalidCoordinate(Coordinate),

    #[error("distance between {0} and {1} is not a finite, non-negative number")]
    NonFinite(Coordinate, Coordinate),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed dataset row: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {line}: store {name:?} has an out of range coordinate {coordinate}")]
    InvalidCoordinate {
        line: u64,
        name: String,
        coordinate: Coordinate,
    },

    #[error("dataset contains no stores")]
    Empty,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("no stores available to rank")]
    EmptyDataset,

    #[error("none of the {0} stores could be ranked")]
    NoRankableStores(usize),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

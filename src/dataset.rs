use std::{fs::File, io::Read, ops::Deref, path::Path, sync::Arc};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::DatasetError,
    model::{Coordinate, Store},
};

const BUNDLED: &str = include_str!("../data/store-locations.csv");

/// The store catalog, loaded once and shared read-only between workers.
#[derive(Clone, Debug)]
pub struct Dataset {
    stores: Vec<Arc<Store>>,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        debug!(path = %path.display(), stores = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    /// The catalog shipped inside the binary.
    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_reader(BUNDLED.as_bytes())
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut stores = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let raw: RawStore = record.deserialize(Some(&headers))?;
            let line = record.position().map(|x| x.line()).unwrap_or_default();
            stores.push(Arc::new(raw.refine(line)?));
        }

        if stores.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { stores })
    }

    pub fn from_stores(stores: Vec<Store>) -> Self {
        Self {
            stores: stores.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn stores(&self) -> &[Arc<Store>] {
        &self.stores
    }
}

impl Deref for Dataset {
    type Target = [Arc<Store>];

    fn deref(&self) -> &Self::Target {
        &self.stores
    }
}

// column names are fixed by the catalog export
#[derive(Deserialize)]
struct RawStore {
    #[serde(rename = "Store Name")]
    name: String,
    #[serde(rename = "Store Location")]
    location: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Zip Code")]
    zipcode: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "County")]
    county: String,
}

impl RawStore {
    fn refine(self, line: u64) -> Result<Store, DatasetError> {
        let coordinate = Coordinate::new(self.latitude, self.longitude);
        if !coordinate.is_valid() {
            return Err(DatasetError::InvalidCoordinate {
                line,
                name: self.name,
                coordinate,
            });
        }

        Ok(Store {
            name: self.name,
            location: self.location,
            address: self.address,
            city: self.city,
            state: self.state,
            zipcode: self.zipcode,
            county: self.county,
            coordinate,
        })
    }
}

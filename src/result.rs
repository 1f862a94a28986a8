use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use typed_floats::tf64::PositiveFinite;

use crate::{
    distance::{Distance, Units},
    model::Store,
};

/// A store paired with its distance from the origin.
///
/// `metric` always describes the units `distance` was measured in: the only
/// way to build one is from a [`Distance`], which carries both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    store: Arc<Store>,
    metric: bool,
    distance: PositiveFinite,
}

impl RankedResult {
    pub fn new(store: Arc<Store>, distance: Distance) -> Self {
        Self {
            store,
            metric: distance.units().is_metric(),
            distance: distance.magnitude(),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn distance(&self) -> f64 {
        self.distance.get()
    }

    pub fn units(&self) -> Units {
        Units::from_metric(self.metric)
    }

    pub fn is_metric(&self) -> bool {
        self.metric
    }

    /// Three human readable lines: name and distance, location, then address.
    pub fn to_text(&self) -> String {
        let store = &self.store;
        format!(
            "{} -- {:.2}{}\n{}\n{}, {}, {} {}",
            store.name,
            self.distance(),
            self.units().suffix(),
            store.location,
            store.address,
            store.city,
            store.state,
            store.zipcode,
        )
    }

    pub fn to_structured(&self) -> Value {
        serde_json::to_value(self).expect("results always serialize")
    }

    pub fn from_structured(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> String {
        self.to_structured().to_string()
    }
}

impl Eq for RankedResult {}

impl Hash for RankedResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.store.hash(state);
        self.metric.hash(state);
        self.distance.get().to_bits().hash(state);
    }
}

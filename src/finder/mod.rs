use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    time::{Duration, Instant},
};

use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use crate::{
    distance::{distance, DistanceModel, Units},
    error::{DistanceError, Error, ValidationError},
    model::{Coordinate, Store},
    result::RankedResult,
};

use self::collector::Nearest;

mod collector;

pub const DEFAULT_WORKERS: usize = 4;

/// Ranks stores by distance from an origin on a fixed-size worker pool.
pub struct StoreFinder {
    pool: ThreadPool,
    deadline: Option<Duration>,
}

impl StoreFinder {
    pub fn new(workers: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(ValidationError::NoWorkers.into());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("store-finder-{i}"))
            .build()?;
        debug!(workers, "started worker pool");

        Ok(Self {
            pool,
            deadline: None,
        })
    }

    /// Stop waiting for distances after `deadline` and rank whatever arrived.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// The `count` stores closest to `origin`, closest first.
    ///
    /// Stores whose distance can't be computed are logged and left out.
    pub fn find_nearest(
        &self,
        origin: Coordinate,
        stores: &[Arc<Store>],
        units: Units,
        model: DistanceModel,
        count: usize,
    ) -> Result<Vec<RankedResult>, Error> {
        if count == 0 {
            return Err(ValidationError::ResultCount(0).into());
        }
        if stores.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let started = Instant::now();
        let expires = self.deadline.map(|x| started + x);
        let cancelled = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<(usize, Result<RankedResult, DistanceError>)>();

        let mut nearest = Nearest::new(count);
        let mut received = 0;
        let mut failed = 0;

        self.pool.in_place_scope(|scope| {
            let cancelled = &cancelled;
            scope.spawn(move |_| {
                stores
                    .par_iter()
                    .enumerate()
                    .for_each_with(tx, |tx, (index, store)| {
                        if cancelled.load(Ordering::Relaxed) {
                            return;
                        }
                        let outcome = distance(origin, store.coordinate, units, model)
                            .map(|x| RankedResult::new(store.clone(), x));
                        // rx outlives the scope, so this can't fail
                        let _ = tx.send((index, outcome));
                    });
            });

            while received < stores.len() {
                let next = match expires {
                    Some(expires) => {
                        let remaining = expires.saturating_duration_since(Instant::now());
                        match rx.recv_timeout(remaining) {
                            Ok(x) => x,
                            Err(RecvTimeoutError::Timeout) => {
                                cancelled.store(true, Ordering::Relaxed);
                                warn!(
                                    pending = stores.len() - received,
                                    "deadline reached, ranking partial results"
                                );
                                break;
                            }
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                    None => match rx.recv() {
                        Ok(x) => x,
                        Err(_) => break,
                    },
                };
                received += 1;

                match next {
                    (index, Ok(result)) => nearest.push(index, result),
                    (index, Err(err)) => {
                        failed += 1;
                        let store = &stores[index];
                        warn!(store = %store.name, index, %err, "skipping store");
                    }
                }
            }
        });

        debug!(
            stores = stores.len(),
            received,
            failed,
            kept = nearest.len(),
            elapsed = ?started.elapsed(),
            "ranked stores"
        );

        if nearest.is_empty() {
            return Err(Error::NoRankableStores(stores.len()));
        }
        Ok(nearest.into_sorted_vec())
    }
}

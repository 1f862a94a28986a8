use std::{
    io,
    sync::{Arc, Mutex},
};

use store_finder::{
    Coordinate, Dataset, DistanceModel, FixedGeocoder, Geocoder, RankedResult, Store,
    StoreFinder, Units, DEFAULT_WORKERS,
};
use tracing_subscriber::fmt::MakeWriter;

const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/store-locations.csv");

fn catalog() -> Dataset {
    Dataset::load(CATALOG).unwrap()
}

fn origin() -> Coordinate {
    FixedGeocoder::new()
        .with("55428", Coordinate::new(45.0632, -93.3816))
        .resolve("55428")
        .unwrap()
}

fn names(results: &[RankedResult]) -> Vec<&str> {
    results.iter().map(|x| x.store().name.as_str()).collect()
}

#[test]
fn catalog_has_32_stores() {
    assert_eq!(catalog().len(), 32);
}

#[test]
fn single_closest_store() {
    let dataset = catalog();
    let finder = StoreFinder::new(DEFAULT_WORKERS).unwrap();
    let results = finder
        .find_nearest(origin(), &dataset, Units::Miles, DistanceModel::Approximate, 1)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].distance() >= 0.0);
    assert!(!results[0].is_metric());
    assert_eq!(results[0].store().name, "Crystal");
}

#[test]
fn five_closest_stores_ascending() {
    let dataset = catalog();
    let finder = StoreFinder::new(DEFAULT_WORKERS).unwrap();
    let results = finder
        .find_nearest(origin(), &dataset, Units::Miles, DistanceModel::Approximate, 5)
        .unwrap();

    assert_eq!(results.len(), 5);
    assert!(results.windows(2).all(|x| x[0].distance() < x[1].distance()));
}

#[test]
fn result_count_is_min_of_k_and_n() {
    let dataset = catalog();
    let finder = StoreFinder::new(3).unwrap();
    for k in [1, 2, 7, 31, 32, 33, 100] {
        for model in [DistanceModel::Approximate, DistanceModel::Accurate] {
            for units in [Units::Miles, Units::Kilometers] {
                let results = finder
                    .find_nearest(origin(), &dataset, units, model, k)
                    .unwrap();
                assert_eq!(results.len(), k.min(dataset.len()));
                assert!(results.windows(2).all(|x| x[0].distance() <= x[1].distance()));
                assert!(results.iter().all(|x| x.units() == units));
            }
        }
    }
}

#[test]
fn matches_a_sequential_ranking() {
    let dataset = catalog();
    let mut expected: Vec<_> = dataset
        .iter()
        .map(|store| {
            let d = store_finder::distance(
                origin(),
                store.coordinate,
                Units::Kilometers,
                DistanceModel::Accurate,
            )
            .unwrap();
            RankedResult::new(store.clone(), d)
        })
        .collect();
    expected.sort_by(|a, b| a.distance().total_cmp(&b.distance()));

    for workers in [1, 2, 4, 8] {
        let finder = StoreFinder::new(workers).unwrap();
        let results = finder
            .find_nearest(origin(), &dataset, Units::Kilometers, DistanceModel::Accurate, 32)
            .unwrap();
        assert_eq!(names(&results), names(&expected));
    }
}

#[test]
fn models_rank_the_nearest_store_the_same() {
    let dataset = catalog();
    let finder = StoreFinder::new(DEFAULT_WORKERS).unwrap();
    let approximate = finder
        .find_nearest(origin(), &dataset, Units::Miles, DistanceModel::Approximate, 1)
        .unwrap();
    let accurate = finder
        .find_nearest(origin(), &dataset, Units::Miles, DistanceModel::Accurate, 1)
        .unwrap();
    assert_eq!(approximate[0].store(), accurate[0].store());
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn malformed_store_is_skipped_with_a_warning() {
    let mut stores: Vec<Store> = catalog().iter().map(|x| (**x).clone()).collect();
    stores.push(Store {
        name: "Broken".into(),
        location: "Nowhere".into(),
        address: "0 Null Island".into(),
        city: "Nowhere".into(),
        state: "MN".into(),
        zipcode: "00000".into(),
        county: "None".into(),
        coordinate: Coordinate::new(f64::NAN, -93.38),
    });
    let dataset = Dataset::from_stores(stores);
    let n = dataset.len();

    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let _guard = tracing::subscriber::set_default(subscriber);

    let finder = StoreFinder::new(DEFAULT_WORKERS).unwrap();
    for k in [1, 5, n] {
        let results = finder
            .find_nearest(origin(), &dataset, Units::Miles, DistanceModel::Approximate, k)
            .unwrap();
        assert_eq!(results.len(), k.min(n - 1));
        assert!(results.iter().all(|x| x.store().name != "Broken"));
    }

    let logs = captured.contents();
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("Broken"), "{logs}");
}

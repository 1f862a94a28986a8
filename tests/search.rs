use std::sync::atomic::{AtomicUsize, Ordering};

use store_finder::{
    search, Coordinate, Dataset, DistanceModel, Error, FixedGeocoder, Geocoder, ResolveError,
    SearchRequest, StoreFinder, Units, ValidationError,
};

/// Counts lookups so tests can tell whether geocoding happened.
struct Counting {
    inner: FixedGeocoder,
    calls: AtomicUsize,
}

impl Counting {
    fn new() -> Self {
        Self {
            inner: FixedGeocoder::new()
                .with("55428", Coordinate::new(45.0632, -93.3816))
                .with("1300 University Ave W, St Paul", Coordinate::new(44.9557, -93.1587)),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for Counting {
    fn resolve(&self, query: &str) -> Result<Coordinate, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(query)
    }
}

fn request(address: Option<&str>, zipcode: Option<&str>, results: i64) -> SearchRequest {
    SearchRequest {
        address: address.map(String::from),
        zipcode: zipcode.map(String::from),
        results,
        units: Units::Miles,
        model: DistanceModel::Approximate,
    }
}

#[test]
fn zip_code_search() {
    let geocoder = Counting::new();
    let finder = StoreFinder::new(4).unwrap();
    let dataset = Dataset::bundled().unwrap();

    let results = search(&request(None, Some("55428"), 1), &geocoder, &finder, &dataset).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].store().name, "Crystal");
    assert_eq!(geocoder.calls(), 1);
}

#[test]
fn address_search_in_kilometers() {
    let geocoder = Counting::new();
    let finder = StoreFinder::new(2).unwrap();
    let dataset = Dataset::bundled().unwrap();

    let mut request = request(Some("1300 University Ave W, St Paul"), None, 3);
    request.units = Units::Kilometers;
    request.model = DistanceModel::Accurate;

    let results = search(&request, &geocoder, &finder, &dataset).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].store().name, "St Paul Midway");
    assert!(results.iter().all(|x| x.is_metric()));
}

#[test]
fn address_and_zip_abort_before_geocoding() {
    let geocoder = Counting::new();
    let finder = StoreFinder::new(1).unwrap();
    let dataset = Dataset::bundled().unwrap();

    let err = search(
        &request(Some("1300 University Ave W, St Paul"), Some("55428"), 1),
        &geocoder,
        &finder,
        &dataset,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::AmbiguousQuery)
    ));
    assert_eq!(geocoder.calls(), 0);
}

#[test]
fn non_positive_result_counts_are_rejected() {
    let geocoder = Counting::new();
    let finder = StoreFinder::new(1).unwrap();
    let dataset = Dataset::bundled().unwrap();

    for results in [0, -1, -1000] {
        let err = search(&request(None, Some("55428"), results), &geocoder, &finder, &dataset)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::ResultCount(x)) if x == results
        ));
    }
    assert_eq!(geocoder.calls(), 0);
}

#[test]
fn missing_query() {
    let geocoder = Counting::new();
    let finder = StoreFinder::new(1).unwrap();
    let dataset = Dataset::bundled().unwrap();

    let err = search(&request(None, None, 1), &geocoder, &finder, &dataset).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingQuery)
    ));
    assert_eq!(geocoder.calls(), 0);
}

#[test]
fn unresolvable_query() {
    let geocoder = Counting::new();
    let finder = StoreFinder::new(1).unwrap();
    let dataset = Dataset::bundled().unwrap();

    let err = search(&request(None, Some("99999"), 1), &geocoder, &finder, &dataset).unwrap_err();
    assert!(matches!(err, Error::Resolve(ResolveError::NotFound(_))));
    assert_eq!(geocoder.calls(), 1);
}

#[test]
fn empty_dataset() {
    let geocoder = Counting::new();
    let finder = StoreFinder::new(1).unwrap();
    let dataset = Dataset::from_stores(Vec::new());

    let err = search(&request(None, Some("55428"), 1), &geocoder, &finder, &dataset).unwrap_err();
    assert!(matches!(err, Error::EmptyDataset));
    assert_eq!(geocoder.calls(), 0);
}

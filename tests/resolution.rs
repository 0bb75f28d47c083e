//! End-to-end engine tests: resolution driven through an in-memory catalog
//! and a scripted availability API, no network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use nearbook::config::AvailabilityConfig;
use nearbook::error::{ProbeError, ResolutionError};
use nearbook::models::{Credential, GeoPoint, LibraryRecord};
use nearbook::repository::InMemoryCatalog;
use nearbook::services::availability::AvailabilityService;
use nearbook::services::book_api::{AvailabilityApi, AvailabilityReply};

const ISBN: &str = "9788936434120";

/// Seoul City Hall
fn requester() -> GeoPoint {
    GeoPoint::new(37.5665, 126.9780).unwrap()
}

fn record(code: &str, latitude: &str, longitude: &str) -> LibraryRecord {
    LibraryRecord {
        code: code.to_string(),
        name: format!("library {code}"),
        latitude: latitude.to_string(),
        longitude: longitude.to_string(),
    }
}

/// Library A ≈ 2 km and library B ≈ 15 km north of the requester.
fn seoul_catalog() -> Vec<LibraryRecord> {
    vec![
        record("A", "37.5845", "126.9780"),
        record("B", "37.7014", "126.9780"),
    ]
}

/// Availability API double scripted per (auth key, library code) pair.
/// Unscripted calls surface as parse errors, which fail the resolution and
/// therefore the test.
#[derive(Default)]
struct ScriptedApi {
    replies: HashMap<(String, String), AvailabilityReply>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedApi {
    fn script(mut self, auth_key: &str, library_code: &str, reply: AvailabilityReply) -> Self {
        self.replies
            .insert((auth_key.to_string(), library_code.to_string()), reply);
        self
    }

    fn delay(mut self, library_code: &str, delay: Duration) -> Self {
        self.delays.insert(library_code.to_string(), delay);
        self
    }

    fn calls_to(&self, library_code: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, lib)| lib == library_code)
            .count()
    }
}

#[async_trait]
impl AvailabilityApi for ScriptedApi {
    async fn book_exists(
        &self,
        auth_key: &Credential,
        library_code: &str,
        _isbn: &str,
    ) -> Result<AvailabilityReply, ProbeError> {
        if let Some(delay) = self.delays.get(library_code) {
            tokio::time::sleep(*delay).await;
        }

        self.calls
            .lock()
            .unwrap()
            .push((auth_key.reveal().to_string(), library_code.to_string()));

        match self
            .replies
            .get(&(auth_key.reveal().to_string(), library_code.to_string()))
        {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProbeError::ResponseParse {
                library_code: library_code.to_string(),
                reason: format!("unscripted call with key {:?}", auth_key),
            }),
        }
    }
}

fn yes() -> AvailabilityReply {
    AvailabilityReply::Definitive(true)
}

fn no() -> AvailabilityReply {
    AvailabilityReply::Definitive(false)
}

fn quota() -> AvailabilityReply {
    AvailabilityReply::CredentialRejected {
        message: "quota exceeded".to_string(),
    }
}

fn engine(
    api: Arc<ScriptedApi>,
    catalog: Vec<LibraryRecord>,
    auth_keys: &[&str],
) -> AvailabilityService {
    let config = AvailabilityConfig {
        auth_keys: auth_keys.iter().map(|k| k.to_string()).collect(),
        ..AvailabilityConfig::default()
    };
    AvailabilityService::new(Arc::new(InMemoryCatalog::new(catalog)), api, &config).unwrap()
}

fn sorted_codes(records: Vec<LibraryRecord>) -> Vec<String> {
    let mut codes: Vec<String> = records.into_iter().map(|r| r.code).collect();
    codes.sort();
    codes
}

#[tokio::test]
async fn nearby_available_library_is_found() {
    let api = Arc::new(ScriptedApi::default().script("k1", "A", yes()));
    let engine = engine(Arc::clone(&api), seoul_catalog(), &["k1"]);

    let found = engine.resolve(requester(), ISBN, 10.0).await.unwrap();
    assert_eq!(sorted_codes(found), vec!["A"]);

    // B is beyond the radius and must never have been probed.
    assert_eq!(api.calls_to("B"), 0);
}

#[tokio::test]
async fn wider_radius_finds_the_farther_library() {
    let api = Arc::new(
        ScriptedApi::default()
            .script("k1", "A", no())
            .script("k1", "B", yes()),
    );
    let engine = engine(api, seoul_catalog(), &["k1"]);

    let found = engine.resolve(requester(), ISBN, 20.0).await.unwrap();
    assert_eq!(sorted_codes(found), vec!["B"]);
}

#[tokio::test]
async fn credential_fallback_is_shared_by_all_probes() {
    // k1 is quota-limited everywhere; k2 answers.
    let api = Arc::new(
        ScriptedApi::default()
            .script("k1", "A", quota())
            .script("k1", "B", quota())
            .script("k2", "A", yes())
            .script("k2", "B", no()),
    );
    let engine = engine(Arc::clone(&api), seoul_catalog(), &["k1", "k2"]);

    let found = engine.resolve(requester(), ISBN, 20.0).await.unwrap();
    assert_eq!(sorted_codes(found), vec!["A"]);
    assert_eq!(api.calls_to("A"), 2);
    assert_eq!(api.calls_to("B"), 2);
}

#[tokio::test]
async fn one_failed_probe_fails_the_whole_resolution() {
    // A exhausts the only key; B would have said yes. No partial success.
    let api = Arc::new(
        ScriptedApi::default()
            .script("k1", "A", quota())
            .script("k1", "B", yes()),
    );
    let engine = engine(api, seoul_catalog(), &["k1"]);

    let err = engine.resolve(requester(), ISBN, 20.0).await.unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::Probe(ProbeError::AllCredentialsExhausted {
            ref library_code,
            attempted: 1,
        }) if library_code == "A"
    ));
}

#[tokio::test]
async fn no_availability_anywhere_is_an_empty_success() {
    let api = Arc::new(
        ScriptedApi::default()
            .script("k1", "A", no())
            .script("k1", "B", no()),
    );
    let engine = engine(api, seoul_catalog(), &["k1"]);

    let found = engine.resolve(requester(), ISBN, 20.0).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn malformed_catalog_rows_never_reach_the_api() {
    let mut catalog = seoul_catalog();
    catalog.push(record("BAD", "garbage", "126.9780"));

    let api = Arc::new(
        ScriptedApi::default()
            .script("k1", "A", yes())
            .script("k1", "B", yes()),
    );
    let engine = engine(Arc::clone(&api), catalog, &["k1"]);

    let found = engine.resolve(requester(), ISBN, 20.0).await.unwrap();
    assert_eq!(sorted_codes(found), vec!["A", "B"]);
    assert_eq!(api.calls_to("BAD"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_probes_are_drained_after_an_early_failure() {
    // A fails immediately; B answers yes after a delay. The coordinator
    // must still wait for B (no orphaned workers) and discard its result.
    let delay = Duration::from_millis(100);
    let api = Arc::new(
        ScriptedApi::default()
            .script("k1", "A", quota())
            .script("k1", "B", yes())
            .delay("B", delay),
    );
    let engine = engine(Arc::clone(&api), seoul_catalog(), &["k1"]);

    let started = std::time::Instant::now();
    let err = engine.resolve(requester(), ISBN, 20.0).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ResolutionError::Probe(_)));
    assert!(elapsed >= delay, "returned after {elapsed:?}, before the slow probe finished");
    assert_eq!(api.calls_to("B"), 1);
}

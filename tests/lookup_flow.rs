/// Orchestrator state-machine tests over scripted collaborators.
/// Exercises the fetch → sync fallback → re-fetch → render sequencing
/// without touching the network.
use cisp_portal::errors::AppError;
use cisp_portal::lookup::{
    DataClient, LookupOrchestrator, LookupOutcome, Renderer, StatusKind, StatusSink,
};
use cisp_portal::models::{LookupRecord, Principal, Restritiva};
use cisp_portal::recents::RecentRoots;
use cisp_portal::storage::Store;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

fn empty_record_with_peer_rows() -> LookupRecord {
    // Empty principal, but auxiliary data present: emptiness is decided by
    // the principal's identity fields alone.
    LookupRecord {
        principal: Some(Principal::default()),
        restritivas: vec![Restritiva {
            razao_social: Some("PEER A".into()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn non_empty_record(name: &str) -> LookupRecord {
    LookupRecord {
        principal: Some(Principal {
            razao_social: Some(name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[derive(Default)]
struct CallLog {
    fetch_roots: RefCell<Vec<String>>,
    sync_roots: RefCell<Vec<String>>,
}

struct ScriptedClient {
    log: Rc<CallLog>,
    fetches: RefCell<VecDeque<Result<LookupRecord, AppError>>>,
    syncs: RefCell<VecDeque<Result<(), AppError>>>,
    /// Suspend once inside fetch so a second lookup can interleave.
    yield_on_fetch: bool,
}

impl DataClient for ScriptedClient {
    async fn fetch_record(&self, root: &str) -> Result<LookupRecord, AppError> {
        if self.yield_on_fetch {
            tokio::task::yield_now().await;
        }
        self.log.fetch_roots.borrow_mut().push(root.to_string());
        self.fetches
            .borrow_mut()
            .pop_front()
            .expect("unexpected fetch_record call")
    }

    async fn trigger_sync(&self, root: &str) -> Result<(), AppError> {
        self.log.sync_roots.borrow_mut().push(root.to_string());
        self.syncs
            .borrow_mut()
            .pop_front()
            .expect("unexpected trigger_sync call")
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Status(StatusKind, String),
    Notice(String),
    Loading(bool),
}

struct RecordingStatus {
    events: Rc<RefCell<Vec<Event>>>,
}

impl StatusSink for RecordingStatus {
    fn set_status(&mut self, kind: StatusKind, text: &str) {
        self.events
            .borrow_mut()
            .push(Event::Status(kind, text.to_string()));
    }

    fn notify(&mut self, message: &str) {
        self.events
            .borrow_mut()
            .push(Event::Notice(message.to_string()));
    }

    fn set_loading(&mut self, loading: bool) {
        self.events.borrow_mut().push(Event::Loading(loading));
    }
}

struct RecordingRenderer {
    rendered: Rc<RefCell<Vec<LookupRecord>>>,
    resets: Rc<Cell<usize>>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, record: &LookupRecord) {
        self.rendered.borrow_mut().push(record.clone());
    }

    fn show_empty(&mut self) {
        self.resets.set(self.resets.get() + 1);
    }
}

struct Harness {
    orchestrator: LookupOrchestrator<ScriptedClient, RecordingStatus, RecordingRenderer>,
    log: Rc<CallLog>,
    events: Rc<RefCell<Vec<Event>>>,
    rendered: Rc<RefCell<Vec<LookupRecord>>>,
    resets: Rc<Cell<usize>>,
    state_dir: PathBuf,
    _tmp: tempfile::TempDir,
}

impl Harness {
    fn new(
        fetches: Vec<Result<LookupRecord, AppError>>,
        syncs: Vec<Result<(), AppError>>,
        yield_on_fetch: bool,
    ) -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let state_dir = tmp.path().to_path_buf();

        let log = Rc::new(CallLog::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        let rendered = Rc::new(RefCell::new(Vec::new()));
        let resets = Rc::new(Cell::new(0));

        let client = ScriptedClient {
            log: log.clone(),
            fetches: RefCell::new(fetches.into_iter().collect()),
            syncs: RefCell::new(syncs.into_iter().collect()),
            yield_on_fetch,
        };
        let orchestrator = LookupOrchestrator::new(
            client,
            RecentRoots::new(Store::new(state_dir.clone())),
            RecordingStatus {
                events: events.clone(),
            },
            RecordingRenderer {
                rendered: rendered.clone(),
                resets: resets.clone(),
            },
        );

        Self {
            orchestrator,
            log,
            events,
            rendered,
            resets,
            state_dir,
            _tmp: tmp,
        }
    }

    fn persisted_recents(&self) -> Vec<String> {
        RecentRoots::new(Store::new(self.state_dir.clone())).list()
    }

    fn statuses(&self) -> Vec<(StatusKind, String)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Status(kind, text) => Some((*kind, text.clone())),
                _ => None,
            })
            .collect()
    }

    fn loading_signals(&self) -> Vec<bool> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Loading(l) => Some(*l),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn invalid_root_makes_no_network_calls() {
    let harness = Harness::new(vec![], vec![], false);

    let result = harness.orchestrator.lookup("123").await;

    assert!(matches!(result, Err(AppError::InvalidRoot(_))));
    assert!(harness.log.fetch_roots.borrow().is_empty());
    assert!(harness.log.sync_roots.borrow().is_empty());
    assert!(harness.loading_signals().is_empty());
    assert!(harness.persisted_recents().is_empty());
}

#[tokio::test]
async fn formatted_cnpj_behaves_like_its_root() {
    let harness = Harness::new(vec![Ok(non_empty_record("ACME LTDA"))], vec![], false);

    let result = harness.orchestrator.lookup("12.345.678/0009-01").await;

    assert_eq!(result.unwrap(), LookupOutcome::Complete);
    assert_eq!(*harness.log.fetch_roots.borrow(), vec!["12345678"]);
    assert_eq!(harness.persisted_recents(), vec!["12345678"]);
}

#[tokio::test]
async fn non_empty_fetch_never_triggers_sync() {
    let harness = Harness::new(vec![Ok(non_empty_record("ACME LTDA"))], vec![], false);

    let result = harness.orchestrator.lookup("12345678").await;

    assert_eq!(result.unwrap(), LookupOutcome::Complete);
    assert!(harness.log.sync_roots.borrow().is_empty());
    assert_eq!(harness.rendered.borrow().len(), 1);

    let statuses = harness.statuses();
    assert_eq!(statuses.first().unwrap().0, StatusKind::Working);
    assert_eq!(statuses.last().unwrap().0, StatusKind::Ok);
    assert_eq!(harness.loading_signals(), vec![true, false]);
}

#[tokio::test]
async fn failed_sync_degrades_to_the_cached_empty_record() {
    let harness = Harness::new(
        vec![Ok(empty_record_with_peer_rows())],
        vec![Err(AppError::Sync("upstream offline".into()))],
        false,
    );

    let result = harness.orchestrator.lookup("12345678").await;

    // The sync failure is absorbed; the cached record is still rendered.
    assert_eq!(result.unwrap(), LookupOutcome::NoData);
    assert_eq!(harness.log.fetch_roots.borrow().len(), 1);
    assert_eq!(harness.log.sync_roots.borrow().len(), 1);

    let rendered = harness.rendered.borrow();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].is_empty());
    assert_eq!(
        rendered[0].restritivas[0].razao_social.as_deref(),
        Some("PEER A")
    );

    assert_eq!(harness.statuses().last().unwrap().0, StatusKind::Warning);
    assert!(harness.persisted_recents().is_empty());
    assert_eq!(harness.loading_signals(), vec![true, false]);
}

#[tokio::test]
async fn successful_sync_refetches_and_records_the_root() {
    let harness = Harness::new(
        vec![
            Ok(empty_record_with_peer_rows()),
            Ok(non_empty_record("ACME LTDA")),
        ],
        vec![Ok(())],
        false,
    );

    let result = harness.orchestrator.lookup("12345678").await;

    assert_eq!(result.unwrap(), LookupOutcome::Complete);
    assert_eq!(*harness.log.fetch_roots.borrow(), vec!["12345678", "12345678"]);
    assert_eq!(*harness.log.sync_roots.borrow(), vec!["12345678"]);

    let rendered = harness.rendered.borrow();
    assert_eq!(rendered.len(), 1);
    assert_eq!(
        rendered[0]
            .principal
            .as_ref()
            .unwrap()
            .razao_social
            .as_deref(),
        Some("ACME LTDA")
    );

    assert_eq!(harness.statuses().last().unwrap().0, StatusKind::Ok);
    assert_eq!(harness.persisted_recents(), vec!["12345678"]);
}

#[tokio::test]
async fn first_fetch_failure_is_fatal_and_resets_the_view() {
    let harness = Harness::new(vec![Err(AppError::Fetch("cache offline".into()))], vec![], false);

    let result = harness.orchestrator.lookup("12345678").await;

    assert!(matches!(result, Err(AppError::Fetch(_))));
    assert!(harness.log.sync_roots.borrow().is_empty());
    assert!(harness.rendered.borrow().is_empty());
    assert_eq!(harness.resets.get(), 1);

    let statuses = harness.statuses();
    assert_eq!(
        statuses.last().unwrap(),
        &(StatusKind::Error, "cache offline".to_string())
    );
    assert!(harness
        .events
        .borrow()
        .contains(&Event::Notice("cache offline".to_string())));
    // Input is re-enabled on the fatal path too.
    assert_eq!(harness.loading_signals(), vec![true, false]);
    assert!(harness.persisted_recents().is_empty());
}

#[tokio::test]
async fn second_fetch_failure_propagates_unlike_a_sync_failure() {
    let harness = Harness::new(
        vec![
            Ok(empty_record_with_peer_rows()),
            Err(AppError::Fetch("re-read failed".into())),
        ],
        vec![Ok(())],
        false,
    );

    let result = harness.orchestrator.lookup("12345678").await;

    assert!(matches!(result, Err(AppError::Fetch(_))));
    assert_eq!(harness.log.fetch_roots.borrow().len(), 2);
    assert!(harness.rendered.borrow().is_empty());
    assert_eq!(harness.resets.get(), 1);
    assert_eq!(harness.statuses().last().unwrap().0, StatusKind::Error);
    assert!(harness.persisted_recents().is_empty());
    assert_eq!(harness.loading_signals(), vec![true, false]);
}

#[tokio::test]
async fn overlapping_same_root_lookup_is_rejected() {
    let harness = Harness::new(vec![Ok(non_empty_record("ACME LTDA"))], vec![], true);

    let (first, second) = tokio::join!(
        harness.orchestrator.lookup("12345678"),
        harness.orchestrator.lookup("12345678"),
    );

    assert_eq!(first.unwrap(), LookupOutcome::Complete);
    assert!(matches!(second, Err(AppError::InFlight(_))));
    // The rejected lookup never reached the network.
    assert_eq!(harness.log.fetch_roots.borrow().len(), 1);
}

#[tokio::test]
async fn lookups_for_different_roots_proceed_independently() {
    let harness = Harness::new(
        vec![
            Ok(non_empty_record("ACME LTDA")),
            Ok(non_empty_record("BETA SA")),
        ],
        vec![],
        true,
    );

    let (first, second) = tokio::join!(
        harness.orchestrator.lookup("11111111"),
        harness.orchestrator.lookup("22222222"),
    );

    assert_eq!(first.unwrap(), LookupOutcome::Complete);
    assert_eq!(second.unwrap(), LookupOutcome::Complete);

    let mut recents = harness.persisted_recents();
    recents.sort();
    assert_eq!(recents, vec!["11111111", "22222222"]);
}

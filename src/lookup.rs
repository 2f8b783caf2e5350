use crate::errors::AppError;
use crate::models::LookupRecord;
use crate::recents::RecentRoots;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashSet;

/// Strips every character that is not a decimal digit.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Derives the 8-digit root candidate from raw user input.
///
/// A longer digit string (a full pasted CNPJ) is truncated to its first 8
/// digits; a shorter one is returned unchanged for the caller to reject.
/// Idempotent and infallible.
pub fn normalize_root(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() >= 8 {
        digits[..8].to_string()
    } else {
        digits
    }
}

/// A valid lookup key is exactly 8 decimal digits.
pub fn is_valid_root(root: &str) -> bool {
    let root_regex = Regex::new(r"^\d{8}$").unwrap();
    root_regex.is_match(root)
}

/// Outcome badge of the last orchestration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Idle,
    Working,
    Ok,
    Warning,
    Error,
}

/// Remote data operations the orchestrator depends on.
#[allow(async_fn_in_trait)]
pub trait DataClient {
    /// Fetch the cached record for a root.
    async fn fetch_record(&self, root: &str) -> Result<LookupRecord, AppError>;
    /// Ask the backend to refresh its cache for a root from upstream.
    async fn trigger_sync(&self, root: &str) -> Result<(), AppError>;
}

/// Output channel for status transitions and toast-style notices.
pub trait StatusSink {
    fn set_status(&mut self, kind: StatusKind, text: &str);
    fn notify(&mut self, message: &str);
    /// Loading signal for the surrounding UI; raised for the whole lookup
    /// and guaranteed to be lowered on every exit path.
    fn set_loading(&mut self, loading: bool);
}

/// Consumer of the final record. Purely an output collaborator.
pub trait Renderer {
    fn render(&mut self, record: &LookupRecord);
    /// Reset the display to its empty baseline.
    fn show_empty(&mut self);
}

/// Terminal state of a completed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// A non-empty record was rendered.
    Complete,
    /// The final record was still empty after the sync fallback.
    NoData,
}

/// Drives one lookup through normalize → fetch → (sync → refetch) → render,
/// emitting status transitions throughout.
///
/// Collaborators sit behind `RefCell` so lookups run from a shared reference;
/// borrows are never held across an await. Overlapping lookups for the same
/// root are rejected via the in-flight set, while different roots proceed
/// independently.
pub struct LookupOrchestrator<C, S, R> {
    client: C,
    recents: RecentRoots,
    status: RefCell<S>,
    renderer: RefCell<R>,
    in_flight: RefCell<HashSet<String>>,
}

impl<C, S, R> LookupOrchestrator<C, S, R>
where
    C: DataClient,
    S: StatusSink,
    R: Renderer,
{
    pub fn new(client: C, recents: RecentRoots, status: S, renderer: R) -> Self {
        Self {
            client,
            recents,
            status: RefCell::new(status),
            renderer: RefCell::new(renderer),
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    /// Runs a full lookup for raw user input.
    ///
    /// Validation failures and fetch failures terminate the lookup after the
    /// sinks have been updated; a failed upstream sync trigger is absorbed
    /// and the flow continues with the cached result.
    pub async fn lookup(&self, raw_input: &str) -> Result<LookupOutcome, AppError> {
        let root = normalize_root(raw_input);
        if !is_valid_root(&root) {
            let mut status = self.status.borrow_mut();
            status.set_status(
                StatusKind::Warning,
                "Enter the 8-digit root or paste the full CNPJ.",
            );
            status.notify("Invalid root.");
            return Err(AppError::InvalidRoot(root));
        }

        if !self.in_flight.borrow_mut().insert(root.clone()) {
            self.status
                .borrow_mut()
                .notify(&format!("A lookup for root {} is already running.", root));
            return Err(AppError::InFlight(root));
        }

        self.status.borrow_mut().set_loading(true);
        let outcome = self.run(&root).await;
        // Cleanup happens on every exit path, the fatal ones included.
        self.status.borrow_mut().set_loading(false);
        self.in_flight.borrow_mut().remove(&root);
        outcome
    }

    async fn run(&self, root: &str) -> Result<LookupOutcome, AppError> {
        self.status
            .borrow_mut()
            .set_status(StatusKind::Working, "Querying the Postgres cache...");

        let mut record = match self.client.fetch_record(root).await {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };

        if record.is_empty() {
            self.status
                .borrow_mut()
                .set_status(StatusKind::Working, "Querying the upstream CISP API...");
            match self.client.trigger_sync(root).await {
                Ok(()) => {
                    // The re-read after a successful sync is the only possible
                    // answer left, so its failure is fatal like the first.
                    record = match self.client.fetch_record(root).await {
                        Ok(record) => record,
                        Err(e) => return Err(self.fail(e)),
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        "Upstream sync for root {} failed, keeping cached result: {}",
                        root,
                        e
                    );
                }
            }
        }

        self.renderer.borrow_mut().render(&record);

        if record.is_empty() {
            self.status.borrow_mut().set_status(
                StatusKind::Warning,
                "No data for this root in Postgres or the CISP API.",
            );
            Ok(LookupOutcome::NoData)
        } else {
            self.status
                .borrow_mut()
                .set_status(StatusKind::Ok, "Lookup complete.");
            self.recents.record(root);
            Ok(LookupOutcome::Complete)
        }
    }

    fn fail(&self, err: AppError) -> AppError {
        self.renderer.borrow_mut().show_empty();
        let msg = err.to_string();
        let mut status = self.status.borrow_mut();
        status.set_status(StatusKind::Error, &msg);
        status.notify(&msg);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_formatting_from_full_cnpj() {
        assert_eq!(normalize_root("12.345.678/0009-01"), "12345678");
        assert_eq!(normalize_root("12345678000901"), "12345678");
    }

    #[test]
    fn test_normalize_keeps_short_digit_strings() {
        assert_eq!(normalize_root("123"), "123");
        assert_eq!(normalize_root("1a2b3c"), "123");
        assert_eq!(normalize_root(""), "");
        assert_eq!(normalize_root("abc-/."), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["12.345.678/0009-01", "987654321", "42", ""] {
            let once = normalize_root(raw);
            assert_eq!(normalize_root(&once), once);
        }
    }

    #[test]
    fn test_root_validity() {
        assert!(is_valid_root("12345678"));
        assert!(!is_valid_root("1234567"));
        assert!(!is_valid_root("123456789"));
        assert!(!is_valid_root("1234567a"));
        assert!(!is_valid_root(""));
    }
}

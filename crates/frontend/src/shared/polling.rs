//! Fan-out polling with a single cycle in flight.
//!
//! A cycle calls every endpoint concurrently, waits for all of them and then
//! hands the per-endpoint results to one commit. A failed endpoint reads as
//! `None` and never holds back the others. Starting a cycle while another is
//! outstanding does nothing.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;

use futures::future::join_all;
use log::{debug, warn};

use super::api_client::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was running; nothing was sent.
    Skipped,
    Committed,
}

#[derive(Debug, Default)]
pub struct PollingCoordinator {
    in_flight: Cell<bool>,
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl PollingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        if self.in_flight.replace(true) {
            return None;
        }
        Some(InFlight(&self.in_flight))
    }

    pub async fn run_cycle<K, R, F, Fut, C>(&self, endpoints: &[K], fetch: F, commit: C) -> CycleOutcome
    where
        K: Copy + Eq + Hash + Debug,
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<Option<R>, ApiError>>,
        C: FnOnce(HashMap<K, Option<R>>),
    {
        let Some(_guard) = self.begin() else {
            debug!("Poll cycle already in flight, skipping");
            return CycleOutcome::Skipped;
        };

        debug!("Poll cycle started ({} endpoints)", endpoints.len());
        let calls = endpoints.iter().map(|&key| {
            let call = fetch(key);
            async move { (key, call.await) }
        });

        let results = join_all(calls)
            .await
            .into_iter()
            .map(|(key, result)| match result {
                Ok(value) => (key, value),
                Err(e) => {
                    warn!("{:?} failed: {}", key, e);
                    (key, None)
                }
            })
            .collect::<HashMap<_, _>>();

        commit(results);
        debug!("Poll cycle committed");
        CycleOutcome::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{Reply, TestBed};
    use futures::executor::block_on;
    use futures::join;
    use serde_json::json;
    use std::cell::RefCell;

    const PATHS: [&str; 3] = ["/api/a", "/api/b", "/api/c"];

    #[test]
    fn test_failures_are_isolated() {
        let bed = TestBed::new();
        bed.transport.reply("/api/a", Reply::json(json!({"status": "success", "count": 3})));
        bed.transport.reply("/api/b", Reply::status(500));
        bed.transport.reply("/api/c", Reply::NetworkDown);
        let coordinator = PollingCoordinator::new();
        let committed = RefCell::new(None);

        let outcome = block_on(coordinator.run_cycle(
            &PATHS,
            |path| bed.api.get(path),
            |results| *committed.borrow_mut() = Some(results),
        ));

        assert_eq!(outcome, CycleOutcome::Committed);
        let results = committed.into_inner().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results["/api/a"].as_ref().and_then(|e| e.count), Some(3));
        assert!(results["/api/b"].is_none());
        assert!(results["/api/c"].is_none());
        assert!(!coordinator.is_in_flight());
    }

    #[test]
    fn test_overlapping_cycle_is_dropped() {
        let bed = TestBed::new();
        for path in PATHS {
            bed.transport.reply(path, Reply::json(json!({"status": "success"})).delayed(3));
        }
        let coordinator = PollingCoordinator::new();
        let commits = Cell::new(0);

        let (first, second) = block_on(async {
            join!(
                coordinator.run_cycle(&PATHS, |p| bed.api.get(p), |_| commits.set(commits.get() + 1)),
                coordinator.run_cycle(&PATHS, |p| bed.api.get(p), |_| commits.set(commits.get() + 1)),
            )
        });

        assert_eq!(first, CycleOutcome::Committed);
        assert_eq!(second, CycleOutcome::Skipped);
        assert_eq!(commits.get(), 1);
        assert_eq!(bed.transport.requests().len(), 3);
    }

    #[test]
    fn test_next_cycle_runs_after_completion() {
        let bed = TestBed::new();
        let coordinator = PollingCoordinator::new();

        for _ in 0..2 {
            let outcome = block_on(coordinator.run_cycle(&PATHS, |p| bed.api.get(p), |_| {}));
            assert_eq!(outcome, CycleOutcome::Committed);
        }

        assert_eq!(bed.transport.requests().len(), 6);
    }
}

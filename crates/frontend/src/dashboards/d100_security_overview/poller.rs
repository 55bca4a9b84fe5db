//! One dashboard poll cycle: fetch the eight reads, reduce them, commit once.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Local};
use contracts::dashboards::d100_security_overview::{
    AgentActivity, DashboardEndpoint, HostActivity, LoginRecord, ProcessActivity, UserActivity,
};
use contracts::shared::envelope::{Envelope, Series};
use log::debug;

use super::summary::{Panel, SummaryStats};
use crate::shared::api_client::ApiClient;
use crate::shared::charts::{ChartBackend, ChartData, ChartId, ChartSyncEngine};
use crate::shared::config::ClientConfig;
use crate::shared::polling::{CycleOutcome, PollingCoordinator};

/// Everything the dashboard shows apart from the charts.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub stats: SummaryStats,
    pub logins: Panel<LoginRecord>,
    pub hosts: Panel<HostActivity>,
    pub users: Panel<UserActivity>,
    pub processes: Panel<ProcessActivity>,
    pub agents: Panel<AgentActivity>,
    pub updated_at: DateTime<Local>,
}

pub trait DashboardView {
    fn set_loading(&self, loading: bool);

    /// Called exactly once per completed poll cycle.
    fn commit(&self, snapshot: DashboardSnapshot);
}

pub struct DashboardPoller<V: DashboardView, B: ChartBackend> {
    api: ApiClient,
    view: V,
    max_panel_rows: usize,
    max_type_bars: usize,
    coordinator: PollingCoordinator,
    charts: RefCell<ChartSyncEngine<B>>,
    stats: RefCell<SummaryStats>,
}

impl<V: DashboardView, B: ChartBackend> DashboardPoller<V, B> {
    pub fn new(api: ApiClient, view: V, charts: B, config: &ClientConfig) -> Self {
        Self {
            api,
            view,
            max_panel_rows: config.max_panel_rows,
            max_type_bars: config.max_type_bars,
            coordinator: PollingCoordinator::new(),
            charts: RefCell::new(ChartSyncEngine::new(charts)),
            stats: RefCell::new(SummaryStats::default()),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn stats(&self) -> SummaryStats {
        *self.stats.borrow()
    }

    /// Poll all endpoints. Dropped when a cycle is already running.
    pub async fn refresh(&self) -> CycleOutcome {
        if self.coordinator.is_in_flight() {
            debug!("Dashboard refresh dropped, cycle in flight");
            return CycleOutcome::Skipped;
        }

        self.view.set_loading(true);
        let api = &self.api;
        let outcome = self
            .coordinator
            .run_cycle(
                &DashboardEndpoint::ALL,
                |endpoint| async move { api.get(endpoint.path()).await },
                |results| self.commit(results),
            )
            .await;
        self.view.set_loading(false);
        outcome
    }

    /// Refresh button: throw away the chart instances, then poll.
    pub async fn manual_refresh(&self) -> CycleOutcome {
        self.destroy_charts();
        self.refresh().await
    }

    pub fn destroy_charts(&self) {
        self.charts.borrow_mut().destroy_all();
    }

    fn commit(&self, results: HashMap<DashboardEndpoint, Option<Envelope>>) {
        let get = |endpoint: DashboardEndpoint| results.get(&endpoint).and_then(Option::as_ref);
        let series = |endpoint: DashboardEndpoint| -> Option<Series> {
            get(endpoint).filter(|e| !e.is_error()).and_then(Envelope::series)
        };

        let next = SummaryStats::reduce(
            get(DashboardEndpoint::Agents),
            get(DashboardEndpoint::EventsBySeverity),
            get(DashboardEndpoint::Logins),
        );
        let stats = self.stats.borrow().merge(next);
        *self.stats.borrow_mut() = stats;

        {
            let mut charts = self.charts.borrow_mut();
            charts.sync(
                ChartId::EventTypes,
                series(DashboardEndpoint::EventsByType).map(|s| ChartData::top(&s, self.max_type_bars)),
            );
            charts.sync(
                ChartId::Severity,
                series(DashboardEndpoint::EventsBySeverity).map(|s| ChartData::from_series(&s)),
            );
            charts.sync(
                ChartId::Timeline,
                series(DashboardEndpoint::EventsTimeline).map(|s| ChartData::timeline(&s)),
            );
        }

        let rows = self.max_panel_rows;
        self.view.commit(DashboardSnapshot {
            stats,
            logins: Panel::from_envelope(get(DashboardEndpoint::Logins), rows),
            hosts: Panel::from_envelope(get(DashboardEndpoint::Hosts), rows),
            users: Panel::from_envelope(get(DashboardEndpoint::TopUsers), rows),
            processes: Panel::from_envelope(get(DashboardEndpoint::TopProcesses), rows),
            agents: Panel::from_envelope(get(DashboardEndpoint::Agents), rows),
            updated_at: Local::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{RecordingCharts, Reply, TestBed};
    use crate::system::auth::storage::SessionStore;
    use futures::executor::block_on;
    use futures::join;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct RecordingDashboard {
        loading: RefCell<Vec<bool>>,
        commits: RefCell<Vec<DashboardSnapshot>>,
    }

    impl DashboardView for RecordingDashboard {
        fn set_loading(&self, loading: bool) {
            self.loading.borrow_mut().push(loading);
        }

        fn commit(&self, snapshot: DashboardSnapshot) {
            self.commits.borrow_mut().push(snapshot);
        }
    }

    type Poller = DashboardPoller<RecordingDashboard, RecordingCharts>;

    fn poller(bed: &TestBed, charts: &RecordingCharts) -> Poller {
        DashboardPoller::new(
            bed.api.clone(),
            RecordingDashboard::default(),
            charts.clone(),
            &ClientConfig::default(),
        )
    }

    fn aggregate(labels: &[&str], values: &[u64]) -> Value {
        json!({"status": "success", "labels": labels, "data": values})
    }

    fn script_all(bed: &TestBed) {
        let t = &bed.transport;
        t.reply("/api/dashboard/agents", Reply::json(json!({"status": "success", "data": [{"hostname": "web-1", "event_count": 3}], "count": 2})));
        t.reply("/api/dashboard/logins", Reply::json(json!({"status": "success", "data": [{"user": "root", "event_type": "failed_login"}]})));
        t.reply("/api/dashboard/hosts", Reply::json(json!({"status": "success", "data": [{"hostname": "web-1", "event_count": 30}]})));
        t.reply("/api/dashboard/events-by-type", Reply::json(aggregate(&["ssh", "sudo"], &[5, 3])));
        t.reply("/api/dashboard/events-by-severity", Reply::json(aggregate(&["critical", "high", "medium", "low"], &[1, 2, 3, 4])));
        t.reply("/api/dashboard/top-users", Reply::json(json!({"status": "success", "data": []})));
        t.reply("/api/dashboard/top-processes", Reply::json(json!({"status": "error", "message": "index missing"})));
        t.reply("/api/dashboard/events-timeline", Reply::json(aggregate(&["2024-03-15 10:00", "2024-03-15 11:00"], &[7, 9])));
    }

    #[test]
    fn test_cycle_commits_once_with_every_panel() {
        let bed = TestBed::new();
        script_all(&bed);
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        assert_eq!(block_on(poller.refresh()), CycleOutcome::Committed);

        let commits = poller.view().commits.borrow();
        assert_eq!(commits.len(), 1);
        let snapshot = &commits[0];
        assert_eq!(snapshot.stats.total_agents, Some(2));
        assert_eq!(snapshot.stats.events_24h, Some(10));
        assert_eq!(snapshot.stats.high_severity, Some(2));
        assert_eq!(snapshot.stats.failed_logins, Some(1));
        assert!(matches!(snapshot.hosts, Panel::Rows(ref rows) if rows.len() == 1));
        assert_eq!(snapshot.users, Panel::Empty);
        assert_eq!(snapshot.processes, Panel::Error("index missing".to_string()));
        assert_eq!(*poller.view().loading.borrow(), vec![true, false]);
        assert_eq!(charts.log.borrow().created.len(), 3);
    }

    #[test]
    fn test_one_failing_endpoint_does_not_block_the_others() {
        let bed = TestBed::new();
        script_all(&bed);
        bed.transport.reply("/api/dashboard/hosts", Reply::NetworkDown);
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        // First scripted reply for hosts is still queued ahead of the failure.
        block_on(poller.refresh());
        block_on(poller.refresh());

        let commits = poller.view().commits.borrow();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[1].hosts, Panel::NoData);
        assert_eq!(commits[1].stats.total_agents, Some(2));
    }

    #[test]
    fn test_unauthorized_endpoint_ends_session_but_commits() {
        let bed = TestBed::new();
        script_all(&bed);
        bed.transport.reply("/api/dashboard/logins", Reply::status(401));
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        block_on(poller.refresh());
        block_on(poller.refresh());

        assert_eq!(poller.view().commits.borrow().len(), 2);
        assert!(bed.sessions.load().is_none());
        assert_eq!(bed.navigator.visits(), vec!["/login".to_string()]);
        assert_eq!(poller.view().commits.borrow()[1].logins, Panel::NoData);
    }

    #[test]
    fn test_overlapping_refresh_is_dropped() {
        let bed = TestBed::new();
        script_all(&bed);
        bed.transport.reply("/api/dashboard/agents", Reply::json(json!({"status": "success", "count": 2})).delayed(3));
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        // Consume the undelayed agents reply first so the delayed one answers the race.
        block_on(poller.refresh());
        let (first, second) = block_on(async { join!(poller.refresh(), poller.refresh()) });

        assert_eq!(first, CycleOutcome::Committed);
        assert_eq!(second, CycleOutcome::Skipped);
        assert_eq!(bed.transport.requests().len(), 16);
        assert_eq!(poller.view().commits.borrow().len(), 2);
    }

    #[test]
    fn test_charts_update_in_place_and_drop_on_empty() {
        let bed = TestBed::new();
        script_all(&bed);
        bed.transport.reply("/api/dashboard/events-by-type", Reply::json(aggregate(&["ssh", "sudo"], &[6, 3])));
        bed.transport.reply("/api/dashboard/events-timeline", Reply::json(aggregate(&[], &[])));
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        block_on(poller.refresh());
        block_on(poller.refresh());

        let log = charts.log.borrow();
        assert_eq!(log.created.len(), 3);
        assert_eq!(log.updated, vec![ChartId::EventTypes]);
        assert_eq!(log.destroyed, vec![ChartId::Timeline]);
        assert_eq!(log.last_data[&ChartId::EventTypes].values, vec![6.0, 3.0]);
    }

    #[test]
    fn test_timeline_axis_labels_are_shortened() {
        let bed = TestBed::new();
        script_all(&bed);
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        block_on(poller.refresh());

        let log = charts.log.borrow();
        let timeline = &log.last_data[&ChartId::Timeline];
        assert_eq!(timeline.labels, vec!["10:00", "11:00"]);
        assert_eq!(timeline.full_labels[0], "2024-03-15 10:00");
    }

    #[test]
    fn test_manual_refresh_rebuilds_charts() {
        let bed = TestBed::new();
        script_all(&bed);
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        block_on(poller.refresh());
        block_on(poller.manual_refresh());

        let log = charts.log.borrow();
        assert_eq!(log.destroyed.len(), 3);
        assert_eq!(log.created.len(), 6);
        assert!(log.updated.is_empty());
    }

    #[test]
    fn test_manual_refresh_during_cycle_only_drops_charts() {
        let bed = TestBed::new();
        script_all(&bed);
        bed.transport.reply("/api/dashboard/agents", Reply::json(json!({"status": "success", "data": [], "count": 5})).delayed(3));
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        block_on(poller.refresh());
        let (first, second) = block_on(async { join!(poller.refresh(), poller.manual_refresh()) });

        assert_eq!(first, CycleOutcome::Committed);
        assert_eq!(second, CycleOutcome::Skipped);
        assert_eq!(bed.transport.requests().len(), 16);
        assert_eq!(poller.view().commits.borrow().len(), 2);
        assert_eq!(poller.stats().total_agents, Some(5));

        let log = charts.log.borrow();
        assert_eq!(log.destroyed.len(), 3);
        // The running cycle's commit finds no live charts and builds them again.
        assert_eq!(log.created.len(), 6);
        assert!(log.updated.is_empty());
    }

    #[test]
    fn test_stats_survive_a_failed_cycle() {
        let bed = TestBed::new();
        script_all(&bed);
        bed.transport.reply("/api/dashboard/agents", Reply::status(500));
        bed.transport.reply("/api/dashboard/events-by-severity", Reply::status(500));
        let charts = RecordingCharts::default();
        let poller = poller(&bed, &charts);

        block_on(poller.refresh());
        block_on(poller.refresh());

        let stats = poller.stats();
        assert_eq!(stats.total_agents, Some(2));
        assert_eq!(stats.events_24h, Some(10));
        assert!(!charts.log.borrow().destroyed.is_empty());
    }
}

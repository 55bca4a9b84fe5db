//! Chart reconciliation.
//!
//! Each chart id is either absent or backed by one live chart instance.
//! Fresh data creates the instance once and then mutates it in place;
//! empty data destroys it.

pub mod chartjs;

use std::collections::HashMap;

use contracts::shared::envelope::Series;
use log::{debug, warn};

use super::date_utils::short_axis_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    EventTypes,
    Severity,
    Timeline,
}

impl ChartId {
    pub const ALL: [ChartId; 3] = [ChartId::EventTypes, ChartId::Severity, ChartId::Timeline];

    /// DOM id of the canvas the chart draws into.
    pub fn canvas_id(&self) -> &'static str {
        match self {
            ChartId::EventTypes => "eventTypesChart",
            ChartId::Severity => "severityChart",
            ChartId::Timeline => "timelineChart",
        }
    }
}

/// What a chart displays. `full_labels` keeps the untruncated labels for
/// tooltips when `labels` were shortened for the axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub full_labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartData {
    pub fn from_series(series: &Series) -> Self {
        Self {
            labels: series.labels.clone(),
            full_labels: series.labels.clone(),
            values: series.values.clone(),
        }
    }

    /// The first `n` entries.
    pub fn top(series: &Series, n: usize) -> Self {
        let labels: Vec<String> = series.labels.iter().take(n).cloned().collect();
        Self {
            full_labels: labels.clone(),
            labels,
            values: series.values.iter().take(n).copied().collect(),
        }
    }

    /// Time buckets with shortened axis labels.
    pub fn timeline(series: &Series) -> Self {
        Self {
            labels: series.labels.iter().map(|l| short_axis_label(l)).collect(),
            full_labels: series.labels.clone(),
            values: series.values.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.values.is_empty()
    }
}

/// Create/update/destroy of concrete chart instances.
pub trait ChartBackend {
    type Handle;

    /// `None` when the chart could not be built (e.g. its canvas is not mounted).
    fn create(&mut self, id: ChartId, data: &ChartData) -> Option<Self::Handle>;

    /// Replace labels and values in place and repaint without animation.
    fn update(&mut self, handle: &Self::Handle, data: &ChartData);

    fn destroy(&mut self, handle: Self::Handle);
}

pub enum ChartState<H> {
    Absent,
    Live { handle: H, last: ChartData },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Destroyed,
    Unchanged,
}

pub struct ChartSyncEngine<B: ChartBackend> {
    backend: B,
    charts: HashMap<ChartId, ChartState<B::Handle>>,
}

impl<B: ChartBackend> ChartSyncEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            charts: HashMap::new(),
        }
    }

    /// Bring chart `id` in line with `incoming`. `None` and empty data both
    /// mean "nothing to show".
    pub fn sync(&mut self, id: ChartId, incoming: Option<ChartData>) -> SyncOutcome {
        let incoming = incoming.filter(|data| !data.is_empty());
        let current = self.charts.remove(&id).unwrap_or(ChartState::Absent);

        let (next, outcome) = match (current, incoming) {
            (ChartState::Absent, None) => (ChartState::Absent, SyncOutcome::Unchanged),
            (ChartState::Absent, Some(data)) => match self.backend.create(id, &data) {
                Some(handle) => (ChartState::Live { handle, last: data }, SyncOutcome::Created),
                None => {
                    warn!("Chart {:?} could not be created", id);
                    (ChartState::Absent, SyncOutcome::Unchanged)
                }
            },
            (ChartState::Live { handle, last }, Some(data)) if last == data => {
                (ChartState::Live { handle, last }, SyncOutcome::Unchanged)
            }
            (ChartState::Live { handle, .. }, Some(data)) => {
                self.backend.update(&handle, &data);
                (ChartState::Live { handle, last: data }, SyncOutcome::Updated)
            }
            (ChartState::Live { handle, .. }, None) => {
                self.backend.destroy(handle);
                (ChartState::Absent, SyncOutcome::Destroyed)
            }
        };

        if outcome != SyncOutcome::Unchanged {
            debug!("Chart {:?}: {:?}", id, outcome);
        }
        self.charts.insert(id, next);
        outcome
    }

    pub fn destroy_all(&mut self) {
        for (_, state) in self.charts.drain() {
            if let ChartState::Live { handle, .. } = state {
                self.backend.destroy(handle);
            }
        }
    }

    pub fn is_live(&self, id: ChartId) -> bool {
        matches!(self.charts.get(&id), Some(ChartState::Live { .. }))
    }

    pub fn live_count(&self) -> usize {
        ChartId::ALL.iter().filter(|id| self.is_live(**id)).count()
    }
}

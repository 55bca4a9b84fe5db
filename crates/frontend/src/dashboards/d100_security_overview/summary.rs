use contracts::dashboards::d100_security_overview::LoginRecord;
use contracts::shared::envelope::{Envelope, Series};
use serde::de::DeserializeOwned;

/// Headline counters. `None` means the source endpoint has not produced data yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryStats {
    pub total_agents: Option<u64>,
    pub events_24h: Option<u64>,
    pub high_severity: Option<u64>,
    pub failed_logins: Option<u64>,
}

/// Envelopes that carry usable data. An explicit server error or a body
/// without `data` is not data.
fn usable(envelope: Option<&Envelope>) -> Option<&Envelope> {
    envelope.filter(|e| !e.is_error() && e.has_data())
}

/// Severity distribution; without `labels` the values are read by position.
fn severity_series(envelope: &Envelope) -> Option<Series> {
    Some(Series {
        labels: envelope.labels.clone().unwrap_or_default(),
        values: envelope.values()?,
    })
}

impl SummaryStats {
    /// Counters derivable from one poll cycle.
    pub fn reduce(
        agents: Option<&Envelope>,
        severity: Option<&Envelope>,
        logins: Option<&Envelope>,
    ) -> Self {
        let severity = usable(severity);
        let severity_series = severity.and_then(severity_series);

        let events_24h = severity.and_then(|e| {
            e.total_count_24h
                .or_else(|| e.values().map(|values| values.iter().sum::<f64>() as u64))
        });

        Self {
            total_agents: usable(agents).map(|e| e.count.unwrap_or(0)),
            events_24h,
            high_severity: severity_series.map(|s| s.value_of("high", 2) as u64),
            failed_logins: usable(logins)
                .and_then(|e| e.records::<LoginRecord>())
                .map(|records| records.iter().filter(|r| r.is_failed()).count() as u64),
        }
    }

    /// Overlay `next` on the current values; counters missing from `next` keep
    /// their previous value.
    pub fn merge(self, next: SummaryStats) -> Self {
        Self {
            total_agents: next.total_agents.or(self.total_agents),
            events_24h: next.events_24h.or(self.events_24h),
            high_severity: next.high_severity.or(self.high_severity),
            failed_logins: next.failed_logins.or(self.failed_logins),
        }
    }
}

/// Content of one dashboard table panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    /// Nothing usable arrived (network failure, session end, malformed body).
    NoData,
    /// The server answered `status: "error"`.
    Error(String),
    Empty,
    Rows(Vec<T>),
}

impl<T: DeserializeOwned> Panel<T> {
    pub fn from_envelope(envelope: Option<&Envelope>, max_rows: usize) -> Self {
        let Some(envelope) = envelope else {
            return Panel::NoData;
        };
        if envelope.is_error() {
            return Panel::Error(envelope.error_message());
        }
        match envelope.records::<T>() {
            None => Panel::NoData,
            Some(rows) if rows.is_empty() => Panel::Empty,
            Some(mut rows) => {
                rows.truncate(max_rows);
                Panel::Rows(rows)
            }
        }
    }
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Panel::NoData
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::dashboards::d100_security_overview::UserActivity;
    use serde_json::json;

    fn envelope(value: serde_json::Value) -> Envelope {
        Envelope::from_value(value).unwrap()
    }

    #[test]
    fn test_reduce_prefers_total_count_24h() {
        let severity = envelope(json!({
            "status": "success",
            "labels": ["critical", "high", "medium", "low"],
            "data": [1, 7, 10, 20],
            "total_count_24h": 99
        }));
        let stats = SummaryStats::reduce(None, Some(&severity), None);
        assert_eq!(stats.events_24h, Some(99));
        assert_eq!(stats.high_severity, Some(7));
        assert_eq!(stats.total_agents, None);
    }

    #[test]
    fn test_reduce_sums_severity_without_total() {
        let severity = envelope(json!({
            "status": "success",
            "labels": ["a", "b", "c"],
            "data": [1, 2, 3]
        }));
        let stats = SummaryStats::reduce(None, Some(&severity), None);
        assert_eq!(stats.events_24h, Some(6));
        // No "high" label: index 2 is used.
        assert_eq!(stats.high_severity, Some(3));
    }

    #[test]
    fn test_reduce_counts_failed_logins_and_agents() {
        let agents = envelope(json!({"status": "success", "data": [], "count": 4}));
        let logins = envelope(json!({
            "status": "success",
            "data": [
                {"user": "root", "event_type": "ssh_login_failed"},
                {"user": "bob", "raw_log": "Accepted password", "success": true},
                {"user": "eve", "raw_log": "Permission DENIED"}
            ]
        }));
        let stats = SummaryStats::reduce(Some(&agents), None, Some(&logins));
        assert_eq!(stats.total_agents, Some(4));
        assert_eq!(stats.failed_logins, Some(2));
    }

    #[test]
    fn test_agents_without_count_read_zero() {
        let agents = envelope(json!({"status": "success", "data": []}));
        assert_eq!(SummaryStats::reduce(Some(&agents), None, None).total_agents, Some(0));
    }

    #[test]
    fn test_bodies_without_data_keep_previous_counters() {
        let previous = SummaryStats {
            total_agents: Some(7),
            events_24h: Some(50),
            ..Default::default()
        };
        let agents = envelope(json!({"status": "success"}));
        let severity = envelope(json!({"status": "success", "total_count_24h": 3}));

        let next = SummaryStats::reduce(Some(&agents), Some(&severity), None);
        assert_eq!(next, SummaryStats::default());

        let merged = previous.merge(next);
        assert_eq!(merged.total_agents, Some(7));
        assert_eq!(merged.events_24h, Some(50));
    }

    #[test]
    fn test_high_severity_without_labels_reads_index_two() {
        let severity = envelope(json!({"status": "success", "data": [1, 2, 9, 4]}));
        let stats = SummaryStats::reduce(None, Some(&severity), None);
        assert_eq!(stats.high_severity, Some(9));
        assert_eq!(stats.events_24h, Some(16));
    }

    #[test]
    fn test_merge_keeps_previous_values() {
        let previous = SummaryStats {
            total_agents: Some(3),
            events_24h: Some(10),
            high_severity: Some(1),
            failed_logins: Some(2),
        };
        let next = SummaryStats {
            total_agents: Some(5),
            ..Default::default()
        };
        let merged = previous.merge(next);
        assert_eq!(merged.total_agents, Some(5));
        assert_eq!(merged.events_24h, Some(10));
        assert_eq!(merged.failed_logins, Some(2));
    }

    #[test]
    fn test_panel_states() {
        assert_eq!(Panel::<UserActivity>::from_envelope(None, 8), Panel::NoData);

        let error = envelope(json!({"status": "error", "message": "index missing"}));
        assert_eq!(
            Panel::<UserActivity>::from_envelope(Some(&error), 8),
            Panel::Error("index missing".to_string())
        );

        let empty = envelope(json!({"status": "success", "data": []}));
        assert_eq!(Panel::<UserActivity>::from_envelope(Some(&empty), 8), Panel::Empty);

        let malformed = envelope(json!({"status": "success", "data": "oops"}));
        assert_eq!(Panel::<UserActivity>::from_envelope(Some(&malformed), 8), Panel::NoData);
    }

    #[test]
    fn test_panel_rows_are_capped() {
        let users: Vec<_> = (0..12).map(|i| json!({"user": format!("u{}", i), "event_count": i})).collect();
        let body = envelope(json!({"status": "success", "data": users}));
        match Panel::<UserActivity>::from_envelope(Some(&body), 8) {
            Panel::Rows(rows) => {
                assert_eq!(rows.len(), 8);
                assert_eq!(rows[0].user.as_deref(), Some("u0"));
            }
            other => panic!("expected rows, got {:?}", other),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::shared::predicate::{PredicateOp, PredicateTree};

/// Fields matched by free-text search in an export query.
pub const SEARCH_FIELDS: [&str; 4] = ["raw_log", "user", "process", "command"];

/// Filter form of the events browser. Blank fields are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub search_text: String,
    pub use_regex: bool,
    pub severity: String,
    pub event_type: String,
    pub source: String,
    pub start_date: String,
    pub end_date: String,
}

fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl EventFilter {
    pub fn search_text(&self) -> Option<&str> {
        present(&self.search_text)
    }

    pub fn severity(&self) -> Option<&str> {
        present(&self.severity)
    }

    pub fn event_type(&self) -> Option<&str> {
        present(&self.event_type)
    }

    pub fn source(&self) -> Option<&str> {
        present(&self.source)
    }

    pub fn start_date(&self) -> Option<&str> {
        present(&self.start_date)
    }

    pub fn end_date(&self) -> Option<&str> {
        present(&self.end_date)
    }

    /// Regex matching only applies when there is search text.
    pub fn regex_enabled(&self) -> bool {
        self.use_regex && self.search_text().is_some()
    }

    /// Compile the filter into an export predicate.
    ///
    /// Free text becomes a disjunction of `contains` leaves over
    /// [`SEARCH_FIELDS`] and counts as one condition. No conditions yields
    /// match-all, one condition is returned bare, more are conjoined.
    pub fn to_export_query(&self) -> PredicateTree {
        let mut conditions = Vec::new();

        if let Some(text) = self.search_text() {
            conditions.push(PredicateTree::Or(
                SEARCH_FIELDS
                    .iter()
                    .map(|field| PredicateTree::leaf(*field, PredicateOp::Contains, text))
                    .collect(),
            ));
        }

        let equalities = [
            ("severity", self.severity()),
            ("event_type", self.event_type()),
            ("source", self.source()),
        ];
        for (field, value) in equalities {
            if let Some(value) = value {
                conditions.push(PredicateTree::leaf(field, PredicateOp::Equals, value));
            }
        }

        if let Some(start) = self.start_date() {
            conditions.push(PredicateTree::leaf("timestamp", PredicateOp::GreaterThan, start));
        }
        if let Some(end) = self.end_date() {
            conditions.push(PredicateTree::leaf("timestamp", PredicateOp::LessThan, end));
        }

        match conditions.len() {
            0 => PredicateTree::match_all(),
            1 => conditions.remove(0),
            _ => PredicateTree::And(conditions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(field: &str, op: PredicateOp, value: &str) -> PredicateTree {
        PredicateTree::leaf(field, op, value)
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(EventFilter::default().to_export_query().is_match_all());

        let blank = EventFilter {
            search_text: "   ".into(),
            use_regex: true,
            ..Default::default()
        };
        assert!(blank.to_export_query().is_match_all());
    }

    #[test]
    fn test_single_condition_is_not_wrapped() {
        let filter = EventFilter {
            severity: "high".into(),
            ..Default::default()
        };
        assert_eq!(
            filter.to_export_query(),
            leaf("severity", PredicateOp::Equals, "high")
        );
    }

    #[test]
    fn test_free_text_expands_to_four_contains_leaves() {
        let filter = EventFilter {
            search_text: "root".into(),
            ..Default::default()
        };
        let PredicateTree::Or(children) = filter.to_export_query() else {
            panic!("expected a disjunction");
        };
        assert_eq!(children.len(), 4);
        for (child, field) in children.iter().zip(SEARCH_FIELDS) {
            assert_eq!(child, &leaf(field, PredicateOp::Contains, "root"));
        }
    }

    #[test]
    fn test_several_conditions_are_conjoined() {
        let filter = EventFilter {
            search_text: "sshd".into(),
            severity: "critical".into(),
            event_type: "auth_failure".into(),
            source: "auth".into(),
            start_date: "2024-03-01".into(),
            end_date: "2024-03-02".into(),
            ..Default::default()
        };
        let PredicateTree::And(children) = filter.to_export_query() else {
            panic!("expected a conjunction");
        };
        assert_eq!(children.len(), 6);
        assert!(matches!(children[0], PredicateTree::Or(_)));
        assert_eq!(children[1], leaf("severity", PredicateOp::Equals, "critical"));
        assert_eq!(children[2], leaf("event_type", PredicateOp::Equals, "auth_failure"));
        assert_eq!(children[3], leaf("source", PredicateOp::Equals, "auth"));
        assert_eq!(
            children[4],
            leaf("timestamp", PredicateOp::GreaterThan, "2024-03-01")
        );
        assert_eq!(
            children[5],
            leaf("timestamp", PredicateOp::LessThan, "2024-03-02")
        );
    }

    #[test]
    fn test_condition_count_matches_set_fields() {
        let filter = EventFilter {
            start_date: "2024-03-01".into(),
            end_date: "2024-03-02".into(),
            ..Default::default()
        };
        let PredicateTree::And(children) = filter.to_export_query() else {
            panic!("expected a conjunction");
        };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_regex_needs_search_text() {
        let filter = EventFilter {
            use_regex: true,
            ..Default::default()
        };
        assert!(!filter.regex_enabled());
    }
}

use contracts::domain::a001_security_event::SecurityEvent;
use contracts::shared::envelope::Pagination;
use leptos::prelude::*;

use crate::domain::a001_security_event::query_engine::{EventPage, EventsView};

/// Reactive state of the events table. Copy handles, so the query engine
/// and the markup can share it.
#[derive(Clone, Copy)]
pub struct EventsListState {
    pub events: RwSignal<Vec<SecurityEvent>>,
    pub pagination: RwSignal<Option<Pagination>>,
    pub is_loaded: RwSignal<bool>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl EventsListState {
    pub fn new() -> Self {
        Self {
            events: RwSignal::new(Vec::new()),
            pagination: RwSignal::new(None),
            is_loaded: RwSignal::new(false),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }
}

impl Default for EventsListState {
    fn default() -> Self {
        Self::new()
    }
}

impl EventsView for EventsListState {
    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    fn show_page(&self, page: EventPage) {
        self.error.set(None);
        self.events.set(page.events);
        self.pagination.set(page.pagination);
        self.is_loaded.set(true);
    }

    fn show_error(&self, message: String) {
        self.error.set(Some(message));
    }
}

/// "Showing 26-50 of 123 events", or "No events found".
pub fn count_line(pagination: Option<&Pagination>) -> String {
    match pagination.and_then(|p| p.showing_range().map(|range| (range, p.total))) {
        Some(((start, end), total)) => format!("Showing {}-{} of {} events", start, end, total),
        None => "No events found".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_line() {
        let pagination = Pagination { page: 2, limit: 25, total: 123, pages: 5 };
        assert_eq!(count_line(Some(&pagination)), "Showing 26-50 of 123 events");
        assert_eq!(count_line(None), "No events found");

        let empty = Pagination { page: 1, limit: 25, total: 0, pages: 0 };
        assert_eq!(count_line(Some(&empty)), "No events found");
    }
}

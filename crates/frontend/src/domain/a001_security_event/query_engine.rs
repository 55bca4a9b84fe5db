//! Paging, filtering and export for the events browser.
//!
//! Every list request gets a sequence number. Only the response to the
//! most recently issued request may touch the view; older responses that
//! arrive late are dropped.

use std::cell::{Cell, RefCell};

use chrono::NaiveDate;
use contracts::domain::a001_security_event::{EventFilter, ExportFormat, ExportRequest, SecurityEvent};
use contracts::shared::envelope::{Envelope, Pagination};
use log::{debug, error, warn};
use serde::Serialize;

use crate::shared::api_client::{ApiClient, ApiError, CancelSignal, Method};
use crate::shared::date_utils::default_date_range;
use crate::shared::export::export_file_name;

pub const EVENTS_ENDPOINT: &str = "/api/events";

/// Query string of `GET /api/events`. Unset filter fields are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_regex: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl ListQuery {
    pub fn compile(filter: &EventFilter, page: u32, limit: u32) -> Self {
        let owned = |value: Option<&str>| value.map(str::to_string);
        Self {
            page,
            limit,
            search: owned(filter.search_text()),
            use_regex: filter.regex_enabled().then_some(true),
            severity: owned(filter.severity()),
            event_type: owned(filter.event_type()),
            source: owned(filter.source()),
            start_date: owned(filter.start_date()),
            end_date: owned(filter.end_date()),
        }
    }

    pub fn to_endpoint(&self) -> Result<String, ApiError> {
        let query = serde_qs::to_string(self).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(format!("{}?{}", EVENTS_ENDPOINT, query))
    }
}

/// One page of results, rendered as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    pub events: Vec<SecurityEvent>,
    pub pagination: Option<Pagination>,
}

impl EventPage {
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            events: envelope.records().unwrap_or_default(),
            pagination: envelope.pagination.map(Pagination::normalized),
        }
    }
}

/// Rendering side of the events browser.
pub trait EventsView {
    fn set_loading(&self, loading: bool);

    /// Replace table rows, pagination and the count line together.
    fn show_page(&self, page: EventPage);

    /// Surface an error; whatever is on screen stays.
    fn show_error(&self, message: String);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    /// The server answered `status: "error"`.
    ServerError,
    /// Session expired or the body carried nothing usable.
    NoData,
    Failed,
    /// A newer request was issued while this one was in flight.
    Stale,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct EventsQueryEngine<V: EventsView> {
    api: ApiClient,
    view: V,
    page: Cell<u32>,
    page_size: Cell<u32>,
    filter: RefCell<EventFilter>,
    issued: Cell<u64>,
}

impl<V: EventsView> EventsQueryEngine<V> {
    pub fn new(api: ApiClient, view: V, page_size: u32, filter: EventFilter) -> Self {
        Self {
            api,
            view,
            page: Cell::new(1),
            page_size: Cell::new(page_size.max(1)),
            filter: RefCell::new(filter),
            issued: Cell::new(0),
        }
    }

    /// The filter the browser opens with: only the default date window.
    pub fn initial_filter(today: NaiveDate) -> EventFilter {
        let (start_date, end_date) = default_date_range(today);
        EventFilter {
            start_date,
            end_date,
            ..Default::default()
        }
    }

    pub fn page(&self) -> u32 {
        self.page.get()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    pub fn filter(&self) -> EventFilter {
        self.filter.borrow().clone()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub async fn load(&self, page: u32) -> LoadOutcome {
        self.load_with_cancel(page, None).await
    }

    pub async fn load_with_cancel(&self, page: u32, cancel: Option<CancelSignal>) -> LoadOutcome {
        let page = page.max(1);
        self.page.set(page);
        let seq = self.issued.get() + 1;
        self.issued.set(seq);

        let query = ListQuery::compile(&self.filter.borrow(), page, self.page_size.get());
        let endpoint = match query.to_endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                error!("Could not build events query: {}", e);
                self.view.show_error(e.to_string());
                return LoadOutcome::Failed;
            }
        };

        self.view.set_loading(true);
        let result = self.api.call(&endpoint, Method::Get, None, cancel).await;

        if seq != self.issued.get() {
            debug!("Discarding stale events response #{} (latest #{})", seq, self.issued.get());
            return LoadOutcome::Stale;
        }

        let outcome = match result {
            Ok(Some(envelope)) if envelope.is_success() => {
                let rendered = EventPage::from_envelope(&envelope);
                if let Some(pagination) = rendered.pagination {
                    self.page.set(pagination.page);
                }
                self.view.show_page(rendered);
                LoadOutcome::Rendered
            }
            Ok(Some(envelope)) if envelope.is_error() => {
                self.view.show_error(envelope.error_message());
                LoadOutcome::ServerError
            }
            Ok(_) => LoadOutcome::NoData,
            Err(e) if e.is_cancelled() => {
                debug!("Events request #{} cancelled", seq);
                LoadOutcome::Cancelled
            }
            Err(e) => {
                warn!("Events request failed: {}", e);
                self.view.show_error(format!("Failed to load data: {}", e));
                LoadOutcome::Failed
            }
        };
        self.view.set_loading(false);
        outcome
    }

    /// Reload the current page with the current filter.
    pub async fn reload(&self) -> LoadOutcome {
        self.load(self.page.get()).await
    }

    pub async fn apply_filters(&self, filter: EventFilter) -> LoadOutcome {
        *self.filter.borrow_mut() = filter;
        self.load(1).await
    }

    pub async fn set_page_size(&self, page_size: u32) -> LoadOutcome {
        self.page_size.set(page_size.max(1));
        self.load(1).await
    }

    /// Back to the opening filter, first page.
    pub async fn clear_filters(&self, today: NaiveDate) -> LoadOutcome {
        self.apply_filters(Self::initial_filter(today)).await
    }

    /// Full record for the detail view. No id means nothing to fetch.
    pub async fn fetch(&self, id: Option<&str>) -> Result<Option<SecurityEvent>, String> {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };

        let endpoint = format!("{}/{}", EVENTS_ENDPOINT, urlencoding::encode(id));
        match self.api.get(&endpoint).await {
            Ok(Some(envelope)) if envelope.is_success() => Ok(envelope.record()),
            Ok(Some(envelope)) if envelope.is_error() => Err(envelope.error_message()),
            Ok(_) => Ok(None),
            Err(e) => Err(format!("Failed to load event: {}", e)),
        }
    }

    /// Export everything matching the current filter, regardless of paging.
    pub async fn export(&self, format: ExportFormat, today: NaiveDate) -> Result<ExportFile, String> {
        let request = ExportRequest {
            format,
            query: self.filter.borrow().to_export_query(),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| format!("Failed to serialize request: {}", e))?;

        match self.api.download(format.endpoint(), &body, None).await {
            Ok(Some(bytes)) => Ok(ExportFile {
                file_name: export_file_name(format, today),
                mime_type: format.mime_type(),
                bytes,
            }),
            Ok(None) => Err("Export failed".to_string()),
            Err(e) => Err(format!("Export failed: {}", e)),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::shared::predicate::PredicateTree;

/// File format offered by the bulk export endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "/api/events/export/csv",
            ExportFormat::Json => "/api/events/export/json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Json => "application/json",
        }
    }
}

/// Body of `POST /api/events/export/{csv|json}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub query: PredicateTree,
}

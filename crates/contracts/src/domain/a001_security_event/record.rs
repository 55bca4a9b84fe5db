use serde::{Deserialize, Serialize};

/// One stored security event as returned by the list and detail endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub raw_log: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

impl SecurityEvent {
    /// Lower-cased severity, `low` when the record has none.
    pub fn severity_level(&self) -> String {
        self.severity
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("low")
            .to_lowercase()
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read endpoints polled by the security overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardEndpoint {
    Agents,
    Logins,
    Hosts,
    EventsByType,
    EventsBySeverity,
    TopUsers,
    TopProcesses,
    EventsTimeline,
}

impl DashboardEndpoint {
    pub const ALL: [DashboardEndpoint; 8] = [
        DashboardEndpoint::Agents,
        DashboardEndpoint::Logins,
        DashboardEndpoint::Hosts,
        DashboardEndpoint::EventsByType,
        DashboardEndpoint::EventsBySeverity,
        DashboardEndpoint::TopUsers,
        DashboardEndpoint::TopProcesses,
        DashboardEndpoint::EventsTimeline,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            DashboardEndpoint::Agents => "/api/dashboard/agents",
            DashboardEndpoint::Logins => "/api/dashboard/logins",
            DashboardEndpoint::Hosts => "/api/dashboard/hosts",
            DashboardEndpoint::EventsByType => "/api/dashboard/events-by-type",
            DashboardEndpoint::EventsBySeverity => "/api/dashboard/events-by-severity",
            DashboardEndpoint::TopUsers => "/api/dashboard/top-users",
            DashboardEndpoint::TopProcesses => "/api/dashboard/top-processes",
            DashboardEndpoint::EventsTimeline => "/api/dashboard/events-timeline",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentActivity {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub event_count: u64,
}

/// Event types that always mean a failed authentication.
pub const FAILED_LOGIN_TYPES: [&str; 6] = [
    "failed_login",
    "auth_failure",
    "ssh_login_failed",
    "invalid_user",
    "pam_auth_failure",
    "brute_force",
];

/// Raw log words that mark a failed authentication.
pub const FAILED_LOGIN_KEYWORDS: [&str; 7] = [
    "failed",
    "failure",
    "invalid",
    "denied",
    "refused",
    "rejected",
    "unauthorized",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRecord {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub raw_log: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl LoginRecord {
    pub fn is_failed(&self) -> bool {
        let event_type = self.event_type.as_deref().unwrap_or_default().to_lowercase();
        let raw_log = self.raw_log.as_deref().unwrap_or_default().to_lowercase();

        FAILED_LOGIN_TYPES.iter().any(|t| event_type.contains(t))
            || FAILED_LOGIN_KEYWORDS.iter().any(|k| raw_log.contains(k))
            || self.success == Some(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostActivity {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub event_count: u64,
    #[serde(default)]
    pub severity_counts: HashMap<String, u64>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl HostActivity {
    pub fn high_count(&self) -> u64 {
        self.severity_counts.get("high").copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserActivity {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub event_count: u64,
    #[serde(default)]
    pub event_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessActivity {
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub event_count: u64,
    #[serde(default)]
    pub sources: Vec<String>,
}

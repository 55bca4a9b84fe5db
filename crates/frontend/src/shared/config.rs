//! Client settings, baked in from `client.toml` at build time.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

const EMBEDDED_CONFIG: &str = include_str!("../../client.toml");

static CLIENT_CONFIG: Lazy<ClientConfig> = Lazy::new(|| {
    ClientConfig::from_toml(EMBEDDED_CONFIG).unwrap_or_else(|e| {
        // The logger is configured from this value, so report on the console directly.
        web_sys::console::warn_1(&format!("client.toml ignored: {}", e).into());
        ClientConfig::default()
    })
});

/// Process-wide client configuration.
pub fn client_config() -> &'static ClientConfig {
    &CLIENT_CONFIG
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API. Empty means same origin as the page.
    pub api_base: String,
    pub log_level: String,
    pub dashboard_refresh_secs: u64,
    pub events_refresh_secs: u64,
    pub default_page_size: u32,
    pub page_size_options: Vec<u32>,
    /// Rows shown per dashboard panel.
    pub max_panel_rows: usize,
    /// Bars shown in the events-by-type chart.
    pub max_type_bars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            log_level: "debug".to_string(),
            dashboard_refresh_secs: 15,
            events_refresh_secs: 10,
            default_page_size: 25,
            page_size_options: vec![25, 50, 100],
            max_panel_rows: 8,
            max_type_bars: 10,
        }
    }
}

impl ClientConfig {
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn log_level(&self) -> log::Level {
        log::Level::from_str(&self.log_level).unwrap_or(log::Level::Debug)
    }

    pub fn dashboard_refresh(&self) -> Duration {
        Duration::from_secs(self.dashboard_refresh_secs.max(1))
    }

    pub fn events_refresh(&self) -> Duration {
        Duration::from_secs(self.events_refresh_secs.max(1))
    }
}

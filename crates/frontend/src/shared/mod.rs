pub mod api_client;
pub mod api_utils;
pub mod charts;
pub mod components;
pub mod config;
pub mod date_utils;
pub mod export;
pub mod list_utils;
pub mod polling;
pub mod refresh_timer;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

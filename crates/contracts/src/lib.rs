//! Wire types shared between the SIEM console and its HTTP API.

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod system;

pub mod export;
pub mod filter;
pub mod record;

pub use export::{ExportFormat, ExportRequest};
pub use filter::EventFilter;
pub use record::SecurityEvent;

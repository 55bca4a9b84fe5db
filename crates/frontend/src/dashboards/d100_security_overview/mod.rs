pub mod poller;
pub mod summary;
pub mod ui;

pub mod d100_security_overview;

pub use d100_security_overview::ui::SecurityOverviewDashboard;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const EVENTS_PATH: &str = "/events";

/// Full-page navigation. Leaving a view this way tears down everything it owns.
pub trait Navigator {
    fn go_to(&self, path: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn go_to(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(path) {
            log::error!("Navigation to {} failed: {:?}", path, e);
        }
    }
}

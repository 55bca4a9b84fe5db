use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::path;

use crate::dashboards::SecurityOverviewDashboard;
use crate::domain::a001_security_event::ui::list::EventsList;
use crate::system::auth::guard::DASHBOARD_PATH;
use crate::system::pages::login::LoginPage;

/// Each view checks the session itself and bounces to `/login` without one.
#[component]
pub fn AppRoutes() -> impl IntoView {
    view! {
        <Router>
            <Routes fallback=|| view! { <p class="not-found">"Page not found"</p> }>
                <Route path=path!("/login") view=LoginPage />
                <Route path=path!("/dashboard") view=SecurityOverviewDashboard />
                <Route path=path!("/events") view=EventsList />
                <Route path=path!("/") view=|| view! { <Redirect path=DASHBOARD_PATH /> } />
            </Routes>
        </Router>
    }
}

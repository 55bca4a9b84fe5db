use leptos::prelude::*;
use leptos_router::components::A;
use thaw::*;

use crate::system::auth::guard::{DASHBOARD_PATH, EVENTS_PATH};

/// Header shared by the dashboard and the events browser: title, navigation,
/// page actions and the signed-in user.
#[component]
pub fn PageHeader(
    #[prop(into)] title: String,
    #[prop(into)] username: String,
    on_logout: Callback<()>,
    /// Page-specific actions (pass an empty fragment if not needed)
    children: Children,
) -> impl IntoView {
    view! {
        <div class="page-header">
            <div class="page-header__content">
                <h1 class="page-header__title">{title}</h1>
                <nav class="page-header__nav">
                    <A href=DASHBOARD_PATH>"Dashboard"</A>
                    <A href=EVENTS_PATH>"Events"</A>
                </nav>
            </div>
            <div class="page-header__actions">
                {children()}
                <span class="page-header__user">{username}</span>
                <Button appearance=ButtonAppearance::Subtle on_click=move |_| on_logout.run(())>
                    "Logout"
                </Button>
            </div>
        </div>
    }
}

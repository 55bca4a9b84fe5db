use contracts::shared::envelope::Pagination;
use leptos::prelude::*;

/// Most page links shown at once.
pub const WINDOW_SIZE: u32 = 5;

/// Which page links to render for a given position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub current: u32,
    pub pages: u32,
    pub links: Vec<u32>,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl PageWindow {
    /// `None` when there is at most one page: no control is rendered then.
    ///
    /// The window is centered on `current` and shifted, not shrunk, near
    /// either end.
    pub fn compute(current: u32, pages: u32) -> Option<Self> {
        if pages <= 1 {
            return None;
        }
        let current = current.clamp(1, pages);
        let half = WINDOW_SIZE / 2;

        let mut start = current.saturating_sub(half).max(1);
        let end = start.saturating_add(WINDOW_SIZE - 1).min(pages);
        if end - start + 1 < WINDOW_SIZE {
            start = end.saturating_sub(WINDOW_SIZE - 1).max(1);
        }

        Some(Self {
            current,
            pages,
            links: (start..=end).collect(),
            prev_disabled: current == 1,
            next_disabled: current == pages,
        })
    }

    pub fn from_pagination(pagination: &Pagination) -> Option<Self> {
        Self::compute(pagination.page, pagination.pages)
    }
}

fn item_class(disabled: bool) -> &'static str {
    if disabled {
        "page-item disabled"
    } else {
        "page-item"
    }
}

/// Previous / numbered / next page links.
#[component]
pub fn PaginationControls(
    #[prop(into)] pagination: Signal<Option<Pagination>>,
    on_page_change: Callback<u32>,
) -> impl IntoView {
    move || {
        let window = pagination.get().and_then(|p| PageWindow::from_pagination(&p))?;
        let current = window.current;

        let links = window
            .links
            .iter()
            .map(|&page| {
                let class = if page == current {
                    "page-item active"
                } else {
                    "page-item"
                };
                view! {
                    <li class=class>
                        <a class="page-link" href="#" on:click=move |ev| {
                            ev.prevent_default();
                            on_page_change.run(page);
                        }>
                            {page.to_string()}
                        </a>
                    </li>
                }
            })
            .collect_view();

        Some(view! {
            <ul class="pagination">
                <li class=item_class(window.prev_disabled)>
                    <a class="page-link" href="#" on:click=move |ev| {
                        ev.prevent_default();
                        if current > 1 {
                            on_page_change.run(current - 1);
                        }
                    }>
                        "Previous"
                    </a>
                </li>
                {links}
                <li class=item_class(window.next_disabled)>
                    <a class="page-link" href="#" on:click=move |ev| {
                        ev.prevent_default();
                        if current < window.pages {
                            on_page_change.run(current + 1);
                        }
                    }>
                        "Next"
                    </a>
                </li>
            </ul>
        })
    }
}

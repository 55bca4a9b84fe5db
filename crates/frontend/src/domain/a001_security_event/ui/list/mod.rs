pub mod state;

use std::rc::Rc;

use chrono::Local;
use contracts::domain::a001_security_event::{EventFilter, ExportFormat, SecurityEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use self::state::{count_line, EventsListState};
use crate::domain::a001_security_event::query_engine::EventsQueryEngine;
use crate::domain::a001_security_event::ui::details::EventDetails;
use crate::shared::components::page_header::PageHeader;
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::date_utils::format_timestamp;
use crate::shared::export::download_bytes;
use crate::shared::list_utils::{truncate_text, SeverityBadge, CELL_TEXT_LEN};
use crate::shared::refresh_timer::AutoRefreshTimer;
use crate::system::auth::context::ViewContext;

type Engine = EventsQueryEngine<EventsListState>;

const SEVERITY_OPTIONS: [(&str, &str); 5] = [
    ("", "All severities"),
    ("critical", "Critical"),
    ("high", "High"),
    ("medium", "Medium"),
    ("low", "Low"),
];

/// Text inputs of the filter form. Only copied into the engine on submit.
#[derive(Clone, Copy)]
struct FilterForm {
    search_text: RwSignal<String>,
    use_regex: RwSignal<bool>,
    severity: RwSignal<String>,
    event_type: RwSignal<String>,
    source: RwSignal<String>,
    start_date: RwSignal<String>,
    end_date: RwSignal<String>,
}

impl FilterForm {
    fn new(filter: EventFilter) -> Self {
        Self {
            search_text: RwSignal::new(filter.search_text),
            use_regex: RwSignal::new(filter.use_regex),
            severity: RwSignal::new(filter.severity),
            event_type: RwSignal::new(filter.event_type),
            source: RwSignal::new(filter.source),
            start_date: RwSignal::new(filter.start_date),
            end_date: RwSignal::new(filter.end_date),
        }
    }

    fn snapshot(&self) -> EventFilter {
        EventFilter {
            search_text: self.search_text.get_untracked(),
            use_regex: self.use_regex.get_untracked(),
            severity: self.severity.get_untracked(),
            event_type: self.event_type.get_untracked(),
            source: self.source.get_untracked(),
            start_date: self.start_date.get_untracked(),
            end_date: self.end_date.get_untracked(),
        }
    }

    fn reset(&self, filter: EventFilter) {
        self.search_text.set(filter.search_text);
        self.use_regex.set(filter.use_regex);
        self.severity.set(filter.severity);
        self.event_type.set(filter.event_type);
        self.source.set(filter.source);
        self.start_date.set(filter.start_date);
        self.end_date.set(filter.end_date);
    }
}

#[component]
fn FilterInput(label: &'static str, value: RwSignal<String>, #[prop(optional)] input_type: Option<&'static str>) -> impl IntoView {
    view! {
        <label class="filter-field">
            <span>{label}</span>
            <input
                type=input_type.unwrap_or("text")
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

/// Filterable, paginated and auto-refreshing events table.
#[component]
#[allow(non_snake_case)]
pub fn EventsList() -> impl IntoView {
    let Some(ctx) = ViewContext::browser() else {
        return ().into_any();
    };

    let config = ctx.config.clone();
    let username = ctx.username().to_string();
    let today = Local::now().date_naive();

    let state = EventsListState::new();
    let initial_filter = Engine::initial_filter(today);
    let form = FilterForm::new(initial_filter.clone());
    let engine = StoredValue::new_local(Rc::new(Engine::new(
        ctx.api.clone(),
        state,
        config.default_page_size,
        initial_filter,
    )));
    let ctx = StoredValue::new_local(ctx);

    let page_size = RwSignal::new(config.default_page_size);
    let auto_refresh = RwSignal::new(true);
    let selected = RwSignal::new(None::<SecurityEvent>);

    let load_page = move |page: u32| {
        let engine = engine.get_value();
        spawn_local(async move {
            engine.load(page).await;
        });
    };

    let tick = move || {
        if let Some(engine) = engine.try_get_value() {
            spawn_local(async move {
                engine.reload().await;
            });
        }
    };

    let timer = StoredValue::new_local(AutoRefreshTimer::new(config.events_refresh()));
    Effect::new(move |_| {
        let enabled = auto_refresh.get();
        timer.with_value(|t| t.set_enabled(enabled, tick));
    });
    on_cleanup(move || {
        timer.try_with_value(|t| t.stop());
    });

    load_page(1);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let engine = engine.get_value();
        let filter = form.snapshot();
        spawn_local(async move {
            engine.apply_filters(filter).await;
        });
    };

    let on_clear = move |_: leptos::ev::MouseEvent| {
        let today = Local::now().date_naive();
        form.reset(Engine::initial_filter(today));
        let engine = engine.get_value();
        spawn_local(async move {
            engine.clear_filters(today).await;
        });
    };

    let on_page_size = move |ev: leptos::ev::Event| {
        let Ok(size) = event_target_value(&ev).parse::<u32>() else {
            return;
        };
        page_size.set(size);
        let engine = engine.get_value();
        spawn_local(async move {
            engine.set_page_size(size).await;
        });
    };

    let export = move |format: ExportFormat| {
        let engine = engine.get_value();
        spawn_local(async move {
            let result = engine
                .export(format, Local::now().date_naive())
                .await
                .and_then(|file| download_bytes(&file.bytes, &file.file_name, file.mime_type));
            if let Err(e) = result {
                log::error!("Export failed: {}", e);
                state.error.set(Some(e));
            }
        });
    };

    let open_details = move |id: String| {
        let engine = engine.get_value();
        spawn_local(async move {
            match engine.fetch(Some(&id)).await {
                Ok(Some(event)) => selected.set(Some(event)),
                Ok(None) => log::warn!("Event {} not found", id),
                Err(e) => state.error.set(Some(e)),
            }
        });
    };

    let refresh_label = format!(
        "Auto-refresh (every {} seconds)",
        config.events_refresh().as_secs()
    );
    let page_size_options = config.page_size_options.clone();

    let rows = move || {
        state
            .events
            .get()
            .into_iter()
            .map(|event| {
                let id = event.id.clone();
                let timestamp = format_timestamp(event.timestamp.as_deref());
                let severity = event.severity_level();
                let event_type = event.event_type.clone().unwrap_or_else(|| "N/A".into());
                let source = event.source.clone().unwrap_or_else(|| "N/A".into());
                let hostname = truncate_text(event.hostname.as_deref(), CELL_TEXT_LEN);
                let user = truncate_text(event.user.as_deref(), CELL_TEXT_LEN);
                let process = truncate_text(event.process.as_deref(), CELL_TEXT_LEN);
                view! {
                    <TableRow on:click=move |_| open_details(id.clone())>
                        <TableCell>{timestamp}</TableCell>
                        <TableCell><SeverityBadge severity=severity /></TableCell>
                        <TableCell>{event_type}</TableCell>
                        <TableCell>{source}</TableCell>
                        <TableCell>{hostname}</TableCell>
                        <TableCell>{user}</TableCell>
                        <TableCell>{process}</TableCell>
                        <TableCell>
                            <Button appearance=ButtonAppearance::Subtle size=ButtonSize::Small>"View"</Button>
                        </TableCell>
                    </TableRow>
                }
            })
            .collect_view()
    };

    view! {
        <div class="events-page">
            <PageHeader
                title="Security Events"
                username=username
                on_logout=Callback::new(move |_| ctx.with_value(|c| c.logout()))
            >
                <Show when=move || state.loading.get()>
                    <Spinner size=SpinnerSize::Tiny />
                </Show>
            </PageHeader>

            <form class="filters" on:submit=on_submit>
                <Flex gap=FlexGap::Small align=FlexAlign::End>
                    <FilterInput label="Search" value=form.search_text />
                    <label class="filter-field">
                        <input
                            type="checkbox"
                            prop:checked=move || form.use_regex.get()
                            on:change=move |ev| form.use_regex.set(event_target_checked(&ev))
                        />
                        <span>"Regex"</span>
                    </label>
                    <label class="filter-field">
                        <span>"Severity"</span>
                        <select
                            prop:value=move || form.severity.get()
                            on:change=move |ev| form.severity.set(event_target_value(&ev))
                        >
                            {SEVERITY_OPTIONS
                                .iter()
                                .map(|(value, label)| view! { <option value=*value>{*label}</option> })
                                .collect_view()}
                        </select>
                    </label>
                    <FilterInput label="Event type" value=form.event_type />
                    <FilterInput label="Source" value=form.source />
                    <FilterInput label="From" value=form.start_date input_type="date" />
                    <FilterInput label="To" value=form.end_date input_type="date" />
                    <button type="submit" class="btn btn-primary">"Apply"</button>
                    <Button appearance=ButtonAppearance::Secondary on_click=on_clear>
                        "Clear"
                    </Button>
                </Flex>
            </form>

            <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center>
                <Switch checked=auto_refresh label=refresh_label />
                <Space>
                    <label>
                        "Page size "
                        <select
                            prop:value=move || page_size.get().to_string()
                            on:change=on_page_size
                        >
                            {page_size_options
                                .into_iter()
                                .map(|n| view! { <option value=n.to_string()>{n.to_string()}</option> })
                                .collect_view()}
                        </select>
                    </label>
                    <Button appearance=ButtonAppearance::Secondary on_click=move |_| export(ExportFormat::Csv)>
                        "Export CSV"
                    </Button>
                    <Button appearance=ButtonAppearance::Secondary on_click=move |_| export(ExportFormat::Json)>
                        "Export JSON"
                    </Button>
                </Space>
            </Flex>

            {move || state.error.get().map(|e| view! { <div class="alert alert-danger">{e}</div> })}

            <Table>
                <TableHeader>
                    <TableRow>
                        <TableHeaderCell>"Timestamp"</TableHeaderCell>
                        <TableHeaderCell>"Severity"</TableHeaderCell>
                        <TableHeaderCell>"Event Type"</TableHeaderCell>
                        <TableHeaderCell>"Source"</TableHeaderCell>
                        <TableHeaderCell>"Hostname"</TableHeaderCell>
                        <TableHeaderCell>"User"</TableHeaderCell>
                        <TableHeaderCell>"Process"</TableHeaderCell>
                        <TableHeaderCell>""</TableHeaderCell>
                    </TableRow>
                </TableHeader>
                <TableBody>{rows}</TableBody>
            </Table>

            <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center>
                <span class="count-line">
                    {move || state.is_loaded.get().then(|| count_line(state.pagination.get().as_ref()))}
                </span>
                <PaginationControls
                    pagination=state.pagination
                    on_page_change=Callback::new(move |page: u32| load_page(page))
                />
            </Flex>

            {move || {
                selected
                    .get()
                    .map(|event| {
                        view! {
                            <EventDetails
                                event=event
                                on_close=Callback::new(move |_| selected.set(None))
                            />
                        }
                    })
            }}
        </div>
    }
    .into_any()
}

use std::rc::Rc;

use chrono::{DateTime, Local};
use contracts::dashboards::d100_security_overview::{
    AgentActivity, HostActivity, LoginRecord, ProcessActivity, UserActivity,
};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use crate::dashboards::d100_security_overview::poller::{
    DashboardPoller, DashboardSnapshot, DashboardView,
};
use crate::dashboards::d100_security_overview::summary::{Panel, SummaryStats};
use crate::shared::charts::chartjs::ChartJsBackend;
use crate::shared::charts::ChartId;
use crate::shared::components::page_header::PageHeader;
use crate::shared::components::stat_card::StatCard;
use crate::shared::date_utils::{format_clock, format_timestamp};
use crate::shared::list_utils::{truncate_text, CELL_TEXT_LEN};
use crate::shared::refresh_timer::AutoRefreshTimer;
use crate::system::auth::context::ViewContext;

#[derive(Clone, Copy)]
struct DashboardState {
    loading: RwSignal<bool>,
    stats: RwSignal<SummaryStats>,
    logins: RwSignal<Panel<LoginRecord>>,
    hosts: RwSignal<Panel<HostActivity>>,
    users: RwSignal<Panel<UserActivity>>,
    processes: RwSignal<Panel<ProcessActivity>>,
    agents: RwSignal<Panel<AgentActivity>>,
    updated_at: RwSignal<Option<DateTime<Local>>>,
}

impl DashboardState {
    fn new() -> Self {
        Self {
            loading: RwSignal::new(false),
            stats: RwSignal::new(SummaryStats::default()),
            logins: RwSignal::new(Panel::NoData),
            hosts: RwSignal::new(Panel::NoData),
            users: RwSignal::new(Panel::NoData),
            processes: RwSignal::new(Panel::NoData),
            agents: RwSignal::new(Panel::NoData),
            updated_at: RwSignal::new(None),
        }
    }
}

impl DashboardView for DashboardState {
    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    fn commit(&self, snapshot: DashboardSnapshot) {
        self.stats.set(snapshot.stats);
        self.logins.set(snapshot.logins);
        self.hosts.set(snapshot.hosts);
        self.users.set(snapshot.users);
        self.processes.set(snapshot.processes);
        self.agents.set(snapshot.agents);
        self.updated_at.set(Some(snapshot.updated_at));
    }
}

fn message_row(columns: usize, text: String, class: &'static str) -> AnyView {
    view! {
        <tr>
            <td colspan=columns.to_string() class=class>{text}</td>
        </tr>
    }
    .into_any()
}

fn panel_rows<T: 'static>(panel: Panel<T>, columns: usize, row: fn(T) -> AnyView) -> AnyView {
    match panel {
        Panel::NoData => message_row(columns, "No data available".to_string(), "text-muted"),
        Panel::Error(message) => message_row(columns, format!("Error: {}", message), "text-danger"),
        Panel::Empty => message_row(columns, "No records".to_string(), "text-muted"),
        Panel::Rows(rows) => rows.into_iter().map(row).collect_view().into_any(),
    }
}

fn text(value: Option<&str>) -> String {
    truncate_text(value, CELL_TEXT_LEN)
}

fn login_row(login: LoginRecord) -> AnyView {
    let (status, class) = if login.is_failed() {
        ("Failed", "badge bg-danger")
    } else {
        ("Success", "badge bg-success")
    };
    view! {
        <tr>
            <td>{format_timestamp(login.timestamp.as_deref())}</td>
            <td>{text(login.user.as_deref())}</td>
            <td>{text(login.hostname.as_deref())}</td>
            <td><span class=class>{status}</span></td>
        </tr>
    }
    .into_any()
}

fn host_row(host: HostActivity) -> AnyView {
    let high = host.high_count();
    view! {
        <tr>
            <td>{text(host.hostname.as_deref())}</td>
            <td>{host.event_count}</td>
            <td>{high}</td>
        </tr>
    }
    .into_any()
}

fn user_row(user: UserActivity) -> AnyView {
    let types = user.event_types.join(", ");
    view! {
        <tr>
            <td>{text(user.user.as_deref())}</td>
            <td>{user.event_count}</td>
            <td>{text(Some(types.as_str()))}</td>
        </tr>
    }
    .into_any()
}

fn process_row(process: ProcessActivity) -> AnyView {
    view! {
        <tr>
            <td>{text(process.process.as_deref())}</td>
            <td>{process.event_count}</td>
        </tr>
    }
    .into_any()
}

fn agent_row(agent: AgentActivity) -> AnyView {
    view! {
        <tr>
            <td>{text(agent.agent_id.as_deref())}</td>
            <td>{text(agent.hostname.as_deref())}</td>
            <td>{format_timestamp(agent.last_activity.as_deref())}</td>
            <td>{agent.event_count}</td>
        </tr>
    }
    .into_any()
}

fn dashboard_panel(
    title: &'static str,
    headers: &'static [&'static str],
    body: impl Fn() -> AnyView + Send + Sync + 'static,
) -> impl IntoView {
    view! {
        <div class="card dashboard-panel">
            <div class="card-header">{title}</div>
            <table class="table table-sm">
                <thead>
                    <tr>{headers.iter().map(|h| view! { <th>{*h}</th> }).collect_view()}</tr>
                </thead>
                <tbody>{body}</tbody>
            </table>
        </div>
    }
}

fn chart_canvas(id: ChartId, title: &'static str) -> impl IntoView {
    view! {
        <div class="card chart-card">
            <div class="card-header">{title}</div>
            <canvas id=id.canvas_id()></canvas>
        </div>
    }
}

/// Security overview: headline counters, three charts and five entity panels,
/// polled on a fixed cadence.
#[component]
#[allow(non_snake_case)]
pub fn SecurityOverviewDashboard() -> impl IntoView {
    let Some(ctx) = ViewContext::browser() else {
        return ().into_any();
    };

    let config = ctx.config.clone();
    let username = ctx.username().to_string();
    let state = DashboardState::new();
    let poller = StoredValue::new_local(Rc::new(DashboardPoller::new(
        ctx.api.clone(),
        state,
        ChartJsBackend,
        &config,
    )));
    let ctx = StoredValue::new_local(ctx);
    let auto_refresh = RwSignal::new(true);

    let refresh = move || {
        if let Some(poller) = poller.try_get_value() {
            spawn_local(async move {
                poller.refresh().await;
            });
        }
    };

    let manual_refresh = move |_: leptos::ev::MouseEvent| {
        let poller = poller.get_value();
        spawn_local(async move {
            poller.manual_refresh().await;
        });
    };

    // Effects run after mount, so the canvases exist by the first cycle.
    Effect::new(move |_| refresh());

    let timer = StoredValue::new_local(AutoRefreshTimer::new(config.dashboard_refresh()));
    Effect::new(move |_| {
        let enabled = auto_refresh.get();
        timer.with_value(|t| t.set_enabled(enabled, refresh));
    });
    on_cleanup(move || {
        timer.try_with_value(|t| t.stop());
        poller.try_with_value(|p| p.destroy_charts());
    });

    let refresh_label = format!(
        "Auto-refresh (every {} seconds)",
        config.dashboard_refresh().as_secs()
    );
    let stat = move |pick: fn(&SummaryStats) -> Option<u64>| Signal::derive(move || pick(&state.stats.get()));

    view! {
        <div class="dashboard-page">
            <PageHeader
                title="Security Overview"
                username=username
                on_logout=Callback::new(move |_| ctx.with_value(|c| c.logout()))
            >
                <Show when=move || state.loading.get()>
                    <Spinner size=SpinnerSize::Tiny />
                </Show>
                <span class="last-updated">
                    {move || state.updated_at.get().map(|at| format!("Last updated: {}", format_clock(at)))}
                </span>
                <Button appearance=ButtonAppearance::Secondary on_click=manual_refresh>
                    "Refresh"
                </Button>
            </PageHeader>

            <Switch checked=auto_refresh label=refresh_label />

            <Flex gap=FlexGap::Medium>
                <StatCard label="Total Agents" value=stat(|s| s.total_agents) />
                <StatCard label="Events (24h)" value=stat(|s| s.events_24h) />
                <StatCard label="High Severity" value=stat(|s| s.high_severity) variant="stat-card--warning" />
                <StatCard label="Failed Logins" value=stat(|s| s.failed_logins) variant="stat-card--error" />
            </Flex>

            <div class="chart-grid">
                {chart_canvas(ChartId::EventTypes, "Events by Type")}
                {chart_canvas(ChartId::Severity, "Events by Severity")}
                {chart_canvas(ChartId::Timeline, "Events Timeline")}
            </div>

            <div class="panel-grid">
                {dashboard_panel(
                    "Recent Logins",
                    &["Time", "User", "Host", "Status"],
                    move || panel_rows(state.logins.get(), 4, login_row),
                )}
                {dashboard_panel(
                    "Active Hosts",
                    &["Hostname", "Events", "High"],
                    move || panel_rows(state.hosts.get(), 3, host_row),
                )}
                {dashboard_panel(
                    "Top Users",
                    &["User", "Events", "Event Types"],
                    move || panel_rows(state.users.get(), 3, user_row),
                )}
                {dashboard_panel(
                    "Top Processes",
                    &["Process", "Events"],
                    move || panel_rows(state.processes.get(), 2, process_row),
                )}
                {dashboard_panel(
                    "Active Agents",
                    &["Agent", "Hostname", "Last Activity", "Events"],
                    move || panel_rows(state.agents.get(), 4, agent_row),
                )}
            </div>
        </div>
    }
    .into_any()
}

use contracts::domain::a001_security_event::SecurityEvent;
use leptos::prelude::*;
use thaw::*;

use crate::shared::date_utils::format_timestamp;
use crate::shared::list_utils::SeverityBadge;

fn or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or("N/A")
        .to_string()
}

/// Label/value pairs of the detail modal, left column then right column.
pub fn detail_fields(event: &SecurityEvent) -> (Vec<(&'static str, String)>, Vec<(&'static str, String)>) {
    let left = vec![
        ("Timestamp", format_timestamp(event.timestamp.as_deref())),
        ("Event Type", or_na(&event.event_type)),
        ("Source", or_na(&event.source)),
        ("Agent ID", or_na(&event.agent_id)),
    ];
    let right = vec![
        ("Hostname", or_na(&event.hostname)),
        ("User", or_na(&event.user)),
        ("Process", or_na(&event.process)),
        ("Command", or_na(&event.command)),
    ];
    (left, right)
}

fn field_list(fields: Vec<(&'static str, String)>) -> impl IntoView {
    fields
        .into_iter()
        .map(|(label, value)| {
            view! {
                <div class="detail-item">
                    <span class="detail-label">{label}":"</span>
                    " "{value}
                </div>
            }
        })
        .collect_view()
}

/// Full record of one event, shown over the table.
#[component]
pub fn EventDetails(event: SecurityEvent, on_close: Callback<()>) -> impl IntoView {
    let (left, right) = detail_fields(&event);
    let severity = event.severity_level();
    let raw_log = event
        .raw_log
        .clone()
        .filter(|log| !log.is_empty())
        .unwrap_or_else(|| "No raw log available".to_string());

    view! {
        <div class="modal-backdrop" on:click=move |_| on_close.run(())>
            <div class="modal-window" on:click=|ev| ev.stop_propagation()>
                <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center>
                    <h3>"Event Details"</h3>
                    <Button appearance=ButtonAppearance::Subtle on_click=move |_| on_close.run(())>
                        "Close"
                    </Button>
                </Flex>
                <div class="row">
                    <div class="col">
                        <div class="detail-item">
                            <span class="detail-label">"Severity:"</span>
                            " "<SeverityBadge severity=severity />
                        </div>
                        {field_list(left)}
                    </div>
                    <div class="col">{field_list(right)}</div>
                </div>
                <div class="raw-log">
                    <strong>"Raw Log"</strong>
                    <pre style="white-space: pre-wrap; max-height: 300px; overflow-y: auto;">{raw_log}</pre>
                </div>
            </div>
        </div>
    }
}

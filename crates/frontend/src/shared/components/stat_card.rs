use leptos::prelude::*;

/// `12345` -> `12,345`
fn format_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[component]
pub fn StatCard(
    /// Label displayed above the value
    label: &'static str,
    /// Counter; `None` until the first data arrives and shown as 0
    #[prop(into)]
    value: Signal<Option<u64>>,
    /// Modifier class, e.g. `stat-card--error`
    #[prop(optional)]
    variant: &'static str,
) -> impl IntoView {
    let class = format!("stat-card {}", variant);
    let formatted = move || format_thousands(value.get().unwrap_or(0));

    view! {
        <div class=class>
            <div class="stat-card__content">
                <div class="stat-card__label">{label}</div>
                <div class="stat-card__value">{formatted}</div>
            </div>
        </div>
    }
}

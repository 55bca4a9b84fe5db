//! Chart.js binding (the library is loaded by the page as a global `Chart`).

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_json::{json, Value};
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use super::{ChartBackend, ChartData, ChartId};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Chart)]
    pub type ChartJs;

    #[wasm_bindgen(constructor, catch, js_class = "Chart")]
    fn new(canvas: &HtmlCanvasElement, config: &JsValue) -> Result<ChartJs, JsValue>;

    #[wasm_bindgen(method, getter)]
    fn data(this: &ChartJs) -> JsValue;

    #[wasm_bindgen(method)]
    fn update(this: &ChartJs, mode: &str);

    #[wasm_bindgen(method)]
    fn destroy(this: &ChartJs);
}

const TYPE_COLORS: [&str; 10] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#8AC926", "#1982C4",
    "#6A4C93", "#FF595E",
];

pub fn severity_color(label: &str) -> &'static str {
    match label.to_lowercase().as_str() {
        "critical" => "#FF0000",
        "high" => "#FF6384",
        "medium" => "#FF9F40",
        "low" => "#36A2EB",
        _ => "#C9CBCF",
    }
}

fn dataset(id: ChartId, data: &ChartData) -> Value {
    match id {
        ChartId::EventTypes => json!({
            "label": "Number of Events",
            "data": data.values,
            "fullLabels": data.full_labels,
            "backgroundColor": TYPE_COLORS,
            "borderColor": TYPE_COLORS,
            "borderWidth": 1
        }),
        ChartId::Severity => json!({
            "data": data.values,
            "fullLabels": data.full_labels,
            "backgroundColor": data.labels.iter().map(|l| severity_color(l)).collect::<Vec<_>>(),
            "borderWidth": 1
        }),
        ChartId::Timeline => json!({
            "label": "Events per hour",
            "data": data.values,
            "fullLabels": data.full_labels,
            "backgroundColor": "rgba(54, 162, 235, 0.2)",
            "borderColor": "rgba(54, 162, 235, 1)",
            "borderWidth": 2,
            "fill": true,
            "tension": 0.4,
            "pointBackgroundColor": "#4361ee",
            "pointBorderColor": "#ffffff",
            "pointBorderWidth": 2,
            "pointRadius": 4,
            "pointHoverRadius": 6
        }),
    }
}

fn chart_config(id: ChartId, data: &ChartData) -> Value {
    let (kind, options) = match id {
        ChartId::EventTypes => (
            "bar",
            json!({
                "responsive": true,
                "plugins": { "legend": { "display": false }, "tooltip": { "callbacks": {} } },
                "scales": { "y": { "beginAtZero": true, "ticks": { "precision": 0 } } }
            }),
        ),
        ChartId::Severity => (
            "doughnut",
            json!({
                "responsive": true,
                "plugins": { "legend": { "position": "bottom" }, "tooltip": { "callbacks": {} } }
            }),
        ),
        ChartId::Timeline => (
            "line",
            json!({
                "responsive": true,
                "maintainAspectRatio": true,
                "aspectRatio": 3,
                "plugins": {
                    "legend": { "position": "top" },
                    "tooltip": { "mode": "index", "intersect": false, "callbacks": {} }
                },
                "scales": {
                    "y": {
                        "beginAtZero": true,
                        "title": { "display": true, "text": "Number of Events" },
                        "ticks": { "precision": 0 },
                        "grid": { "color": "rgba(0,0,0,0.05)" }
                    },
                    "x": {
                        "title": { "display": true, "text": "Time (hours)" },
                        "grid": { "color": "rgba(0,0,0,0.05)" }
                    }
                }
            }),
        ),
    };

    json!({
        "type": kind,
        "data": { "labels": data.labels, "datasets": [dataset(id, data)] },
        "options": options
    })
}

fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Tooltip title showing the untruncated label of the hovered point.
fn full_label_title() -> Function {
    Function::new_with_args(
        "items",
        "const item = items[0];\
         if (!item) { return ''; }\
         const full = item.dataset.fullLabels;\
         return (full && full[item.dataIndex]) || item.label;",
    )
}

fn find_canvas(id: ChartId) -> Option<HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id.canvas_id())?
        .dyn_into::<HtmlCanvasElement>()
        .ok()
}

fn build(id: ChartId, canvas: &HtmlCanvasElement, data: &ChartData) -> Result<ChartJs, JsValue> {
    let config = to_js(&chart_config(id, data))?;

    let options = Reflect::get(&config, &"options".into())?;
    let plugins = Reflect::get(&options, &"plugins".into())?;
    let tooltip = Reflect::get(&plugins, &"tooltip".into())?;
    let callbacks = Reflect::get(&tooltip, &"callbacks".into())?;
    Reflect::set(&callbacks, &"title".into(), &full_label_title())?;

    ChartJs::new(canvas, &config)
}

fn apply(id: ChartId, chart: &ChartJs, data: &ChartData) -> Result<(), JsValue> {
    let chart_data = chart.data();
    Reflect::set(&chart_data, &"labels".into(), &to_js(&json!(data.labels))?)?;

    let datasets: Array = Reflect::get(&chart_data, &"datasets".into())?.dyn_into()?;
    let first = datasets.get(0);
    Reflect::set(&first, &"data".into(), &to_js(&json!(data.values))?)?;
    Reflect::set(&first, &"fullLabels".into(), &to_js(&json!(data.full_labels))?)?;
    if id == ChartId::Severity {
        let colors: Vec<&str> = data.labels.iter().map(|l| severity_color(l)).collect();
        Reflect::set(&first, &"backgroundColor".into(), &to_js(&json!(colors))?)?;
    }

    chart.update("none");
    Ok(())
}

/// Draws into the canvases of the mounted dashboard.
#[derive(Debug, Default)]
pub struct ChartJsBackend;

impl ChartBackend for ChartJsBackend {
    type Handle = (ChartId, ChartJs);

    fn create(&mut self, id: ChartId, data: &ChartData) -> Option<Self::Handle> {
        let canvas = find_canvas(id)?;
        match build(id, &canvas, data) {
            Ok(chart) => Some((id, chart)),
            Err(e) => {
                log::error!("Failed to create chart {:?}: {:?}", id, e);
                None
            }
        }
    }

    fn update(&mut self, handle: &Self::Handle, data: &ChartData) {
        let (id, chart) = handle;
        if let Err(e) = apply(*id, chart, data) {
            log::error!("Failed to update chart {:?}: {:?}", id, e);
        }
    }

    fn destroy(&mut self, handle: Self::Handle) {
        handle.1.destroy();
    }
}

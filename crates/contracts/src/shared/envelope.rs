use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a field, turning a malformed value into `None` instead of failing
/// the whole envelope.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

/// Outcome flag reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// Standard response wrapper.
///
/// Dashboard aggregates additionally carry `labels`, `count` and
/// `total_count_24h`; list endpoints carry `pagination`. Every field is
/// optional and decoded leniently: a malformed field reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<EnvelopeStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub total_count_24h: Option<u64>,
}

impl Envelope {
    /// Build an envelope from an already parsed body.
    ///
    /// Returns `None` when the body is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(EnvelopeStatus::Success)
    }

    /// `true` only when the server explicitly reported `status: "error"`.
    /// An absent payload is not an error.
    pub fn is_error(&self) -> bool {
        self.status == Some(EnvelopeStatus::Error)
    }

    pub fn error_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    /// `data` is present and not `null`.
    pub fn has_data(&self) -> bool {
        matches!(&self.data, Some(v) if !v.is_null())
    }

    /// Decode `data` as a list of records. Elements that do not decode are
    /// skipped; a non-array `data` yields `None`.
    pub fn records<T: DeserializeOwned>(&self) -> Option<Vec<T>> {
        let items = self.data.as_ref()?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
        )
    }

    /// Decode `data` as a single record.
    pub fn record<T: DeserializeOwned>(&self) -> Option<T> {
        let data = self.data.as_ref()?;
        if !data.is_object() {
            return None;
        }
        serde_json::from_value(data.clone()).ok()
    }

    /// Numeric `data` of an aggregate endpoint. Non-numeric entries read as 0.
    pub fn values(&self) -> Option<Vec<f64>> {
        let items = self.data.as_ref()?.as_array()?;
        Some(items.iter().map(|v| v.as_f64().unwrap_or(0.0)).collect())
    }

    /// Labels and values of an aggregate endpoint, if both are well formed.
    pub fn series(&self) -> Option<Series> {
        Some(Series {
            labels: self.labels.clone()?,
            values: self.values()?,
        })
    }
}

/// Parallel label/value arrays of a dashboard aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.values.is_empty()
    }

    /// Value recorded for `label`; when the label is missing the value at
    /// `fallback_index` is used. Out of range reads as 0.
    pub fn value_of(&self, label: &str, fallback_index: usize) -> f64 {
        let index = self
            .labels
            .iter()
            .position(|l| l == label)
            .unwrap_or(fallback_index);
        self.values.get(index).copied().unwrap_or(0.0)
    }
}

fn first_page() -> u32 {
    1
}

/// Paging block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

impl Pagination {
    /// Clamp `page` into `1..=max(pages, 1)`.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.clamp(1, self.pages.max(1)),
            ..self
        }
    }

    /// 1-based inclusive range of the rows on the current page, or `None`
    /// when there is nothing to show.
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.total == 0 || self.limit == 0 {
            return None;
        }
        let page = u64::from(self.page.max(1));
        let limit = u64::from(self.limit);
        let start = (page - 1) * limit + 1;
        let end = (page * limit).min(self.total);
        if start > end {
            return None;
        }
        Some((start, end))
    }
}

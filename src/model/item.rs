use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Backend identifier for projects, containers and leaf items
pub type EntityId = u64;

/// A task (under a phase) or story (under a sprint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafItem {
    pub id: EntityId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    /// Planned effort. Missing, null or non-numeric values load as 0.
    #[serde(default, deserialize_with = "lenient_hours")]
    pub budget_hours: f64,
}

impl LeafItem {
    pub fn new(id: EntityId, name: impl Into<String>, budget_hours: f64) -> Self {
        LeafItem {
            id,
            name: name.into(),
            start_date: None,
            end_date: None,
            budget_hours,
        }
    }
}

/// Coerce a JSON value into an hour count. Anything that is not a finite
/// number (or a string holding one) counts as 0.
pub fn hours_from_value(value: &Value) -> f64 {
    let hours = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    hours.filter(|h| h.is_finite()).unwrap_or(0.0)
}

pub(crate) fn lenient_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(hours_from_value).unwrap_or(0.0))
}

/// Accepts `null`, `""`, `YYYY-MM-DD` or an RFC 3339 timestamp (date part
/// kept). Unparseable strings load as `None`.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

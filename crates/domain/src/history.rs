use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// History event key Holmes writes when a user takes an action on a task.
pub const COMPLETION_EVENT_KEY: &str = "history.take_action";

/// One immutable entry of a process's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Event type, for example `task.created` or `history.take_action`.
    #[serde(default)]
    pub key: String,
    /// Creation timestamp exactly as Holmes returned it.
    #[serde(default)]
    pub created_at: String,
    /// Event properties.
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: HistoryEventProperties,
    /// Remaining untyped fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEvent {
    /// Returns the referenced task id, ignoring blank values.
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        self.properties
            .task_id
            .as_deref()
            .filter(|task_id| !task_id.trim().is_empty())
    }

    /// Returns whether this event marks an action taken on a task.
    #[must_use]
    pub fn is_completion(&self) -> bool {
        self.key == COMPLETION_EVENT_KEY
    }
}

/// Properties attached to a history event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEventProperties {
    /// Task the event refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Task name at the time of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    /// Deep link to the task in the Holmes UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_link: Option<String>,
    /// Remaining untyped properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of history returned by Holmes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Events in the order Holmes returned them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub histories: Vec<HistoryEvent>,
    /// Remaining untyped fields (totals, paging metadata).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sort clause of a history query, encoded on the wire as `[field, direction]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct HistorySort {
    /// Sorted field.
    pub field: String,
    /// `asc` or `desc`.
    pub direction: String,
}

impl Default for HistorySort {
    fn default() -> Self {
        Self {
            field: "created_at".to_owned(),
            direction: "asc".to_owned(),
        }
    }
}

impl From<(String, String)> for HistorySort {
    fn from((field, direction): (String, String)) -> Self {
        Self { field, direction }
    }
}

impl From<HistorySort> for (String, String) {
    fn from(value: HistorySort) -> Self {
        (value.field, value.direction)
    }
}

/// Body of `POST /processes/{id}/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Holmes filter clauses.
    #[serde(default)]
    pub filters: Vec<Value>,
    /// One-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Sort clause.
    #[serde(default, rename = "sortBy")]
    pub sort_by: HistorySort,
    /// Any extra fields a caller forwards verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryQuery {
    /// First page, oldest events first.
    #[must_use]
    pub fn first_page(per_page: u32) -> Self {
        Self {
            filters: Vec::new(),
            page: 1,
            per_page: per_page.max(1),
            sort_by: HistorySort::default(),
            extra: Map::new(),
        }
    }

    /// Same query targeting another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Deterministic JSON encoding used for cache keys.
    #[must_use]
    pub fn canonical_json(&self) -> String {
        serde_json::to_value(self)
            .map(|value| canonical_json(&value))
            .unwrap_or_default()
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self::first_page(default_per_page())
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    100
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Encodes JSON with object keys sorted at every depth.
///
/// Logically identical payloads always produce the same string, whatever
/// order their fields were built or received in.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut encoded = String::new();
    write_canonical(value, &mut encoded);
    encoded
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<(&String, &Value)> = object.iter().collect();
            entries.sort_by(|left, right| left.0.cmp(right.0));

            out.push('{');
            for (index, (key, nested)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(nested, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, nested) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(nested, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Orders two Holmes timestamps.
///
/// RFC 3339 timestamps, naive date-times and plain dates are compared as
/// instants. Unparseable values sort before every parseable one and among
/// themselves by raw string; equal instants fall back to the raw string too,
/// so the result is a total order.
#[must_use]
pub fn compare_timestamps(left: &str, right: &str) -> Ordering {
    (parse_timestamp(left), left).cmp(&(parse_timestamp(right), right))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use serde_json::json;

    use super::{HistoryEvent, HistoryPage, HistoryQuery, canonical_json, compare_timestamps};

    #[test]
    fn history_query_encodes_holmes_wire_shape() {
        let encoded = serde_json::to_value(HistoryQuery::first_page(100)).ok();
        assert_eq!(
            encoded,
            Some(json!({
                "filters": [],
                "page": 1,
                "per_page": 100,
                "sortBy": ["created_at", "asc"]
            }))
        );
    }

    #[test]
    fn canonical_json_ignores_field_order_of_the_source() {
        let first: Option<HistoryQuery> =
            serde_json::from_str(r#"{"page":2,"per_page":10,"custom":{"b":1,"a":2}}"#).ok();
        let second: Option<HistoryQuery> =
            serde_json::from_str(r#"{"custom":{"a":2,"b":1},"per_page":10,"page":2}"#).ok();

        let (Some(first), Some(second)) = (first, second) else {
            panic!("queries should deserialize");
        };
        assert_eq!(first.canonical_json(), second.canonical_json());
        assert_ne!(
            first.canonical_json(),
            first.with_page(3).canonical_json()
        );
    }

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let encoded = canonical_json(&json!({"z": [{"b": 1, "a": null}], "a": "x"}));
        assert_eq!(encoded, r#"{"a":"x","z":[{"a":null,"b":1}]}"#);
    }

    #[test]
    fn null_properties_and_histories_default_to_empty() {
        let page: Option<HistoryPage> = serde_json::from_value(json!({
            "histories": [{"key": "process.started", "created_at": "2024-01-01", "properties": null}]
        }))
        .ok();
        let events = page.map(|page| page.histories).unwrap_or_default();
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().and_then(HistoryEvent::task_id), None);

        let empty: Option<HistoryPage> = serde_json::from_value(json!({"histories": null})).ok();
        assert_eq!(empty.map(|page| page.histories.len()), Some(0));
    }

    #[test]
    fn timestamps_compare_as_instants_when_parseable() {
        assert_eq!(
            compare_timestamps("2024-01-03", "2024-01-02T23:00:00Z"),
            Ordering::Greater
        );
        assert_eq!(
            compare_timestamps("2024-01-01T10:00:00+02:00", "2024-01-01T08:30:00Z"),
            Ordering::Less
        );
        assert_eq!(compare_timestamps("b", "a"), Ordering::Greater);
    }

    #[test]
    fn mixed_timestamps_form_a_consistent_order() {
        let utc_midnight = "2024-01-02";
        let new_york_evening = "2024-01-01T23:00:00-05:00";
        let unparsed = "2024-01-01Tbad";

        assert_eq!(compare_timestamps(utc_midnight, new_york_evening), Ordering::Less);
        assert_eq!(compare_timestamps(unparsed, utc_midnight), Ordering::Less);
        assert_eq!(compare_timestamps(unparsed, new_york_evening), Ordering::Less);
        assert_eq!(compare_timestamps("zzz", "2024-01-01"), Ordering::Less);
        assert_eq!(
            compare_timestamps("2024-01-01T00:00:00Z", "2024-01-01"),
            Ordering::Greater
        );
    }
}

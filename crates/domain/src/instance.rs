use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Dropdown entry built from an entity instance search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceOption {
    /// Holmes instance id.
    pub id: String,
    /// Value of the instance's first property.
    pub name: String,
}

impl InstanceOption {
    /// Maps `docs[]` of a search response to dropdown entries.
    ///
    /// Documents without an instance id or without a non-empty first property
    /// value are skipped.
    #[must_use]
    pub fn from_search_response(response: &Value) -> Vec<Self> {
        let Some(docs) = response.get("docs").and_then(Value::as_array) else {
            return Vec::new();
        };

        docs.iter()
            .filter_map(|doc| {
                let id = doc.get("instance_id").and_then(Value::as_str)?;
                let name = doc
                    .get("props")
                    .and_then(Value::as_array)
                    .and_then(|props| props.first())
                    .and_then(|prop| prop.get("value"))
                    .and_then(Value::as_str)
                    .filter(|value| !value.is_empty())?;
                Some(Self {
                    id: id.to_owned(),
                    name: name.to_owned(),
                })
            })
            .collect()
    }
}

/// Builds the search body listing every instance of `entity_id`.
#[must_use]
pub fn instance_search_query(entity_id: &str, sort_field: &str) -> Value {
    json!({
        "query": {
            "from": 0,
            "size": 200,
            "order": "asc",
            "groups": [{
                "match_all": true,
                "terms": [{
                    "field": "entity_id",
                    "type": "is",
                    "value": entity_id
                }]
            }],
            "sort": sort_field
        }
    })
}

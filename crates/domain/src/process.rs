use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Workflow instance as reported by Holmes.
///
/// Only the fields this layer reasons about are typed; everything else is kept
/// in `extra` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// Holmes process id.
    #[serde(default)]
    pub id: String,
    /// Workflow name shared by every instance of the workflow.
    #[serde(default)]
    pub name: String,
    /// Human readable instance identifier.
    #[serde(default)]
    pub identifier: String,
    /// Holmes status (`opened`, `closed`, `canceled`, ...).
    #[serde(default)]
    pub status: String,
    /// Remaining untyped fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Process {
    /// Returns whether Holmes reports the process as cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "canceled" | "cancelled"
        )
    }

    /// Label shown in lists: the identifier when present, else the name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.identifier.trim().is_empty() {
            self.name.as_str()
        } else {
            self.identifier.as_str()
        }
    }

    /// One-line description combining workflow name and status.
    #[must_use]
    pub fn description(&self) -> String {
        match (self.name.trim().is_empty(), self.status.trim().is_empty()) {
            (false, false) => format!("{} ({})", self.name, self.status),
            (false, true) => self.name.clone(),
            (true, false) => self.status.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Template payload returned by the troubleshooting endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ProcessTemplate {
    /// Holmes returned BPMN XML.
    Xml(String),
    /// Holmes returned raw process data without a template.
    Raw(Value),
}

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use easyholmes_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::history::{HistoryEvent, compare_timestamps, null_as_default};

/// Progress derived from a process's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskProgress {
    /// No action has been taken on the task yet.
    InProgress,
    /// At least one action event references the task.
    Completed,
}

impl TaskProgress {
    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

/// Task status accepted by status filters and status updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Waiting to be picked up.
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl TaskStatus {
    /// All accepted values, in documentation order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether an aggregated task with `progress` passes this filter.
    ///
    /// History only ever yields `in-progress` and `completed`, so `pending` and
    /// `cancelled` filters select nothing.
    #[must_use]
    pub fn matches(self, progress: TaskProgress) -> bool {
        self.as_str() == progress.as_str()
    }
}

impl Display for TaskStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid status '{value}', expected one of: pending, in-progress, completed, cancelled"
                ))
            })
    }
}

/// Task reconstructed from a process's history events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedTask {
    /// Holmes task id.
    pub task_id: String,
    /// Task name from the discovering event.
    pub task_name: String,
    /// Owning process id.
    pub process_id: String,
    /// Owning workflow name.
    pub process_name: String,
    /// Owning process identifier.
    pub process_identifier: String,
    /// Timestamp of the first event that referenced the task.
    pub created_at: String,
    /// Derived progress.
    pub status: TaskProgress,
    /// Latest completion timestamp.
    pub completion_date: Option<String>,
    /// Due date attached during enrichment.
    pub due_date: Option<String>,
    /// Deep link to the task in the Holmes UI.
    pub long_link: Option<String>,
}

impl AggregatedTask {
    /// Materializes an in-progress task from the first event referencing it.
    ///
    /// Returns `None` when the event carries no task id.
    #[must_use]
    pub fn discovered(
        event: &HistoryEvent,
        process_id: &str,
        process_name: &str,
        process_identifier: &str,
    ) -> Option<Self> {
        let task_id = event.task_id()?;
        Some(Self {
            task_id: task_id.to_owned(),
            task_name: event.properties.task_name.clone().unwrap_or_default(),
            process_id: process_id.to_owned(),
            process_name: process_name.to_owned(),
            process_identifier: process_identifier.to_owned(),
            created_at: event.created_at.clone(),
            status: TaskProgress::InProgress,
            completion_date: None,
            due_date: None,
            long_link: event.properties.long_link.clone(),
        })
    }

    /// Marks the task completed at `completed_at` unless a later completion
    /// was already recorded.
    pub fn record_completion(&mut self, completed_at: &str) {
        let is_newer = self.completion_date.as_deref().is_none_or(|current| {
            compare_timestamps(completed_at, current) == Ordering::Greater
        });

        if is_newer {
            self.status = TaskProgress::Completed;
            self.completion_date = Some(completed_at.to_owned());
        }
    }

    /// Returns whether an action was taken on the task.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskProgress::Completed
    }
}

/// Task detail returned by `GET /tasks/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDetails {
    /// Holmes task id.
    #[serde(default)]
    pub id: String,
    /// Task name.
    #[serde(default)]
    pub name: String,
    /// Due date, if Holmes has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Form properties the task asks for.
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Vec<TaskProperty>,
    /// Actions available on the task.
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<TaskAction>,
    /// Remaining untyped fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskDetails {
    /// Returns the due date when it is present and non-blank.
    #[must_use]
    pub fn due_date(&self) -> Option<&str> {
        self.due_date
            .as_deref()
            .filter(|due_date| !due_date.trim().is_empty())
    }
}

/// Form property of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskProperty {
    /// Property id.
    #[serde(default)]
    pub id: String,
    /// Label.
    #[serde(default)]
    pub name: String,
    /// Entity id of the option catalogue backing this property, if any.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    /// Whether a value must be supplied to act on the task.
    #[serde(default)]
    pub required: bool,
    /// Remaining untyped fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Action that can be taken on a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskAction {
    /// Action id.
    #[serde(default)]
    pub id: String,
    /// Label.
    #[serde(default)]
    pub name: String,
    /// Remaining untyped fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for `POST /tasks/{id}/action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskActionInput {
    /// Action to execute.
    pub action_id: String,
    /// Property values submitted with the action.
    #[serde(default)]
    pub property_values: Vec<Value>,
    /// Whether Holmes should ask for confirmation.
    #[serde(default)]
    pub confirm_action: bool,
}

impl TaskActionInput {
    /// Creates an unconfirmed action input.
    #[must_use]
    pub fn new(action_id: impl Into<String>, property_values: Vec<Value>) -> Self {
        Self {
            action_id: action_id.into(),
            property_values,
            confirm_action: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::{AggregatedTask, TaskDetails, TaskProgress, TaskStatus};
    use crate::HistoryEvent;

    fn event(value: serde_json::Value) -> HistoryEvent {
        match serde_json::from_value(value) {
            Ok(event) => event,
            Err(error) => panic!("event should deserialize: {error}"),
        }
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!(
            "in-progress".parse::<TaskStatus>().ok(),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(
            "cancelled".parse::<TaskStatus>().ok(),
            Some(TaskStatus::Cancelled)
        );
        assert!("done".parse::<TaskStatus>().is_err());
        assert!("In-Progress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_filter_compares_against_derived_progress() {
        assert!(TaskStatus::Completed.matches(TaskProgress::Completed));
        assert!(TaskStatus::InProgress.matches(TaskProgress::InProgress));
        assert!(!TaskStatus::Pending.matches(TaskProgress::InProgress));
        assert!(!TaskStatus::Cancelled.matches(TaskProgress::Completed));
    }

    #[test]
    fn discovery_requires_a_task_id() {
        let without_task = event(json!({"key": "process.started", "created_at": "2024-01-01"}));
        assert!(AggregatedTask::discovered(&without_task, "p", "n", "i").is_none());

        let with_task = event(json!({
            "key": "task.created",
            "created_at": "2024-01-01",
            "properties": {"task_id": "T1", "task_name": "Review", "long_link": "https://x/T1"}
        }));
        let task = AggregatedTask::discovered(&with_task, "P", "Auditoria BIM", "AB-1");
        assert_eq!(task.as_ref().map(|task| task.task_name.as_str()), Some("Review"));
        assert_eq!(
            task.as_ref().map(|task| task.status),
            Some(TaskProgress::InProgress)
        );
    }

    #[test]
    fn later_completion_wins_regardless_of_order() {
        let created = event(json!({
            "key": "task.created",
            "created_at": "1",
            "properties": {"task_id": "A"}
        }));
        let Some(mut task) = AggregatedTask::discovered(&created, "P", "", "") else {
            panic!("task should be discovered");
        };

        task.record_completion("5");
        task.record_completion("3");

        assert!(task.is_completed());
        assert_eq!(task.completion_date.as_deref(), Some("5"));
    }

    #[test]
    fn task_details_tolerate_null_collections() {
        let details: Option<TaskDetails> = serde_json::from_value(json!({
            "id": "T1",
            "due_date": "",
            "properties": null,
            "actions": [{"id": "approve", "name": "Approve"}]
        }))
        .ok();

        let Some(details) = details else {
            panic!("details should deserialize");
        };
        assert!(details.properties.is_empty());
        assert_eq!(details.actions.len(), 1);
        assert_eq!(details.due_date(), None);
    }

    proptest! {
        #[test]
        fn completion_date_is_the_latest_of_any_replay_order(
            days in proptest::collection::vec(1_u32..=28, 1..12)
        ) {
            let created = event(json!({
                "key": "task.created",
                "created_at": "2024-01-01",
                "properties": {"task_id": "A"}
            }));
            let mut task = AggregatedTask::discovered(&created, "P", "", "")
                .ok_or_else(|| TestCaseError::fail("task should be discovered"))?;

            for day in &days {
                task.record_completion(&format!("2024-02-{day:02}"));
            }

            let latest = days.iter().max().copied().unwrap_or_default();
            prop_assert!(task.is_completed());
            prop_assert_eq!(task.completion_date, Some(format!("2024-02-{latest:02}")));
        }
    }
}

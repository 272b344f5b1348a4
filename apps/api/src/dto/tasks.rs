use easyholmes_application::{CompleteTaskInput, TaskPage, TaskQuery};
use easyholmes_core::AppResult;
use easyholmes_domain::{AggregatedTask, TaskStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Aggregated task as the frontend renders it.
///
/// Carries both the list-view fields (`id`, `name`, `processId`) and the raw
/// aggregation fields (`task_id`, `task_name`) the task views read.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/task-response.ts"
)]
pub struct TaskResponse {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "processId")]
    pub process_id: String,
    #[serde(rename = "processName")]
    pub process_name: String,
    #[serde(rename = "processIdentifier")]
    pub process_identifier: String,
    pub created_at: String,
    pub due_date: Option<String>,
    pub completion_date: Option<String>,
    pub is_completed: bool,
    pub long_link: Option<String>,
    pub task_id: String,
    pub task_name: String,
}

impl From<AggregatedTask> for TaskResponse {
    fn from(task: AggregatedTask) -> Self {
        Self {
            is_completed: task.is_completed(),
            id: task.task_id.clone(),
            name: task.task_name.clone(),
            status: task.status.as_str().to_owned(),
            process_id: task.process_id,
            process_name: task.process_name,
            process_identifier: task.process_identifier,
            created_at: task.created_at,
            due_date: task.due_date,
            completion_date: task.completion_date,
            long_link: task.long_link,
            task_id: task.task_id,
            task_name: task.task_name,
        }
    }
}

/// One page of aggregated tasks.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/task-page-response.ts"
)]
pub struct TaskPageResponse {
    pub tasks: Vec<TaskResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    /// Status filter echoed by `GET /api/tasks/status/{status}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<String>,
}

impl TaskPageResponse {
    /// Echoes the status the page was filtered by.
    pub fn for_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status.as_str().to_owned());
        self
    }
}

impl From<TaskPage> for TaskPageResponse {
    fn from(page: TaskPage) -> Self {
        Self {
            tasks: page.tasks.into_iter().map(TaskResponse::from).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            status: None,
        }
    }
}

/// Query string accepted by `GET /api/tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    #[serde(default, rename = "processId", alias = "process_id")]
    pub process_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl TaskListQuery {
    /// Validates the filter and fills paging defaults.
    pub fn into_task_query(self) -> AppResult<TaskQuery> {
        let defaults = TaskQuery::default();
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .map(str::parse::<TaskStatus>)
            .transpose()?;

        Ok(TaskQuery {
            process_id: self
                .process_id
                .map(|process_id| process_id.trim().to_owned())
                .filter(|process_id| !process_id.is_empty()),
            status,
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
        })
    }
}

/// Incoming payload for `PATCH /api/tasks/{id}/status`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-task-status-request.ts"
)]
pub struct UpdateTaskStatusRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "processId", alias = "process_id")]
    #[ts(optional)]
    pub process_id: Option<String>,
}

/// Incoming payload for `POST /api/tasks/{id}/complete`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/complete-task-request.ts"
)]
pub struct CompleteTaskRequest {
    #[serde(default, rename = "propertyValues", alias = "property_values")]
    #[ts(type = "Array<unknown>")]
    pub property_values: Vec<Value>,
    #[serde(default, rename = "actionId", alias = "action_id")]
    #[ts(optional)]
    pub action_id: Option<String>,
    #[serde(default, rename = "processId", alias = "process_id")]
    #[ts(optional)]
    pub process_id: Option<String>,
}

impl From<CompleteTaskRequest> for CompleteTaskInput {
    fn from(request: CompleteTaskRequest) -> Self {
        Self {
            process_id: request.process_id,
            action_id: request.action_id,
            property_values: request.property_values,
        }
    }
}

use async_trait::async_trait;
use serde_json::Value;

use easyholmes_core::AppResult;
use easyholmes_domain::{
    HistoryPage, HistoryQuery, Process, ProcessTemplate, TaskActionInput, TaskDetails, TaskStatus,
};

/// Remote Holmes API.
///
/// Implementations normalize every response into the typed result right after
/// the call and map failures to `AppError::Upstream` (or `AppError::Forbidden`
/// when Holmes rejects a task action for the caller).
#[async_trait]
pub trait HolmesGateway: Send + Sync {
    /// `GET /processes/`.
    async fn list_processes(&self) -> AppResult<Vec<Process>>;

    /// `GET /processes/{id}`.
    async fn get_process(&self, process_id: &str) -> AppResult<Process>;

    /// `POST /processes/{id}/history`.
    async fn process_history(
        &self,
        process_id: &str,
        query: &HistoryQuery,
    ) -> AppResult<HistoryPage>;

    /// `GET /tasks/{id}`.
    async fn task_details(&self, task_id: &str) -> AppResult<TaskDetails>;

    /// `GET /admin/processes/{id}/troubleshooting/template`.
    async fn process_template(&self, process_id: &str) -> AppResult<ProcessTemplate>;

    /// `POST /entities/{id}/instances/search`.
    async fn search_instances(&self, entity_id: &str, query: &Value) -> AppResult<Value>;

    /// `PATCH /tasks/{id}`.
    async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> AppResult<Value>;

    /// `POST /tasks/{id}/action`.
    async fn execute_task_action(
        &self,
        task_id: &str,
        action: &TaskActionInput,
    ) -> AppResult<Value>;

    /// `POST /workflows/{id}/start`.
    async fn start_workflow(&self, workflow_id: &str, payload: &Value) -> AppResult<Value>;
}

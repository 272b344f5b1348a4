use serde_json::json;
use tracing::info;

use easyholmes_core::{AppError, AppResult, NonEmptyString};
use easyholmes_domain::{TaskActionInput, TaskStatus};

use crate::response_cache::{CacheCategory, CacheScope};

use super::*;

impl HolmesService {
    /// Updates a task's status in Holmes.
    pub async fn update_task_status(
        &self,
        task_id: &str,
        process_id: Option<&str>,
        status: TaskStatus,
    ) -> AppResult<Value> {
        let result = self.gateway.update_task_status(task_id, status).await?;
        self.invalidate_after_task_mutation(task_id, process_id, "status update")
            .await;
        Ok(result)
    }

    /// Executes an action on a task.
    pub async fn execute_task_action(
        &self,
        task_id: &str,
        process_id: Option<&str>,
        action: &TaskActionInput,
    ) -> AppResult<Value> {
        let result = self.gateway.execute_task_action(task_id, action).await?;
        self.invalidate_after_task_mutation(task_id, process_id, "action")
            .await;
        Ok(result)
    }

    /// Completes a task with the given action, or with its first available
    /// action when none is given.
    pub async fn complete_task(&self, task_id: &str, input: CompleteTaskInput) -> AppResult<Value> {
        let action_id = match input.action_id.filter(|id| !id.trim().is_empty()) {
            Some(action_id) => action_id,
            None => {
                let details = self.task_details(task_id).await?;
                details
                    .actions
                    .into_iter()
                    .map(|action| action.id)
                    .find(|id| !id.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Validation(format!("task '{task_id}' has no available actions"))
                    })?
            }
        };

        let action = TaskActionInput::new(action_id, input.property_values);
        self.execute_task_action(task_id, input.process_id.as_deref(), &action)
            .await
    }

    /// Starts a workflow with a caller-supplied payload.
    pub async fn start_workflow(&self, workflow_id: &str, payload: &Value) -> AppResult<Value> {
        let workflow_id = NonEmptyString::required("workflowId", workflow_id)?;

        let result = self
            .gateway
            .start_workflow(workflow_id.as_str(), payload)
            .await?;
        self.cache.invalidate(&CacheKey::ProcessList).await;
        Ok(result)
    }

    /// Creates a process on the configured workflow.
    pub async fn create_process(&self, input: CreateProcessInput) -> AppResult<Value> {
        let discipline = NonEmptyString::required("discipline", input.discipline)?;
        let stage = NonEmptyString::required("stage", input.stage)?;
        let instance_id = NonEmptyString::required("instance_id", input.instance_id)?;

        let payload = json!({
            "workflow": {
                "start_event": self.catalog.process_start_event,
                "property_values": [
                    {"id": self.catalog.discipline_property_id, "value": discipline.as_str()},
                    {"id": self.catalog.stage_property_id, "value": stage.as_str()},
                ],
                "instance_id": instance_id.as_str(),
                "whats": "",
                "documents": [],
                "test": false,
                "run_automations": true,
                "run_triggers": true
            }
        });

        let result = self
            .gateway
            .start_workflow(&self.catalog.process_workflow_id, &payload)
            .await?;
        self.cache.invalidate(&CacheKey::ProcessList).await;
        info!(instance_id = instance_id.as_str(), "process created");
        Ok(result)
    }

    async fn invalidate_after_task_mutation(
        &self,
        task_id: &str,
        process_id: Option<&str>,
        operation: &str,
    ) {
        self.cache.invalidate(&CacheKey::task_details(task_id)).await;

        let scope = match process_id.filter(|id| !id.trim().is_empty()) {
            Some(process_id) => CacheScope::ProcessHistory(process_id.to_owned()),
            None => CacheScope::Category(CacheCategory::ProcessHistory),
        };
        let removed = self.cache.invalidate_scope(&scope).await;
        info!(task_id, operation, removed, "history invalidated after task mutation");
    }
}

//! reqwest-backed Holmes gateway.

mod normalize;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use easyholmes_application::HolmesGateway;
use easyholmes_core::{AppError, AppResult};
use easyholmes_domain::{
    HistoryPage, HistoryQuery, Process, ProcessTemplate, TaskActionInput, TaskDetails, TaskStatus,
};

use normalize::{normalize_history_page, normalize_process_list, normalize_template};

const TASK_NOT_ASSIGNED: &str = "task_not_assigned_to_user";

/// HTTP implementation of the Holmes gateway port.
#[derive(Clone)]
pub struct HttpHolmesGateway {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpHolmesGateway {
    /// Creates a gateway that authenticates every call with `api_token`.
    pub fn new(base_url: &str, api_token: &str, timeout: Duration) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(api_token).map_err(|error| {
            AppError::Validation(format!("invalid Holmes API token header value: {error}"))
        })?;
        token.set_sensitive(true);
        headers.insert("api_token", token);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build Holmes HTTP client: {error}"))
            })?;

        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid Holmes base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "Holmes base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one so ids
    /// never add path levels or a query string.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send_text(&self, operation: &str, request: reqwest::RequestBuilder) -> AppResult<String> {
        let response = request.send().await.map_err(|error| {
            warn!(operation, error = %error, "holmes request failed");
            AppError::Upstream(format!("{operation} failed: {error}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Upstream(format!("{operation} failed reading response: {error}"))
        })?;

        if status.is_success() {
            debug!(operation, status = status.as_u16(), "holmes request succeeded");
            return Ok(body);
        }

        Err(rejection_error(operation, status, &body))
    }

    async fn send_json(&self, operation: &str, request: reqwest::RequestBuilder) -> AppResult<Value> {
        let body = self.send_text(operation, request).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|error| {
            AppError::Upstream(format!("{operation} returned invalid JSON: {error}"))
        })
    }

    async fn send_typed<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let value = self.send_json(operation, request).await?;
        serde_json::from_value(value).map_err(|error| {
            AppError::Upstream(format!("{operation} returned an unexpected shape: {error}"))
        })
    }
}

fn rejection_error(operation: &str, status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::PRECONDITION_FAILED {
        let code = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_owned));
        if code.as_deref() == Some(TASK_NOT_ASSIGNED) {
            return AppError::Forbidden(
                "this task is not assigned to the current Holmes user".to_owned(),
            );
        }
    }

    warn!(operation, status = status.as_u16(), "holmes rejected request");
    AppError::Upstream(format!("{operation} failed: Holmes returned {status}"))
}

#[async_trait]
impl HolmesGateway for HttpHolmesGateway {
    async fn list_processes(&self) -> AppResult<Vec<Process>> {
        let operation = "list processes";
        let value = self
            .send_json(operation, self.http_client.get(self.url(&["processes", ""])))
            .await?;
        normalize_process_list(value)
            .map_err(|error| AppError::Upstream(format!("{operation}: {error}")))
    }

    async fn get_process(&self, process_id: &str) -> AppResult<Process> {
        self.send_typed(
            "get process",
            self.http_client
                .get(self.url(&["processes", process_id])),
        )
        .await
    }

    async fn process_history(
        &self,
        process_id: &str,
        query: &HistoryQuery,
    ) -> AppResult<HistoryPage> {
        let operation = "fetch process history";
        let value = self
            .send_json(
                operation,
                self.http_client
                    .post(self.url(&["processes", process_id, "history"]))
                    .json(query),
            )
            .await?;
        normalize_history_page(value)
            .map_err(|error| AppError::Upstream(format!("{operation}: {error}")))
    }

    async fn task_details(&self, task_id: &str) -> AppResult<TaskDetails> {
        self.send_typed(
            "fetch task details",
            self.http_client.get(self.url(&["tasks", task_id])),
        )
        .await
    }

    async fn process_template(&self, process_id: &str) -> AppResult<ProcessTemplate> {
        let body = self
            .send_text(
                "fetch process template",
                self.http_client.get(self.url(&[
                    "admin",
                    "processes",
                    process_id,
                    "troubleshooting",
                    "template",
                ])),
            )
            .await?;
        Ok(normalize_template(&body))
    }

    async fn search_instances(&self, entity_id: &str, query: &Value) -> AppResult<Value> {
        self.send_json(
            "search instances",
            self.http_client
                .post(self.url(&["entities", entity_id, "instances", "search"]))
                .json(query),
        )
        .await
    }

    async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> AppResult<Value> {
        self.send_json(
            "update task status",
            self.http_client
                .patch(self.url(&["tasks", task_id]))
                .json(&json!({ "status": status.as_str() })),
        )
        .await
    }

    async fn execute_task_action(
        &self,
        task_id: &str,
        action: &TaskActionInput,
    ) -> AppResult<Value> {
        self.send_json(
            "execute task action",
            self.http_client
                .post(self.url(&["tasks", task_id, "action"]))
                .json(&json!({ "task": action })),
        )
        .await
    }

    async fn start_workflow(&self, workflow_id: &str, payload: &Value) -> AppResult<Value> {
        self.send_json(
            "start workflow",
            self.http_client
                .post(self.url(&["workflows", workflow_id, "start"]))
                .json(payload),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_task_rejection_is_forbidden() {
        let error = rejection_error(
            "execute task action",
            StatusCode::PRECONDITION_FAILED,
            r#"{"error":"task_not_assigned_to_user"}"#,
        );
        assert!(matches!(error, AppError::Forbidden(_)));
    }

    #[test]
    fn other_rejections_are_upstream_failures() {
        let other_precondition = rejection_error(
            "execute task action",
            StatusCode::PRECONDITION_FAILED,
            r#"{"error":"something_else"}"#,
        );
        let server_error =
            rejection_error("list processes", StatusCode::INTERNAL_SERVER_ERROR, "oops");

        assert!(matches!(other_precondition, AppError::Upstream(_)));
        assert!(
            matches!(server_error, AppError::Upstream(message) if message.contains("list processes"))
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() -> AppResult<()> {
        let gateway = HttpHolmesGateway::new(
            "https://holmes.example/v1/",
            "token",
            Duration::from_secs(5),
        )?;
        assert_eq!(
            gateway.url(&["processes", ""]).as_str(),
            "https://holmes.example/v1/processes/"
        );
        Ok(())
    }

    #[test]
    fn path_ids_are_encoded_as_single_segments() -> AppResult<()> {
        let gateway =
            HttpHolmesGateway::new("https://holmes.example/v1", "token", Duration::from_secs(5))?;

        assert_eq!(
            gateway.url(&["tasks", "T1/../admin?x=1", "action"]).as_str(),
            "https://holmes.example/v1/tasks/T1%2F..%2Fadmin%3Fx=1/action"
        );
        assert_eq!(
            gateway.url(&["processes", "P1", "history"]).as_str(),
            "https://holmes.example/v1/processes/P1/history"
        );
        Ok(())
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let result = HttpHolmesGateway::new("not a url", "token", Duration::from_secs(5));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

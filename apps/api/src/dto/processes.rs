use easyholmes_application::CreateProcessInput;
use easyholmes_core::{AppError, AppResult};
use easyholmes_domain::HistoryQuery;
use serde::Deserialize;
use serde_json::Value;
use ts_rs::TS;

/// Incoming payload for starting an arbitrary workflow.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/start-process-request.ts"
)]
pub struct StartProcessRequest {
    #[serde(default, rename = "workflowId", alias = "workflow_id")]
    pub workflow_id: String,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub data: Value,
}

/// Incoming payload for creating a process on the configured workflow.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-process-request.ts"
)]
pub struct CreateProcessRequest {
    #[serde(default)]
    pub discipline: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default, alias = "instanceId", alias = "instance")]
    pub instance_id: String,
}

impl From<CreateProcessRequest> for CreateProcessInput {
    fn from(request: CreateProcessRequest) -> Self {
        Self {
            discipline: request.discipline,
            stage: request.stage,
            instance_id: request.instance_id,
        }
    }
}

/// Incoming payload for one page of process history.
///
/// A missing payload requests the first page sorted by creation date.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/process-history-request.ts"
)]
pub struct ProcessHistoryRequest {
    #[serde(default)]
    #[ts(type = "unknown | null")]
    pub payload: Option<Value>,
}

impl ProcessHistoryRequest {
    pub fn into_query(self) -> AppResult<HistoryQuery> {
        match self.payload {
            None | Some(Value::Null) => Ok(HistoryQuery::default()),
            Some(payload) => serde_json::from_value(payload).map_err(|error| {
                AppError::Validation(format!("invalid history payload: {error}"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_history_request_uses_default_query() -> AppResult<()> {
        let query = ProcessHistoryRequest::default().into_query()?;
        assert_eq!(query, HistoryQuery::default());
        Ok(())
    }

    #[test]
    fn history_payload_is_decoded() -> AppResult<()> {
        let request = ProcessHistoryRequest {
            payload: Some(json!({"filters": [], "page": 3, "per_page": 20})),
        };
        let query = request.into_query()?;
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 20);
        Ok(())
    }

    #[test]
    fn malformed_history_payload_is_a_validation_error() {
        let request = ProcessHistoryRequest {
            payload: Some(json!({"page": "first"})),
        };
        assert!(matches!(request.into_query(), Err(AppError::Validation(_))));
    }
}

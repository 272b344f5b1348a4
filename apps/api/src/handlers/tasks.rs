use axum::Json;
use axum::extract::{Extension, Path, State};
use easyholmes_application::TaskPropertyView;
use easyholmes_core::{NonEmptyString, UserIdentity};
use easyholmes_domain::{TaskDetails, TaskStatus};
use serde_json::Value;
use tracing::info;

use crate::dto::{
    ApiResponse, CacheInvalidationResponse, CompleteTaskRequest, TaskListQuery, TaskPageResponse,
    UpdateTaskStatusRequest,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;


pub async fn list_tasks_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Json<ApiResponse<TaskPageResponse>>> {
    let query = query.into_task_query()?;
    let page = state.task_aggregator.query_tasks(&query).await?;
    Ok(Json(ApiResponse::data(TaskPageResponse::from(page))))
}

pub async fn tasks_by_status_handler(
    State(state): State<AppState>,
    Path(status): Path<String>,
    ApiQuery(mut query): ApiQuery<TaskListQuery>,
) -> ApiResult<Json<ApiResponse<TaskPageResponse>>> {
    query.status = Some(status);
    let query = query.into_task_query()?;
    let page = TaskPageResponse::from(state.task_aggregator.query_tasks(&query).await?);
    let page = match query.status {
        Some(status) => page.for_status(status),
        None => page,
    };
    Ok(Json(ApiResponse::data(page)))
}

pub async fn refresh_tasks_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<CacheInvalidationResponse>> {
    let removed = state.holmes_service.refresh_tasks().await;
    Json(ApiResponse::data(CacheInvalidationResponse { removed }).with_message("tasks refreshed"))
}

pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<ApiResponse<TaskDetails>>> {
    let details = state.holmes_service.task_details(&task_id).await?;
    Ok(Json(ApiResponse::data(details)))
}

pub async fn task_properties_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<TaskPropertyView>>>> {
    let properties = state.holmes_service.task_properties(&task_id).await?;
    Ok(Json(ApiResponse::data(properties)))
}

pub async fn update_task_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTaskStatusRequest>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    let status = NonEmptyString::required("status", payload.status.trim())?
        .as_str()
        .parse::<TaskStatus>()?;

    let result = state
        .holmes_service
        .update_task_status(&task_id, payload.process_id.as_deref(), status)
        .await?;
    info!(subject = user.subject(), task_id = %task_id, %status, "task status updated");

    Ok(Json(
        ApiResponse::data(result).with_message("task status updated"),
    ))
}

pub async fn complete_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(task_id): Path<String>,
    ApiJson(payload): ApiJson<CompleteTaskRequest>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    let result = state
        .holmes_service
        .complete_task(&task_id, payload.into())
        .await?;
    info!(subject = user.subject(), task_id = %task_id, "task completed");

    Ok(Json(ApiResponse::data(result).with_message("task completed")))
}

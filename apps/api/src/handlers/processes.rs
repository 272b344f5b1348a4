use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use easyholmes_application::ProcessView;
use easyholmes_core::UserIdentity;
use easyholmes_domain::{HistoryPage, InstanceOption};
use serde_json::Value;
use tracing::info;

use crate::dto::{
    ApiResponse, CacheInvalidationResponse, CreateProcessRequest, ProcessHistoryRequest,
    StartProcessRequest, TaskResponse,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;


pub async fn list_processes_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ProcessView>>>> {
    let processes = state.holmes_service.list_process_views().await?;
    Ok(Json(ApiResponse::data(processes)))
}

pub async fn list_instances_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<InstanceOption>>>> {
    let instances = state.holmes_service.instance_options().await?;
    Ok(Json(ApiResponse::data(instances)))
}

pub async fn create_process_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreateProcessRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Value>>)> {
    let created = state.holmes_service.create_process(payload.into()).await?;
    info!(subject = user.subject(), "process creation requested");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(created).with_message("process created")),
    ))
}

pub async fn start_process_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<StartProcessRequest>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    let started = state
        .holmes_service
        .start_workflow(&payload.workflow_id, &payload.data)
        .await?;
    info!(subject = user.subject(), workflow_id = %payload.workflow_id, "workflow started");

    Ok(Json(ApiResponse::data(started).with_message("process started")))
}

pub async fn clear_process_cache_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<CacheInvalidationResponse>> {
    let removed = state.holmes_service.clear_cache().await;
    Json(ApiResponse::data(CacheInvalidationResponse { removed }).with_message("cache cleared"))
}

pub async fn refresh_processes_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ProcessView>>>> {
    let processes = state.holmes_service.refresh_processes().await?;
    Ok(Json(
        ApiResponse::data(processes).with_message("processes refreshed"),
    ))
}

pub async fn get_process_handler(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
) -> ApiResult<Json<ApiResponse<ProcessView>>> {
    let process = state.holmes_service.get_process(&process_id).await?;
    Ok(Json(ApiResponse::data(ProcessView::from(process))))
}

pub async fn process_tasks_handler(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<TaskResponse>>>> {
    let tasks = state
        .task_aggregator
        .tasks_for_process(&process_id)
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();

    Ok(Json(ApiResponse::data(tasks)))
}

pub async fn process_history_handler(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
    ApiJson(payload): ApiJson<ProcessHistoryRequest>,
) -> ApiResult<Json<ApiResponse<HistoryPage>>> {
    let query = payload.into_query()?;
    let page = state
        .holmes_service
        .process_history(&process_id, &query)
        .await?;

    Ok(Json(ApiResponse::data(page)))
}

/// BPMN XML for the process diagram, synthesized when Holmes has none.
pub async fn process_template_handler(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let xml = state.holmes_service.process_template(&process_id).await?;
    Ok(Json(ApiResponse::data(xml)))
}

pub async fn invalidate_process_cache_handler(
    State(state): State<AppState>,
    Path(process_id): Path<String>,
) -> Json<ApiResponse<CacheInvalidationResponse>> {
    let removed = state.holmes_service.invalidate_process(&process_id).await;
    info!(process_id = %process_id, removed, "process cache invalidated");

    Json(
        ApiResponse::data(CacheInvalidationResponse { removed })
            .with_message("process cache invalidated"),
    )
}

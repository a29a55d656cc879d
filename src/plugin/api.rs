use crate::api::{ApiResponse, AppError, AppState};
use crate::http::ReqParam;
use crate::plugin::model::{
    ActionConfiguration, DatasourceConfiguration, ExecutionResult, TriggerResult,
};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub async fn execute_action(
    State(app_state): State<AppState>,
    Json(payload): Json<ExecuteActionPayload>,
) -> Result<ApiResponse<ExecutionResult>, AppError> {
    let result = app_state
        .executor
        .execute_parameterized(&payload.datasource, payload.action, &payload.params)
        .await;
    Ok(ApiResponse(result))
}

pub async fn validate_datasource(
    State(app_state): State<AppState>,
    Json(datasource): Json<DatasourceConfiguration>,
) -> Result<ApiResponse<ValidationResponse>, AppError> {
    let invalids = app_state.executor.validate_datasource(&datasource);
    Ok(ApiResponse(ValidationResponse { invalids }))
}

pub async fn trigger_datasource(
    State(app_state): State<AppState>,
    Json(datasource): Json<DatasourceConfiguration>,
) -> Result<ApiResponse<TriggerResult>, AppError> {
    let result = app_state
        .executor
        .trigger(&datasource)
        .await
        .map_err(AppError::from);
    ApiResponse::from(result)
}

#[derive(Deserialize, Clone)]
pub struct ExecuteActionPayload {
    pub datasource: DatasourceConfiguration,
    pub action: ActionConfiguration,
    #[serde(default)]
    pub params: Vec<ReqParam>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ValidationResponse {
    pub invalids: BTreeSet<String>,
}

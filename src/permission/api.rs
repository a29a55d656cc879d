use crate::api::{ApiResponse, AppError};
use crate::permission::model::{AclPermission, Operation, SerialiseObjective};
use crate::permission::service::{DatasourcePermission, DomainPermission};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

pub async fn get_operation_permission(
    Path(operation): Path<String>,
    State(permissions): State<DatasourcePermission>,
) -> Result<ApiResponse<PermissionResponse>, AppError> {
    let operation: Operation = operation.parse()?;
    Ok(ApiResponse(PermissionResponse {
        permission: Some(permissions.permission_for(operation)),
    }))
}

pub async fn get_import_export_permission(
    params: Query<ImportExportQueryParams>,
    State(permissions): State<DatasourcePermission>,
) -> Result<ApiResponse<PermissionResponse>, AppError> {
    let result = permissions
        .access_permission_for_import_export(params.is_export, params.objective)
        .map(|permission| PermissionResponse { permission })
        .map_err(AppError::from);
    ApiResponse::from(result)
}

#[derive(Deserialize)]
pub struct ImportExportQueryParams {
    is_export: bool,
    objective: SerialiseObjective,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PermissionResponse {
    pub permission: Option<AclPermission>,
}

use crate::permission::api::{get_import_export_permission, get_operation_permission};
use crate::permission::model::PermissionError;
use crate::permission::service::DatasourcePermission;
use crate::plugin::api::{execute_action, trigger_datasource, validate_datasource};
use crate::plugin::error::PluginError;
use crate::plugin::executor::OpenAiExecutor;
use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<OpenAiExecutor>,
    pub permissions: DatasourcePermission,
}

impl FromRef<AppState> for DatasourcePermission {
    fn from_ref(app_state: &AppState) -> DatasourcePermission {
        app_state.permissions
    }
}

pub fn build_api(app_state: AppState) -> Router {
    Router::new()
        .route("/actions/execute", post(execute_action))
        .route("/datasources/validate", post(validate_datasource))
        .route("/datasources/trigger", post(trigger_datasource))
        .route("/permissions/datasources/:operation", get(get_operation_permission))
        .route("/permissions/datasources/import-export", get(get_import_export_permission))
        .layer(TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new().include_headers(false))
            .on_request(
                DefaultOnRequest::new()
                    .level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Micros)
            ))
        .with_state(app_state)
}

pub struct ApiResponse<T>(pub T);

impl<T> ApiResponse<T> {
    pub fn from(result: Result<T, AppError>) -> Result<ApiResponse<T>, AppError> {
        result.map(ApiResponse)
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Processing(String),
    #[error("{0}")]
    Internal(String),
}

impl From<PluginError> for AppError {
    fn from(error: PluginError) -> Self {
        match error {
            PluginError::ExecuteArgument(_) => AppError::Validation(error.to_string()),
            PluginError::GetStructure(_) => AppError::Processing(error.to_string()),
            PluginError::Execute(_) => AppError::Internal(error.to_string()),
        }
    }
}

impl From<PermissionError> for AppError {
    fn from(error: PermissionError) -> Self {
        AppError::Validation(error.to_string())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { message })).into_response()
            }
            AppError::Processing(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody { message })).into_response()
            }
            AppError::Internal(message) => {
                tracing::error!("{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody { message: "Internal server error".to_string() }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiClient;
    use crate::permission::api::PermissionResponse;
    use crate::permission::model::AclPermission;
    use crate::plugin::api::ValidationResponse;
    use crate::plugin::model::{ExecutionResult, SelectOption, TriggerResult};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve() -> String {
        let client = ApiClient::new(Duration::from_secs(5)).expect("client should build");
        let app_state = AppState {
            executor: Arc::new(OpenAiExecutor::new(
                Arc::new(client),
                "https://api.openai.com".to_string(),
            )),
            permissions: DatasourcePermission,
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let address = listener.local_addr().expect("should have address");
        tokio::spawn(async move {
            axum::serve(listener, build_api(app_state)).await
        });
        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_execute_route_returns_result_for_rejected_action() {
        let base = serve().await;

        let response = reqwest::Client::new()
            .post(format!("{}/actions/execute", base))
            .json(&json!({
                "datasource": {"url": "http://127.0.0.1:1", "authentication": {"bearer_token": "sk"}},
                "action": {
                    "command": "chat",
                    "headers": [{"key": "Content-Type", "value": "application/xml"}],
                    "form_data": {"model": "gpt-4", "prompt": "hi"}
                }
            }))
            .send()
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), 200);
        let result: ExecutionResult = response.json().await.expect("should decode");
        assert!(!result.is_execution_success);
        assert_eq!(
            result.error_info.map(|info| info.code),
            Some("PE-ARG-5000".to_string())
        );
    }

    #[tokio::test]
    async fn test_trigger_route_maps_structure_errors() {
        let base = serve().await;
        let provider = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "gpt-4"}]})))
            .mount(&provider)
            .await;
        let client = reqwest::Client::new();

        let ok = client
            .post(format!("{}/datasources/trigger", base))
            .json(&json!({"url": provider.uri(), "authentication": {"bearer_token": "sk"}}))
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(ok.status(), 200);
        let trigger: TriggerResult = ok.json().await.expect("should decode");
        assert_eq!(trigger.trigger, vec![SelectOption::same("gpt-4")]);

        let failed = client
            .post(format!("{}/datasources/trigger", base))
            .json(&json!({"url": provider.uri()}))
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(failed.status(), 422);
    }

    #[tokio::test]
    async fn test_validate_route_lists_invalids() {
        let base = serve().await;

        let response = reqwest::Client::new()
            .post(format!("{}/datasources/validate", base))
            .json(&json!({"url": "https://api.openai.com"}))
            .send()
            .await
            .expect("request should succeed");

        let validation: ValidationResponse = response.json().await.expect("should decode");
        assert_eq!(
            validation.invalids.into_iter().collect::<Vec<_>>(),
            vec!["Missing bearer token".to_string()]
        );
    }

    #[tokio::test]
    async fn test_permission_routes() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let delete: PermissionResponse = client
            .get(format!("{}/permissions/datasources/delete", base))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("should decode");
        assert_eq!(delete.permission, Some(AclPermission::ManageDatasources));

        let version_control: PermissionResponse = client
            .get(format!(
                "{}/permissions/datasources/import-export?is_export=true&objective=VERSION_CONTROL",
                base
            ))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("should decode");
        assert_eq!(version_control.permission, None);

        let invalid = client
            .get(format!(
                "{}/permissions/datasources/import-export?is_export=false&objective=KNOWLEDGE_BASE_GENERATION",
                base
            ))
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(invalid.status(), 400);

        let unknown = client
            .get(format!("{}/permissions/datasources/archive", base))
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(unknown.status(), 400);
        let error: ErrorBody = unknown.json().await.expect("should decode");
        assert_eq!(error.message, "Please enter a valid parameter operation.");
    }
}

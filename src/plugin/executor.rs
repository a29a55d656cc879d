use crate::http::{ApiClient, Endpoint, HttpError, HttpMethod, HttpRequest, ReqBody, ReqParam};
use crate::plugin::error::PluginError;
use crate::plugin::model::{
    ActionConfiguration, DatasourceConfiguration, ExecutionRequest, ExecutionResult, TriggerResult,
};
use crate::plugin::request::{
    create_trigger_uri, create_uri, make_request_body, merge_auto_generated_headers,
    model_options, remove_empty_headers, request_content_type, substitute_params,
    verify_content_type, DEFAULT_CONTENT_TYPE,
};
use reqwest::Url;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

const REDACTED_BEARER: &str = "Bearer ****";

/// Stateless executor for OpenAI-compatible providers. Holds only the shared
/// HTTP client, so one instance serves every request.
#[derive(Clone)]
pub struct OpenAiExecutor {
    api_client: Arc<ApiClient>,
    default_base_url: String,
}

impl OpenAiExecutor {
    pub fn new(api_client: Arc<ApiClient>, default_base_url: String) -> Self {
        Self {
            api_client,
            default_base_url,
        }
    }

    fn base_url<'a>(&'a self, datasource: &'a DatasourceConfiguration) -> &'a str {
        datasource
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(self.default_base_url.as_str())
    }

    pub async fn execute_parameterized(
        &self,
        datasource: &DatasourceConfiguration,
        action: ActionConfiguration,
        params: &[ReqParam],
    ) -> ExecutionResult {
        let mut action = action;
        action.form_data = substitute_params(&action.form_data, params);
        let headers = remove_empty_headers(action.headers);
        action.headers = merge_auto_generated_headers(headers, &action.auto_generated_headers);
        self.execute_common(datasource, &action).await
    }

    /// Runs one action. Every outcome, including configuration problems and
    /// transport failures, is reported through the returned result.
    pub async fn execute_common(
        &self,
        datasource: &DatasourceConfiguration,
        action: &ActionConfiguration,
    ) -> ExecutionResult {
        let url = create_uri(self.base_url(datasource), action.command);
        let body = make_request_body(action);
        let body_value = body
            .as_ref()
            .ok()
            .and_then(|body| serde_json::to_value(body).ok());
        let bearer_token = datasource.bearer_token();
        let request = capture_request(&url, &action.headers, body_value.clone(), bearer_token.is_some());

        if let Some(content_type_error) = verify_content_type(&action.headers) {
            warn!("rejecting action: {}", content_type_error);
            return ExecutionResult::error(request, &PluginError::ExecuteArgument(content_type_error));
        }
        if let Err(error) = body {
            warn!("rejecting action: {}", error);
            return ExecutionResult::error(request, &error);
        }
        let Some(token) = bearer_token else {
            let error = PluginError::ExecuteArgument("bearer token is missing".to_string());
            warn!("rejecting action: {}", error);
            return ExecutionResult::error(request, &error);
        };

        let http_request = HttpRequest::new(
            Endpoint::new(HttpMethod::POST, url, action.headers.clone()),
            body_value.map_or_else(ReqBody::empty, ReqBody::new),
            request_content_type(&action.headers),
            Some(token.to_string()),
        );
        match self.api_client.execute(http_request).await {
            Ok(result) if result.is_success() => {
                ExecutionResult::success(request, result.status_code, result.body)
            }
            Ok(result) => {
                info!("provider rejected action with status {}", result.status_code);
                ExecutionResult::failed_status(request, result.status_code)
            }
            Err(HttpError::Io(message)) => {
                ExecutionResult::error(request, &PluginError::Execute(message))
            }
            Err(error) => {
                ExecutionResult::error(request, &PluginError::ExecuteArgument(error.to_string()))
            }
        }
    }

    /// Lists problems with the datasource; an empty set means it is usable.
    pub fn validate_datasource(&self, datasource: &DatasourceConfiguration) -> BTreeSet<String> {
        let mut invalids = BTreeSet::new();
        if datasource.bearer_token().is_none() {
            invalids.insert("Missing bearer token".to_string());
        }
        let base_url = self.base_url(datasource);
        match Url::parse(base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                invalids.insert(format!("Unsupported URL scheme: {}", url.scheme()));
            }
            Err(err) => {
                invalids.insert(format!("Invalid URL {}: {}", base_url, err));
            }
        }
        invalids
    }

    /// Fetches the provider's model catalog as dropdown options.
    pub async fn trigger(
        &self,
        datasource: &DatasourceConfiguration,
    ) -> Result<TriggerResult, PluginError> {
        let token = datasource
            .bearer_token()
            .ok_or_else(|| PluginError::GetStructure("bearer token is missing".to_string()))?;
        let request = HttpRequest::new(
            Endpoint::new(HttpMethod::GET, create_trigger_uri(self.base_url(datasource)), vec![]),
            ReqBody::empty(),
            DEFAULT_CONTENT_TYPE.to_string(),
            Some(token.to_string()),
        );
        let result = self
            .api_client
            .execute(request)
            .await
            .map_err(|err| PluginError::GetStructure(err.to_string()))?;
        if !result.is_success() {
            return Err(PluginError::GetStructure(format!(
                "model list request returned status {}",
                result.status_code
            )));
        }
        let document: Value = serde_json::from_str(&result.body).map_err(|err| {
            PluginError::GetStructure(format!("model list response is not JSON: {}", err))
        })?;
        let trigger = model_options(&document)?;
        info!("fetched {} models", trigger.len());
        Ok(TriggerResult { trigger })
    }
}

fn capture_request(
    url: &str,
    headers: &[ReqParam],
    body: Option<Value>,
    authenticated: bool,
) -> ExecutionRequest {
    let mut captured: Vec<ReqParam> = headers
        .iter()
        .filter(|header| !header.key.eq_ignore_ascii_case("authorization"))
        .cloned()
        .collect();
    if authenticated {
        captured.push(ReqParam::new("Authorization", REDACTED_BEARER));
    }
    ExecutionRequest {
        url: url.to_string(),
        http_method: HttpMethod::POST.to_string(),
        headers: captured,
        body,
    }
}

use crate::http::ReqParam;
use crate::plugin::error::PluginError;
use crate::plugin::model::{
    ActionConfiguration, ChatMessage, ChatRequest, Command, CompletionRequest,
    EmbeddingsRequest, SelectOption,
};
use serde_json::{Map, Value};

pub const CONTENT_TYPE_HEADER: &str = "content-type";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const SUPPORTED_CONTENT_TYPES: [&str; 3] = [
    "application/json",
    "application/x-www-form-urlencoded",
    "text/plain",
];

const MODELS_PATH: &str = "models";
const DATA: &str = "data";
const ID: &str = "id";
const MODEL: &str = "model";
const MESSAGES: &str = "messages";
const PROMPT: &str = "prompt";
const INPUT: &str = "input";
const MAX_TOKENS: &str = "max_tokens";
const TEMPERATURE: &str = "temperature";
const ENCODING_FORMAT: &str = "encoding_format";

fn versioned_url(base_url: &str, path: &str) -> String {
    format!("{}/v1/{}", base_url.trim_end_matches('/'), path)
}

pub fn create_uri(base_url: &str, command: Command) -> String {
    versioned_url(base_url, command.path())
}

pub fn create_trigger_uri(base_url: &str) -> String {
    versioned_url(base_url, MODELS_PATH)
}

pub fn remove_empty_headers(headers: Vec<ReqParam>) -> Vec<ReqParam> {
    headers
        .into_iter()
        .filter(|header| !header.key.trim().is_empty() && !header.value.trim().is_empty())
        .collect()
}

/// Appends generated headers the user has not set themselves.
pub fn merge_auto_generated_headers(
    headers: Vec<ReqParam>,
    auto_generated: &[ReqParam],
) -> Vec<ReqParam> {
    let mut merged = headers;
    for generated in auto_generated {
        let present = merged
            .iter()
            .any(|header| header.key.eq_ignore_ascii_case(&generated.key));
        if !present && !generated.key.trim().is_empty() {
            merged.push(generated.clone());
        }
    }
    merged
}

fn declared_content_type(headers: &[ReqParam]) -> Option<&str> {
    headers
        .iter()
        .find(|header| header.key.eq_ignore_ascii_case(CONTENT_TYPE_HEADER))
        .map(|header| header.value.as_str())
}

pub fn request_content_type(headers: &[ReqParam]) -> String {
    declared_content_type(headers)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Returns a message when the declared content type is outside the allow-list.
pub fn verify_content_type(headers: &[ReqParam]) -> Option<String> {
    let declared = declared_content_type(headers)?;
    let media_type = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if SUPPORTED_CONTENT_TYPES.contains(&media_type.as_str()) {
        None
    } else {
        Some(format!("Content-Type {} is not supported", declared))
    }
}

fn substitute(value: &Value, params: &[ReqParam]) -> Value {
    match value {
        Value::String(text) => {
            let mut replaced = text.clone();
            for param in params {
                replaced = replaced.replace(&format!("{{{{{}}}}}", param.key), &param.value);
            }
            Value::String(replaced)
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| substitute(item, params)).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), substitute(item, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replaces `{{key}}` in every string of the form data with the bound value.
pub fn substitute_params(form_data: &Map<String, Value>, params: &[ReqParam]) -> Map<String, Value> {
    if params.is_empty() {
        return form_data.clone();
    }
    form_data
        .iter()
        .map(|(key, value)| (key.clone(), substitute(value, params)))
        .collect()
}

fn read_string(form_data: &Map<String, Value>, key: &str) -> Option<String> {
    form_data
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

// Form inputs arrive either as JSON numbers or as their text.
fn read_number(form_data: &Map<String, Value>, key: &str) -> Result<Option<f64>, PluginError> {
    match form_data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| PluginError::ExecuteArgument(format!("{} must be a number", key))),
        Some(_) => Err(PluginError::ExecuteArgument(format!("{} must be a number", key))),
    }
}

fn read_messages(form_data: &Map<String, Value>) -> Result<Vec<ChatMessage>, PluginError> {
    if let Some(messages) = form_data.get(MESSAGES) {
        let messages: Vec<ChatMessage> = serde_json::from_value(messages.clone())
            .map_err(|err| PluginError::ExecuteArgument(format!("messages are malformed: {}", err)))?;
        if !messages.is_empty() {
            return Ok(messages);
        }
    }
    match read_string(form_data, PROMPT) {
        Some(prompt) => Ok(vec![ChatMessage {
            role: "user".to_string(),
            content: prompt,
        }]),
        None => Err(PluginError::ExecuteArgument(
            "messages or prompt is required".to_string(),
        )),
    }
}

pub fn make_request_body(action: &ActionConfiguration) -> Result<CompletionRequest, PluginError> {
    let form_data = &action.form_data;
    let model = read_string(form_data, MODEL)
        .ok_or_else(|| PluginError::ExecuteArgument("model is required".to_string()))?;
    match action.command {
        Command::Chat => {
            let max_tokens = read_number(form_data, MAX_TOKENS)?
                .map(|tokens| {
                    if tokens < 1.0 || tokens.fract() != 0.0 {
                        Err(PluginError::ExecuteArgument(
                            "max_tokens must be a positive integer".to_string(),
                        ))
                    } else {
                        Ok(tokens as u64)
                    }
                })
                .transpose()?;
            Ok(CompletionRequest::Chat(ChatRequest {
                model,
                messages: read_messages(form_data)?,
                max_tokens,
                temperature: read_number(form_data, TEMPERATURE)?,
            }))
        }
        Command::Embeddings => {
            let input = match form_data.get(INPUT) {
                Some(Value::String(text)) if !text.trim().is_empty() => Value::String(text.clone()),
                Some(Value::Array(items)) if !items.is_empty() => Value::Array(items.clone()),
                _ => {
                    return Err(PluginError::ExecuteArgument("input is required".to_string()));
                }
            };
            Ok(CompletionRequest::Embeddings(EmbeddingsRequest {
                model,
                input,
                encoding_format: read_string(form_data, ENCODING_FORMAT),
            }))
        }
    }
}

/// Flattens a model catalog into dropdown options, skipping entries without
/// a string `id`. A document without `data` yields no options.
pub fn model_options(document: &Value) -> Result<Vec<SelectOption>, PluginError> {
    let root = document.as_object().ok_or_else(|| {
        PluginError::GetStructure("model list response is not a JSON object".to_string())
    })?;
    let models = match root.get(DATA) {
        None => return Ok(vec![]),
        Some(Value::Array(models)) => models,
        Some(_) => {
            return Err(PluginError::GetStructure(
                "model list data is not an array".to_string(),
            ));
        }
    };
    Ok(models
        .iter()
        .filter_map(|model| model.get(ID).and_then(Value::as_str))
        .map(SelectOption::same)
        .collect())
}

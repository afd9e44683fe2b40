//! Request router for the init-data HTTP endpoints.
//!
//! Maps a request path and its query parameters to the decode or
//! validate operation and shapes the result into a JSON envelope
//! (`statusCode`, `body`, `error`). Transport is left to the caller:
//! this module only sees already-extracted query parameters.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::core::decoder::decode;
use crate::core::secret::{BotSecrets, parse_bot_id};
use crate::core::validator::{DEFAULT_MAX_AGE, ValidationOptions, validate_third_party};
use crate::error::InitDataError;

pub const PARSE_PATH: &str = "/api/parseinitdata";
pub const VALIDATE_PATH: &str = "/api/validateinitdata";

const INIT_DATA_PARAM: &str = "initData";
const BOT_ID_PARAM: &str = "botID";
const EXP_IN_PARAM: &str = "expIn";

const INVALID_EXP_IN: &str = "Invalid expIn: must be a positive integer representing seconds";

/// An incoming request: path plus decoded query parameters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl ApiRequest {
    pub fn new<I, K, V>(path: &str, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: path.to_string(),
            query: query
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn param(&self, name: &str) -> &str {
        self.query.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Custom `Debug` that lists parameter names only.
impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.query.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ApiRequest")
            .field("path", &self.path)
            .field("query", &names)
            .finish()
    }
}

/// The response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status_code: 200,
            body: Some(body),
            error: None,
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Route one request to its handler.
///
/// Never fails: every error becomes a 4xx/5xx envelope.
pub fn handle(request: &ApiRequest, secrets: &BotSecrets, now: DateTime<Utc>) -> ApiResponse {
    tracing::info!(path = %request.path, request = ?request, "incoming request");

    let response = match request.path.as_str() {
        PARSE_PATH => handle_parse(request.param(INIT_DATA_PARAM)),
        VALIDATE_PATH => handle_validate(request, secrets, now),
        _ => ApiResponse::error(404, "Not Found"),
    };

    tracing::info!(
        path = %request.path,
        status = response.status_code,
        error = response.error.as_deref().unwrap_or(""),
        "outgoing response"
    );
    response
}

fn handle_parse(init_data: &str) -> ApiResponse {
    let decoded = match decode(init_data) {
        Ok(decoded) => decoded,
        Err(e) => return ApiResponse::error(400, format!("Error parsing init data: {e}")),
    };

    match serde_json::to_value(&decoded.claims) {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => ApiResponse::error(500, format!("Error serializing parsed data: {e}")),
    }
}

fn handle_validate(request: &ApiRequest, secrets: &BotSecrets, now: DateTime<Utc>) -> ApiResponse {
    let bot_id = match parse_bot_id(request.param(BOT_ID_PARAM)) {
        Ok(bot_id) => bot_id,
        Err(InitDataError::InvalidBotId { reason }) => {
            return ApiResponse::error(400, format!("Invalid botID: {reason}"));
        }
        Err(e) => return ApiResponse::error(400, format!("Invalid botID: {e}")),
    };

    let max_age = match parse_exp_in(request.param(EXP_IN_PARAM)) {
        Ok(max_age) => max_age,
        Err(_) => return ApiResponse::error(400, INVALID_EXP_IN),
    };

    let options = ValidationOptions::new(max_age, now);
    match validate_third_party(request.param(INIT_DATA_PARAM), bot_id, secrets, &options) {
        Ok(()) => ApiResponse::ok(Value::String("Validation successful".to_string())),
        Err(e) => ApiResponse::error(400, format!("Validation failed: {e}")),
    }
}

/// Parse the `expIn` parameter; empty means the default window.
fn parse_exp_in(raw: &str) -> Result<Duration, InitDataError> {
    if raw.is_empty() {
        return Ok(DEFAULT_MAX_AGE);
    }
    match raw.parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds.unsigned_abs())),
        _ => Err(InitDataError::InvalidFreshnessWindow),
    }
}

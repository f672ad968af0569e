use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a backend call, sorted by how the caller has to react.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx that is neither a duplicate nor a client-input rejection.
    #[error("backend returned HTTP {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    /// Bad ticker, unknown user and similar 400/404 rejections. Carries the
    /// server's `detail` message.
    #[error("{0}")]
    NotFoundOrInvalidInput(String),

    /// 409 from `add_to_watchlist`.
    #[error("already in watchlist")]
    DuplicateEntry,

    /// Local input rejected before any request was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// 2xx whose body does not have the expected shape.
    #[error("unexpected response from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },

    /// The operation needs a signed-in user.
    #[error("login first: OPTISCOPE_UID is not set")]
    LoginRequired,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl ApiError {
    /// Classifies a non-2xx response. `body` is the raw response text; a JSON
    /// `{"detail": "..."}` body contributes its message.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);
        match status {
            StatusCode::CONFLICT => ApiError::DuplicateEntry,
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::NotFoundOrInvalidInput(
                    detail.unwrap_or_else(|| default_rejection(status).to_string()),
                )
            }
            _ => ApiError::Status {
                status: status.as_u16(),
                detail,
            },
        }
    }

    /// Errors that leave local state untouched and can simply be re-triggered
    /// by the user.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Status { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

fn default_rejection(status: StatusCode) -> &'static str {
    if status == StatusCode::NOT_FOUND {
        "not found"
    } else {
        "invalid input"
    }
}

/// FastAPI error bodies are `{"detail": "msg"}`, or `{"detail": [{"msg": ...}]}`
/// for validation errors.
fn extract_detail(body: &str) -> Option<String> {
    let v = serde_json::from_str::<serde_json::Value>(body).ok()?;
    match v.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_duplicate() {
        let err = ApiError::from_status(StatusCode::CONFLICT, "{\"detail\":\"exists\"}");
        assert_eq!(err, ApiError::DuplicateEntry);
        assert_eq!(err.to_string(), "already in watchlist");
    }

    #[test]
    fn bad_request_carries_server_detail() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            "{\"detail\":\"Invalid ticker or missing data\"}",
        );
        assert_eq!(
            err,
            ApiError::NotFoundOrInvalidInput("Invalid ticker or missing data".into())
        );
        assert!(!err.is_network());
    }

    #[test]
    fn validation_detail_lists_are_joined() {
        let body = r#"{"detail":[{"msg":"field required"},{"msg":"value is not a valid float"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err,
            ApiError::NotFoundOrInvalidInput("field required; value is not a valid float".into())
        );
    }

    #[test]
    fn other_statuses_are_network_failures() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                detail: None
            }
        );
        assert!(err.is_network());
        assert_eq!(err.to_string(), "backend returned HTTP 500");

        let not_found = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(not_found, ApiError::NotFoundOrInvalidInput("not found".into()));
    }
}

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Toast shown when the server cannot be reached
pub const SERVER_ERROR_MESSAGE: &str = "Could not connect to the server. Please try again later.";
/// Toast shown when login is refused
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
/// Banner used when an error response carries no message
pub const FALLBACK_MESSAGE: &str = "The request could not be completed.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all: DNS, refused connection, timeout
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("no detail"))]
    Unauthorized(Option<String>),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Http {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds the error for a non-success response from its status and body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = message_from_body(body);
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized(message)
        } else {
            ApiError::Http { status, message }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn failure(&self) -> Failure {
        match self {
            ApiError::Network(_) => Failure::Network,
            ApiError::Unauthorized(_) => Failure::InvalidCredentials,
            ApiError::Http { message, .. } => {
                Failure::Rejected(message.clone().unwrap_or_else(|| FALLBACK_MESSAGE.to_string()))
            }
            ApiError::Decode(_) => Failure::Rejected(FALLBACK_MESSAGE.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// The three ways a user action can fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Shown as a generic server error toast
    Network,
    /// Shown as the credentials toast
    InvalidCredentials,
    /// Shown in the form banner
    Rejected(String),
}

impl Failure {
    pub fn message(&self) -> &str {
        match self {
            Failure::Network => SERVER_ERROR_MESSAGE,
            Failure::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE,
            Failure::Rejected(message) => message,
        }
    }
}

/// Human readable message of an error body.
///
/// Looks at `detail`, then `error`, then the first message of a field error
/// map or a bare list of messages.
pub fn message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match &value {
        Value::Object(map) => ["detail", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(first_text))
            .or_else(|| map.values().find_map(first_text)),
        other => first_text(other),
    }
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_body() {
        assert_eq!(
            message_from_body(r#"{"detail":"A reservation already exists in that time range"}"#),
            Some("A reservation already exists in that time range".to_string())
        );
        assert_eq!(
            message_from_body(r#"{"error":"Space not found"}"#),
            Some("Space not found".to_string())
        );
        assert_eq!(
            message_from_body(r#"{"space_id":["Space not found"]}"#),
            Some("Space not found".to_string())
        );
        assert_eq!(
            message_from_body(r#"["Start must be before end"]"#),
            Some("Start must be before end".to_string())
        );
        assert_eq!(message_from_body("<html>502</html>"), None);
        assert_eq!(message_from_body(r#"{"detail":""}"#), None);
    }

    #[test]
    fn test_classification() {
        let unauthorized = ApiError::from_response(StatusCode::UNAUTHORIZED, "{}");
        assert_eq!(unauthorized.failure(), Failure::InvalidCredentials);

        let rejected = ApiError::from_response(StatusCode::BAD_REQUEST, r#"{"detail":"Overlap"}"#);
        assert_eq!(rejected.failure(), Failure::Rejected("Overlap".to_string()));
        assert_eq!(rejected.status(), Some(StatusCode::BAD_REQUEST));

        let bare = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(bare.failure().message(), FALLBACK_MESSAGE);

        let network = ApiError::Network("connection refused".to_string());
        assert_eq!(network.failure().message(), SERVER_ERROR_MESSAGE);
        assert_eq!(network.status(), None);
    }
}

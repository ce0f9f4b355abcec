use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - session may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("User already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shapes used by the REST and auth services
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable message out of a JSON error body, if any
    fn extract_message(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed
                .message
                .or(parsed.msg)
                .or(parsed.error_description)
                .or(parsed.error)
                .unwrap_or_else(|| Self::truncate_body(body)),
            Err(_) => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            400..=499 => ApiError::Rejected(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// Reclassify an invitation failure whose message says the email is taken
    pub fn into_invite_error(self) -> Self {
        let text = self.detail();
        if text.to_lowercase().contains("registered") {
            ApiError::AlreadyRegistered(text)
        } else {
            self
        }
    }

    /// The backend's own message where there is one, otherwise the full error
    pub fn detail(&self) -> String {
        match self {
            ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::ServerError(m)
            | ApiError::Rejected(m)
            | ApiError::AlreadyRegistered(m)
            | ApiError::InvalidResponse(m)
            | ApiError::InvalidRequest(m) => m.clone(),
            other => other.to_string(),
        }
    }

    /// Short message suitable for the status bar
    pub fn user_message(&self) -> String {
        match self {
            ApiError::RateLimited => "Server is busy. Please wait a moment and try again.".to_string(),
            ApiError::Unauthorized => "Session expired. Please sign in again.".to_string(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => "Network error. Check your connection.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(ApiError::from_status(StatusCode::FORBIDDEN, "{}"), ApiError::AccessDenied(_)));
        assert!(matches!(ApiError::from_status(StatusCode::NOT_FOUND, "gone"), ApiError::NotFound(m) if m == "gone"));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_extracts_backend_message() {
        let body = r#"{"code":"42703","message":"column students.stream_id does not exist"}"#;
        match ApiError::from_status(StatusCode::BAD_REQUEST, body) {
            ApiError::Rejected(m) => assert_eq!(m, "column students.stream_id does not exist"),
            other => panic!("unexpected {:?}", other),
        }

        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        match ApiError::from_status(StatusCode::BAD_REQUEST, body) {
            ApiError::Rejected(m) => assert_eq!(m, "Invalid login credentials"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_detail_prefers_backend_message() {
        let err = ApiError::Rejected("duplicate key value".to_string());
        assert_eq!(err.detail(), "duplicate key value");
        assert_eq!(ApiError::RateLimited.detail(), ApiError::RateLimited.to_string());
    }

    #[test]
    fn test_truncates_long_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 520 total bytes"));
    }

    #[test]
    fn test_invite_error_reclassified() {
        let body = r#"{"msg":"A user with this email address has already been registered"}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body).into_invite_error();
        assert!(matches!(err, ApiError::AlreadyRegistered(_)));

        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, r#"{"msg":"Email rate limit exceeded"}"#)
            .into_invite_error();
        assert!(matches!(err, ApiError::Rejected(_)));
    }
}

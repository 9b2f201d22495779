use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Error type returned by every handler.
///
/// Domain code builds one of the typed variants; the conversion to an HTTP
/// response happens once, here.
#[derive(Debug, Display)]
pub enum ApiError {
    /// Malformed or missing input.
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// Business-rule violation with an explicit status code.
    #[display(fmt = "{}", message)]
    Application { status: StatusCode, message: String },

    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Anything unexpected. The detail is logged, never sent to the client.
    #[display(fmt = "Internal Server Error")]
    Unhandled(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Application {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Application {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Application { status, .. } => *status,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Unhandled(detail) = self {
            tracing::error!(error = %detail, "Unhandled error");
        }

        let status = self.status_code();
        HttpResponse::build(status).json(json!({
            "status": status.as_u16(),
            "message": self.to_string(),
        }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Unhandled(format!("database error: {e}"))
    }
}

// moka hands loader errors back wrapped in an Arc
impl From<Arc<sqlx::Error>> for ApiError {
    fn from(e: Arc<sqlx::Error>) -> Self {
        ApiError::Unhandled(format!("database error: {e}"))
    }
}

impl From<actix_web::error::JsonPayloadError> for ApiError {
    fn from(e: actix_web::error::JsonPayloadError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<actix_web::error::QueryPayloadError> for ApiError {
    fn from(e: actix_web::error::QueryPayloadError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<actix_web::error::PathError> for ApiError {
    fn from(e: actix_web::error::PathError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn application_error_keeps_its_status() {
        let err = ApiError::Application {
            status: StatusCode::FORBIDDEN,
            message: "Invalid location".into(),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 403);
        assert_eq!(json["message"], "Invalid location");
    }

    #[actix_web::test]
    async fn unhandled_error_hides_detail() {
        let err = ApiError::Unhandled("connection reset by peer".into());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("connection reset"));
        assert!(text.contains("Internal Server Error"));
    }

    #[test]
    fn validation_and_not_found_map_to_4xx() {
        assert_eq!(
            ApiError::validation("bad date").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("Employee not found").status_code(),
            StatusCode::NOT_FOUND
        );
    }
}

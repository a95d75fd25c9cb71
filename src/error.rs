use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Field name -> message, ordered so responses are stable.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "Validation failed")]
    Validation(FieldErrors),

    #[display(fmt = "Internal Server Error")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }

    pub fn already_processed(what: &str) -> Self {
        AppError::BadRequest(format!("{what} not found or already processed"))
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => HttpResponse::build(self.status_code()).json(json!({
                "message": self.to_string(),
                "errors": errors
            })),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                HttpResponse::build(self.status_code()).json(json!({
                    "message": self.to_string()
                }))
            }
            _ => HttpResponse::build(self.status_code()).json(json!({
                "message": self.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn validation_errors_carry_field_map() {
        let mut errors = FieldErrors::new();
        errors.insert("email".into(), "Invalid email address".into());

        let resp = AppError::Validation(errors).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "Validation failed");
        assert_eq!(value["errors"]["email"], "Invalid email address");
    }

    #[test]
    fn internal_error_hides_detail() {
        let err = AppError::Internal("lock poisoned".into());
        assert_eq!(err.to_string(), "Internal Server Error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

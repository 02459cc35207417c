use crate::services::vehicle_service::VehicleError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// HTTP-facing error: a status, a message, and optional per-field details.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Vec<FieldViolation>>,
}

/// One failed field rule, as reported in the `details` array.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            details: None,
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 422 Unprocessable Entity
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.message,
            "status": self.status.as_u16()
        });
        if let Some(details) = self.details {
            body["details"] = json!(details);
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldViolation {
                    field: field.to_string(),
                    code: err.code.to_string(),
                    message: err
                        .message
                        .as_deref()
                        .unwrap_or("invalid value")
                        .to_string(),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));

        Self {
            details: Some(details),
            ..Self::unprocessable("Validation failed")
        }
    }
}

impl From<VehicleError> for AppError {
    fn from(err: VehicleError) -> Self {
        match err {
            VehicleError::Invalid(errors) => errors.into(),
            VehicleError::VinConflict(_) => AppError::unprocessable("VIN already exists"),
            other => {
                tracing::error!(error = %other, "vehicle store failure");
                AppError::internal(other.to_string())
            }
        }
    }
}

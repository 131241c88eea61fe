//! HTTP error response conversion
//!
//! Three response shapes leave this service:
//! - [`HttpAppError`]: general API errors, status from [`ErrorMetadata`].
//! - [`AuthRejection`]: any authorization failure, always an opaque 401.
//! - [`UploadResponse`]: the upload envelope, 200 or 500 with CORS headers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mediagate_core::{AppError, ErrorMetadata, LogLevel};
use mediagate_processing::{UploadError, UploadOutcome};
use serde::Serialize;

use crate::auth::AuthError;

/// `{"message": ...}` body used by the authorizer and upload surfaces.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from mediagate-core)
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub expose_details: bool,
}

impl HttpAppError {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            expose_details: false,
        }
    }

    /// Include the detailed message for non-sensitive errors (non-production only).
    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError::new(err)
    }
}

pub(crate) fn log_error(error: &AppError) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code = error_code, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code = error_code, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_code = error_code, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let details = (self.expose_details && !app_error.is_sensitive())
            .then(|| app_error.detailed_message());

        let body = Json(ErrorResponse {
            message: app_error.client_message(),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
            details,
        });

        (status, body).into_response()
    }
}

/// Authorization failure. The reason is logged, never returned.
#[derive(Debug)]
pub struct AuthRejection(AppError);

impl AuthRejection {
    pub fn reason(&self) -> &AppError {
        &self.0
    }
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        AuthRejection(err.into())
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        log_error(&self.0);
        (
            StatusCode::UNAUTHORIZED,
            Json(MessageBody {
                message: "Unauthorized".to_string(),
            }),
        )
            .into_response()
    }
}

/// Upload envelope: 200 with the outcome, or 500 with `{message}`.
/// Both carry permissive CORS headers.
#[derive(Debug)]
pub enum UploadResponse {
    Uploaded(UploadOutcome),
    Failed(AppError),
}

impl From<Result<UploadOutcome, UploadError>> for UploadResponse {
    fn from(result: Result<UploadOutcome, UploadError>) -> Self {
        match result {
            Ok(outcome) => UploadResponse::Uploaded(outcome),
            Err(err) => UploadResponse::Failed(err.into()),
        }
    }
}

impl IntoResponse for UploadResponse {
    fn into_response(self) -> Response {
        let mut response = match self {
            UploadResponse::Uploaded(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
            UploadResponse::Failed(error) => {
                log_error(&error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageBody {
                        message: error.client_message(),
                    }),
                )
                    .into_response()
            }
        };

        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        response
    }
}

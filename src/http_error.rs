use axum::response::{IntoResponse, Response};
use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use sqlx::Error as SqlxError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), code: None, details: None }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attaches structured context: the collected validation violations for
    /// 422 responses, or the underlying database message for 500s.
    pub fn with_details(mut self, details: impl Into<serde_json::Value>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, code: self.code, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<(StatusCode, String)> for AppError {
    fn from((status, msg): (StatusCode, String)) -> Self {
        AppError::new(status, msg)
    }
}

impl From<SqlxError> for AppError {
    fn from(e: SqlxError) -> Self {
        use sqlx::Error::*;
        match e {
            RowNotFound => AppError::new(StatusCode::NOT_FOUND, "notFound").with_code("not_found"),
            Database(db) => {
                if let Some(code) = db.code() {
                    if code == "23505" {
                        let code_str = match db.constraint() {
                            Some(cons) if cons.contains("slug") => "duplicate_slug",
                            Some(cons) if cons.contains("username") => "duplicate_username",
                            _ => "duplicate_key",
                        };
                        return AppError::new(StatusCode::CONFLICT, "duplicateKey")
                            .with_code(code_str);
                    }
                }
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred")
                    .with_details(db.message().to_string())
            }
            other => AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred")
                .with_details(other.to_string()),
        }
    }
}

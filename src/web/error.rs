use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Boundary error for admin handlers: anything unexpected becomes a
/// generic failure response, with the detail kept to the logs.
pub struct AppError(anyhow::Error);

pub type WebResult<T> = Result<T, AppError>;

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(target: "web", error = %self.0, "handler failed");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal error",
        )
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

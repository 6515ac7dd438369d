use crate::control::ControlError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No trade logs available")]
    NoLogs,
    #[error("{0}")]
    Journal(#[from] journal::JournalError),
    #[error("{0}")]
    Analytics(#[from] analytics::AnalyticsError),
    #[error("{0}")]
    Control(#[from] ControlError),
    #[error("Failed to list presets: {0}")]
    Presets(#[source] std::io::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Problems with the log itself are the caller's to fix (4xx); problems reading
/// the disk are ours (5xx).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NoLogs => StatusCode::NOT_FOUND,
            AppError::Journal(journal::JournalError::Io { .. }) => {
                tracing::error!(error = %self, "Failed to read trade log.");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Journal(_) | AppError::Analytics(_) => StatusCode::BAD_REQUEST,
            AppError::Control(ControlError::InvalidRiskPercent(_)) => StatusCode::BAD_REQUEST,
            AppError::Control(_) | AppError::Presets(_) | AppError::Task(_) => {
                tracing::error!(error = %self, "Storage error.");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_background_task_is_a_server_error() {
        let join_error = tokio::spawn(async { panic!("worker died") })
            .await
            .unwrap_err();
        let response = AppError::from(join_error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn log_problems_are_client_errors() {
        let response = AppError::Analytics(analytics::AnalyticsError::Overflow("total pnl"))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoLogs.into_response().status(), StatusCode::NOT_FOUND);
    }
}

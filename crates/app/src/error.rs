use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use services::{QuizError, RegistrationError};
use storage::repository::StorageError;

/// An error headed for the client as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn internal(err: &dyn std::error::Error) -> Self {
        error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        let status = match &err {
            QuizError::SessionNotFound
            | QuizError::QuestionIndexOutOfRange { .. }
            | QuizError::InvalidDisplayName(_) => StatusCode::BAD_REQUEST,
            QuizError::DuplicateSession
            | QuizError::AlreadyAssigned
            | QuizError::QuestionsNotAssigned
            | QuizError::DuplicateAnswer { .. } => StatusCode::CONFLICT,
            QuizError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            QuizError::InsufficientQuestions { .. } => StatusCode::SERVICE_UNAVAILABLE,
            QuizError::PersistenceFailed(_) => StatusCode::BAD_GATEWAY,
            _ => return Self::internal(&err),
        };
        Self::new(status, err.to_string())
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::UsernameTaken => Self::new(StatusCode::CONFLICT, err.to_string()),
            RegistrationError::Storage(e) => Self::from(e),
            other => Self::new(StatusCode::BAD_REQUEST, other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::internal(&err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::{game::GameError, hold::InvalidHoldTransition};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<GameError> for ServiceError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::NoGame => ServiceError::InvalidState(err.to_string()),
            GameError::UnknownPlayer(_) => ServiceError::NotFound(err.to_string()),
            GameError::InvalidPlayerCount(_) | GameError::InvalidStartingLife(_) => {
                ServiceError::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<InvalidHoldTransition> for ServiceError {
    fn from(err: InvalidHoldTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_http_semantics() {
        let status = |err: GameError| {
            AppError::from(ServiceError::from(err))
                .into_response()
                .status()
        };

        assert_eq!(status(GameError::NoGame), StatusCode::CONFLICT);
        assert_eq!(status(GameError::UnknownPlayer(9)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(GameError::InvalidPlayerCount(8)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(GameError::InvalidStartingLife(0)),
            StatusCode::BAD_REQUEST
        );
    }
}

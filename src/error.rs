//! Error types and HTTP mapping for the property search service

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::auth::{AuthError, StoreError};
use crate::search::{IndexError, SearchError};

/// Application error returned by every handler and CLI command
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        AppError::Search(SearchError::Index(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Auth(AuthError::Store(err))
    }
}

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Search(SearchError::Invalid(_)) => StatusCode::BAD_REQUEST,
            // Empty result is reported like bad input
            AppError::Search(SearchError::NoResults) => StatusCode::BAD_REQUEST,
            AppError::Search(SearchError::Index(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(auth) => match auth {
                AuthError::InvalidName | AuthError::InvalidEmail | AuthError::PasswordTooShort => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::AlreadyExists => StatusCode::ACCEPTED,
                AuthError::CouldNotVerify { .. } | AuthError::MissingToken | AuthError::Token(_) => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code, used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Search(SearchError::Invalid(_)) => "invalid_input",
            AppError::Search(SearchError::NoResults) => "no_results",
            AppError::Search(SearchError::Index(_)) => "index_unavailable",
            AppError::Auth(AuthError::Store(_)) => "storage_error",
            AppError::Auth(AuthError::AlreadyExists) => "already_exists",
            AppError::Auth(AuthError::MissingToken | AuthError::Token(_)) => "unauthorized",
            AppError::Auth(AuthError::CouldNotVerify { .. }) => "could_not_verify",
            AppError::Auth(_) => "invalid_input",
            AppError::Config(_) => "config_error",
        }
    }

    /// Plain-text body sent to the client; server-side details stay in logs
    pub fn public_message(&self) -> String {
        match self {
            AppError::Search(SearchError::Index(_)) => "Search index unavailable".to_string(),
            AppError::Auth(AuthError::Token(_)) => "Invalid token".to_string(),
            AppError::Auth(AuthError::Store(_)) | AppError::Config(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "Request failed");
        }

        let mut response = (status, self.public_message()).into_response();
        if let AppError::Auth(AuthError::CouldNotVerify { reason }) = &self {
            response
                .headers_mut()
                .insert("authentication", HeaderValue::from_static(*reason));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::params::ValidationError;

    #[test]
    fn test_validation_is_bad_request() {
        let err = AppError::from(SearchError::from(ValidationError::LocationRequired));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Location is required");
        assert_eq!(err.error_code(), "invalid_input");
    }

    #[test]
    fn test_no_results_is_bad_request() {
        let err = AppError::from(SearchError::NoResults);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "No results found");
        assert_eq!(err.error_code(), "no_results");
    }

    #[test]
    fn test_index_failure_is_server_error() {
        let err = AppError::from(IndexError::Status {
            status: 503,
            body: "down".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Search index unavailable");
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(AppError::from(AuthError::AlreadyExists).status_code(), StatusCode::ACCEPTED);
        assert_eq!(AppError::from(AuthError::InvalidEmail).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(AuthError::MissingToken).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(StoreError::Internal("x".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_could_not_verify_sets_header() {
        let response = AppError::from(AuthError::CouldNotVerify {
            reason: "Invalid Password.",
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["authentication"], "Invalid Password.");
    }
}

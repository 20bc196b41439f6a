use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Client input
    #[error("malformatted id")]
    MalformattedId,
    #[error("{0}")]
    Validation(String),
    #[error("invalid password")]
    InvalidPassword,
    #[error("username must be unique")]
    UsernameTaken,

    // Auth
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("token missing or invalid")]
    AuthFailNoToken,
    #[error("unauthorized")]
    NotOwner,
    #[error("invalid username or password")]
    LoginFail,

    // Lookup
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("unknown endpoint")]
    UnknownEndpoint,

    // Generic
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MalformattedId
            | Error::Validation(_)
            | Error::InvalidPassword
            | Error::UsernameTaken => StatusCode::BAD_REQUEST,
            Error::InvalidToken
            | Error::TokenExpired
            | Error::AuthFailNoToken
            | Error::NotOwner
            | Error::LoginFail => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) | Error::UnknownEndpoint => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::Database(err) => {
                error!(error = %err, "database error");
                "internal server error".to_string()
            }
            Error::Internal(err) => {
                error!(error = %err, "internal server error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Malformed or mistyped request bodies are client input errors, not 422s.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
            _ => Error::InvalidToken,
        }
    }
}

impl From<uuid::Error> for Error {
    fn from(_: uuid::Error) -> Self {
        Error::MalformattedId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::MalformattedId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::Validation("Blog validation failed".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotOwner.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::UnknownEndpoint.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_match_wire_format() {
        assert_eq!(Error::MalformattedId.to_string(), "malformatted id");
        assert_eq!(Error::AuthFailNoToken.to_string(), "token missing or invalid");
        assert_eq!(Error::NotFound("blog").to_string(), "blog not found");
    }

    #[test]
    fn test_uuid_parse_failure_is_malformatted_id() {
        let err: Error = uuid::Uuid::parse_str("abc123").unwrap_err().into();
        assert!(matches!(err, Error::MalformattedId));
    }
}

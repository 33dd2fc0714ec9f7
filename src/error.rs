use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ReactionKind;

/// Error body sent to clients
///
/// Example JSON response:
/// ```text
/// {
///   "status": "fail",
///   "message": "Post not found"
/// }
/// ```
///
/// Kept apart from `HttpError` so internal details (database errors, SQLSTATE
/// codes) never leak into what clients see.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Fixed, user-facing error messages
///
/// PartialEq lets tests compare variants directly.
#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    // Password validation errors
    EmptyPassword,
    ExceededMaxPasswordLength(usize),
    InvalidHashFormat,
    HashingError,

    // Authentication errors
    WrongCredentials,
    InvalidToken,
    TokenNotProvided,
    UserNotAuthenticated,

    // Authorization errors
    PermissionDenied,

    // Lookup errors
    UserNoLongerExist,
    UserNotFound,
    PostNotFound,
    CommentNotFound,
    NoReactionByUser,

    // Conflicts
    EmailExist,
    UserHasDependents { posts: i64, comments: i64 },

    // Input errors
    InvalidReactionKind(String),
    EmptyContent,
    ContentTooLong(usize),
    InvalidTrophies,
    EmptyPrompt,

    // Chatbot upstream
    ChatUnavailable,

    //Else
    ServerError,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessage::EmptyPassword => "Password cannot be empty".to_string(),
            ErrorMessage::ExceededMaxPasswordLength(max_length) => {
                format!("Password must not be more than {} characters", max_length)
            }
            ErrorMessage::InvalidHashFormat => "Invalid password hash format".to_string(),
            ErrorMessage::HashingError => "Error while hashing password".to_string(),
            ErrorMessage::WrongCredentials => "Email or password is wrong".to_string(),
            ErrorMessage::InvalidToken => "Token is invalid or expired".to_string(),
            ErrorMessage::TokenNotProvided => {
                "You are not logged in, please provide a token".to_string()
            }
            ErrorMessage::UserNotAuthenticated => {
                "Authentication required. Please log in.".to_string()
            }
            ErrorMessage::PermissionDenied => {
                "You are not allowed to perform this action".to_string()
            }
            ErrorMessage::UserNoLongerExist => {
                "User belonging to this token no longer exists".to_string()
            }
            ErrorMessage::UserNotFound => "User not found".to_string(),
            ErrorMessage::PostNotFound => "Post not found".to_string(),
            ErrorMessage::CommentNotFound => "Comment not found".to_string(),
            ErrorMessage::NoReactionByUser => "No reaction by this user on this post".to_string(),
            ErrorMessage::EmailExist => "A user with this email already exists".to_string(),
            ErrorMessage::UserHasDependents { posts, comments } => format!(
                "User still owns {} post(s) and {} comment(s); delete them first",
                posts, comments
            ),
            ErrorMessage::InvalidReactionKind(kind) => format!(
                "Invalid reaction kind '{}'. Valid kinds: {}",
                kind,
                ReactionKind::valid_kinds()
            ),
            ErrorMessage::EmptyContent => "Content cannot be empty".to_string(),
            ErrorMessage::ContentTooLong(max_length) => {
                format!("Content must not be more than {} characters", max_length)
            }
            ErrorMessage::InvalidTrophies => {
                "At least one non-empty trophy or achievement is required".to_string()
            }
            ErrorMessage::EmptyPrompt => "Prompt is invalid or empty".to_string(),
            ErrorMessage::ChatUnavailable => {
                "The chatbot could not process the request".to_string()
            }
            ErrorMessage::ServerError => "Server Error. Please try again later".to_string(),
        };
        write!(f, "{}", message)
    }
}

/// Error type returned by the consistency core (`crate::service`)
///
/// Handlers never see a panic from the core; every failure comes back as one of
/// these variants and is mapped to an `HttpError` at the route boundary.
#[derive(Debug)]
pub enum ServiceError {
    NotFound(ErrorMessage),
    Forbidden,
    InvalidInput(ErrorMessage),
    Conflict(ErrorMessage),
    Persistence(sqlx::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::NotFound(message) => write!(f, "not found: {}", message),
            ServiceError::Forbidden => write!(f, "forbidden: {}", ErrorMessage::PermissionDenied),
            ServiceError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            ServiceError::Conflict(message) => write!(f, "conflict: {}", message),
            ServiceError::Persistence(e) => write!(f, "persistence failure: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Persistence(e)
    }
}

/// Internal HTTP error used by handlers and middleware
///
/// Bundles the client message with its status code so the two can't disagree.
/// Handlers return `Result<T, HttpError>` and axum turns the error into a
/// response through `IntoResponse`.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            message: message.into(),
            status,
        }
    }

    /// 500, for database and other server-side failures
    pub fn server_error(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 400, for malformed input and failed validation
    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    /// 409, for unique violations and deletes blocked by dependents
    pub fn unique_constraint_violation(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::CONFLICT,
        }
    }

    /// 401, the caller is not authenticated
    pub fn unauthorized(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    /// 403, authenticated but neither owner nor admin
    pub fn forbidden(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::FORBIDDEN,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::NOT_FOUND,
        }
    }

    /// 502, an upstream service (the chatbot model) failed
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        HttpError {
            message: message.into(),
            status: StatusCode::BAD_GATEWAY,
        }
    }

    /// Response with `{"status": "fail", "message": ...}` and `self.status`
    pub fn into_http_response(self) -> Response {
        let json_response = Json(ErrorResponse {
            status: "fail".to_string(),
            message: self.message.clone(),
        });

        (self.status, json_response).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.message, self.status
        )
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Route-boundary mapping of core errors
///
/// Persistence failures are logged here and replaced by the generic server
/// message, the same way handlers treat raw `sqlx::Error`s.
impl From<ServiceError> for HttpError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(message) => HttpError::not_found(message.to_string()),
            ServiceError::Forbidden => {
                HttpError::forbidden(ErrorMessage::PermissionDenied.to_string())
            }
            ServiceError::InvalidInput(message) => HttpError::bad_request(message.to_string()),
            ServiceError::Conflict(message) => {
                HttpError::unique_constraint_violation(message.to_string())
            }
            ServiceError::Persistence(e) => {
                tracing::error!("DB error: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        }
    }
}

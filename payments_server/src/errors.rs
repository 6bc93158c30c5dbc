use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use payments_engine::{AccountApiError, PaymentApiError};
use thiserror::Error;

use crate::data_objects::Envelope;

pub const INVALID_JSON: &str = "Invalid JSON request";
pub const INVALID_UUID: &str = "Requested UUID is Invalid";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Invalid JSON request. {0}")]
    InvalidJson(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not serialize access token. {0}")]
    CouldNotSerializeAccessToken(String),
}

impl ServerError {
    /// The messages that end up in the `errors` field of the response envelope. Server-side faults are never
    /// described to the client.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::InvalidJson(detail) => vec![INVALID_JSON.to_string(), detail.clone()],
            Self::ValidationError(_) | Self::Conflict(_) | Self::NotFound(_) | Self::AuthenticationError(_) => {
                vec![self.to_string()]
            },
            Self::InitializeError(_) |
            Self::BackendError(_) |
            Self::IOError(_) |
            Self::ConfigurationError(_) |
            Self::CouldNotSerializeAccessToken(_) => vec![INTERNAL_ERROR.to_string()],
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        }
        let body = Envelope::<()>::failure(self.messages());
        HttpResponse::build(status).insert_header(ContentType::json()).body(body.to_json())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing auth token")]
    MissingToken,
    #[error("Invalid/Malformed auth token")]
    MalformedToken,
    #[error("Token is not valid.")]
    InvalidToken(String),
    #[error("Invalid login credentials. Please try again")]
    InvalidCredentials,
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::InvalidEmail | AccountApiError::PasswordTooShort => Self::ValidationError(e.to_string()),
            AccountApiError::EmailAlreadyExists => Self::Conflict(e.to_string()),
            AccountApiError::EmailNotFound => Self::NotFound(e.to_string()),
            AccountApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AccountApiError::DatabaseError(_) | AccountApiError::PasswordHashError(_) => {
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<PaymentApiError> for ServerError {
    fn from(e: PaymentApiError) -> Self {
        match e {
            PaymentApiError::PaymentAlreadyExists(_) | PaymentApiError::IdMismatch { .. } => {
                Self::Conflict(e.to_string())
            },
            PaymentApiError::PaymentNotFound(_) => Self::NotFound(e.to_string()),
            PaymentApiError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

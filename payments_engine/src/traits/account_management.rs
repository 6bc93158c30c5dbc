use thiserror::Error;

use crate::db_types::{Account, NewAccount};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Email address is required")]
    InvalidEmail,
    #[error("Password is required")]
    PasswordTooShort,
    #[error("Email address already in use by another user")]
    EmailAlreadyExists,
    #[error("Email address not found")]
    EmailNotFound,
    #[error("Invalid login credentials. Please try again")]
    InvalidCredentials,
    #[error("Could not process password. {0}")]
    PasswordHashError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait defines behaviour for storing and looking up registered accounts.
///
/// Backends only store what they are given. Validation and password hashing happen in [`crate::AccountApi`].
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the account registered with exactly the given email address. If there is no such account, `None` is
    /// returned.
    async fn fetch_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountApiError>;

    /// Stores a new account and returns it with its server-generated id. If the email is already taken, the backend
    /// must return [`AccountApiError::EmailAlreadyExists`].
    async fn insert_account(&self, account: NewAccount) -> Result<Account, AccountApiError>;
}

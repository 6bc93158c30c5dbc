//! Registration and login for accounts.
use std::fmt::Debug;

use log::{debug, trace};

use crate::{
    db_types::{Account, NewAccount},
    helpers::{hash_password, verify_password},
    traits::{AccountApiError, AccountManagement},
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers a new account.
    ///
    /// The email must contain an `@` and the password must be at least [`MIN_PASSWORD_LENGTH`] bytes long. The
    /// password is hashed before it reaches the database; the returned account carries only the hash.
    ///
    /// The uniqueness check here is optimistic. If two registrations for the same address race, the backend's
    /// uniqueness constraint decides, and the loser gets [`AccountApiError::EmailAlreadyExists`] either way.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AccountApiError> {
        validate_registration(email, password)?;
        if self.db.fetch_account_by_email(email).await?.is_some() {
            debug!("🔑️ Registration refused. {email} is already registered");
            return Err(AccountApiError::EmailAlreadyExists);
        }
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AccountApiError::PasswordHashError(e.to_string()))??;
        let account = self.db.insert_account(NewAccount::new(email.to_string(), password_hash)).await?;
        debug!("🔑️ Account #{} registered for {}", account.id, account.email);
        Ok(account)
    }

    /// Checks the given credentials and returns the matching account.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountApiError> {
        let account = self.db.fetch_account_by_email(email).await?.ok_or(AccountApiError::EmailNotFound)?;
        trace!("🔑️ Verifying password for account #{}", account.id);
        let password = password.to_string();
        let hash = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AccountApiError::PasswordHashError(e.to_string()))??;
        if valid {
            Ok(account)
        } else {
            debug!("🔑️ Invalid password supplied for account #{}", account.id);
            Err(AccountApiError::InvalidCredentials)
        }
    }
}

/// Field-level checks for a registration request. The email only has to contain an `@`. Password length is in bytes.
pub fn validate_registration(email: &str, password: &str) -> Result<(), AccountApiError> {
    if !email.contains('@') {
        return Err(AccountApiError::InvalidEmail);
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AccountApiError::PasswordTooShort);
    }
    Ok(())
}

//! Sqlite database operations for registered accounts.
//!
//! Generally clients should never call these methods directly, and prefer to use the [`AccountManagement`] trait
//! methods that are implemented on the [`SqliteDatabase`] struct instead.
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Account, NewAccount},
    traits::AccountApiError,
};

/// Fetches the account with exactly the given email address.
pub async fn fetch_account_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Account>, AccountApiError> {
    trace!("🗃️ Fetching account for {email}");
    let account =
        sqlx::query_as("SELECT * FROM accounts WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(account)
}

/// Inserts a new account. The `UNIQUE` constraint on `email` is the final arbiter of uniqueness, so a concurrent
/// registration for the same address that slips past the caller's existence check still fails here.
pub async fn insert_account(account: NewAccount, conn: &mut SqliteConnection) -> Result<Account, AccountApiError> {
    let result = sqlx::query_as::<_, Account>(
        r#"
            INSERT INTO accounts (email, password_hash)
            VALUES ($1, $2)
            RETURNING *;
        "#,
    )
    .bind(account.email)
    .bind(account.password_hash)
    .fetch_one(conn)
    .await;
    match result {
        Ok(account) => {
            debug!("🗃️ Account #{} created for {}", account.id, account.email);
            Ok(account)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AccountApiError::EmailAlreadyExists),
        Err(e) => Err(e.into()),
    }
}

//! `SqliteDatabase` is a concrete implementation of a payments engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};
use uuid::Uuid;

use super::db::{accounts, new_pool, payments};
use crate::{
    db_types::{Account, NewAccount, Payment},
    traits::{AccountApiError, AccountManagement, PaymentApiError, PaymentManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::fetch_account_by_email(email, &mut conn).await
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::insert_account(account, &mut conn).await
    }
}

impl PaymentManagement for SqliteDatabase {
    async fn payment_exists(&self, id: &Uuid) -> Result<bool, PaymentApiError> {
        let mut conn = self.pool.acquire().await?;
        payments::payment_exists(id, &mut conn).await
    }

    async fn fetch_payment(&self, id: &Uuid) -> Result<Option<Payment>, PaymentApiError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment(id, &mut conn).await
    }

    async fn fetch_all_payments(&self) -> Result<Vec<Payment>, PaymentApiError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_all_payments(&mut conn).await
    }

    /// Inserts the parent row and every sub-record in a single transaction, so readers never see a partially
    /// written payment.
    async fn insert_payment(&self, payment: &Payment) -> Result<(), PaymentApiError> {
        let mut tx = self.pool.begin().await?;
        payments::insert_payment(payment, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_payment(&self, payment: &Payment) -> Result<bool, PaymentApiError> {
        let mut tx = self.pool.begin().await?;
        let replaced = payments::replace_payment(payment, &mut tx).await?;
        if replaced {
            tx.commit().await?;
        } else {
            trace!("🗃️ Nothing to replace for payment {}. Rolling back.", payment.id);
            tx.rollback().await?;
        }
        Ok(replaced)
    }

    async fn delete_payment(&self, id: &Uuid) -> Result<bool, PaymentApiError> {
        let mut conn = self.pool.acquire().await?;
        payments::delete_payment(id, &mut conn).await
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Migrations are additive; existing tables and data are never dropped.
    pub async fn run_migrations(&self) -> Result<(), migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

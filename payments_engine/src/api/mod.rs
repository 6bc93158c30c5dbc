//! # Payments engine public API
//!
//! The `api` module exposes the programmatic API for the payments engine.
//!
//! * [`accounts_api`] handles registration and credential checks for accounts.
//! * [`payments_api`] manages the lifecycle of payment aggregates.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
//!
//! ```rust,ignore
//! use payments_engine::{PaymentApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/payments.db", 25).await?;
//! // SqliteDatabase implements PaymentManagement
//! let api = PaymentApi::new(db);
//! let payments = api.payments().await?;
//! ```
pub mod accounts_api;
pub mod payments_api;

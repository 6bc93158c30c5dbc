//! Payments Engine
//!
//! The payments engine is the storage and business-rule core of the payments record service. It keeps a registry of
//! accounts that may use the service, and a store of payment documents that can be created, read, replaced and
//! deleted.
//!
//! The library is divided into two main sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the supported backend. You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is the data types used in
//!    the database. These are defined in the [`db_types`] module and are public, since they also serve as the wire
//!    format of the HTTP API.
//! 2. The public API ([`mod@api`]). [`AccountApi`] handles registration and login; [`PaymentApi`] manages payments.
//!    Both are generic over the backend traits in [`traits`], so any backend implementing them can be swapped in.
pub mod api;
pub mod db_types;
pub mod helpers;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use api::{accounts_api::AccountApi, payments_api::PaymentApi};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{AccountApiError, AccountManagement, PaymentApiError, PaymentManagement};

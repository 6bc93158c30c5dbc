//! # Backend contracts
//!
//! This module defines the behaviour that a database backend needs to expose in order to be used by the payments
//! engine. The public APIs ([`crate::AccountApi`] and [`crate::PaymentApi`]) are generic over these traits, so the
//! HTTP layer never needs to know which backend it is talking to. This is also what makes it possible to mock the
//! database in endpoint tests.
//!
//! * [`AccountManagement`] provides lookups and inserts for registered accounts.
//! * [`PaymentManagement`] reads and writes whole payment aggregates.
mod account_management;
mod payment_management;

pub use account_management::{AccountApiError, AccountManagement};
pub use payment_management::{PaymentApiError, PaymentManagement};

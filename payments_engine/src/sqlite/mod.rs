//! SQLite backend for the payments engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

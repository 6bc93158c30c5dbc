//! # Payments server
//! This crate hosts the HTTP server for the payments record service. It is responsible for:
//! Registering accounts and logging them in, issuing a bearer token on success.
//! Creating, listing, fetching, replacing and deleting payment documents on behalf of token holders.
//!
//! Every JSON response, including errors, is wrapped in the envelope defined in [`data_objects::Envelope`].
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /v1/accounts`: Register a new account.
//! * `POST /v1/login`: Log in to an existing account.
//! * `/v1/payments` and `/v1/payments/{id}`: Payment CRUD. These require an `Authorization: Bearer <token>` header.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;

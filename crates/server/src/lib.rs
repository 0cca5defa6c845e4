//! E-Store order service library.
//!
//! This crate provides the order service as a library, allowing it to be
//! tested and reused. The binary in `main.rs` wires configuration, the
//! database pool, and the SMTP mailer into an axum server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

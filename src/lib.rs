//! blog-api: a JSON REST service for users, blogs and comments on SQLite.
//!
//! The binary in `src/main.rs` wires [`config`], [`db`] and [`api`] together;
//! the modules are public so the integration tests can build the router and
//! repositories directly.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod service;

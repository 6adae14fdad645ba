//! Rust client for the Monobank personal REST API.
//! Provides an async interface for client info, account statements and
//! webhook registration, with JSON payloads decoded into typed models.

pub mod client;
pub mod error;
pub mod models;

pub use client::{
    Client, Clock, DEFAULT_ACCOUNT, MAX_STATEMENT_RANGE_SECS, MIN_STATEMENT_INTERVAL_SECS,
    SystemClock,
};
pub use error::MonoError;
pub use models::{Account, ApiErrorBody, Jar, StatementItem, UserInfo};

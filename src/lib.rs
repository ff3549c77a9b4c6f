//! Client core for the Dify console API.
//!
//! This crate provides the pieces a console frontend builds on:
//!
//! - [`ApiGateway`]: an authenticated HTTP gateway that attaches bearer
//!   credentials and transparently recovers from token expiry via a
//!   single-flight refresh shared across concurrent callers.
//! - [`SessionStore`]: persistence for the credential pair and API host.
//! - `services`: typed operations for apps, API keys, auth, and statistics.

pub mod api;
pub mod auth;
pub mod models;
pub mod services;

pub use api::{ApiError, ApiGateway};
pub use auth::{CredentialPair, SessionStore};

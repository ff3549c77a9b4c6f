//! Session management for console credentials.
//!
//! This module provides:
//! - `CredentialPair`: the coupled access/refresh token tuple
//! - `SessionStore`: shared, optionally disk-backed storage for the
//!   credential pair and the API host
//!
//! The pair is always replaced as a unit; a reader can never observe a new
//! access token next to an old refresh token or vice versa.

pub mod session;

pub use session::{CredentialPair, SessionStore};

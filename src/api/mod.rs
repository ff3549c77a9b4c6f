//! Authenticated request gateway for the Dify console API.
//!
//! This module provides the `ApiGateway` for issuing HTTP requests against
//! a configured console host. Requests carry a JWT bearer token read from
//! the session store; a 401 response triggers a single-flight token refresh
//! shared by every request that fails during the same window.

pub mod error;
pub mod gateway;
mod refresh;

pub use error::ApiError;
pub use gateway::ApiGateway;

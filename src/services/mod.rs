//! Typed operations over the gateway.
//!
//! Each service wraps a gateway handle and exposes the console endpoints a
//! frontend needs: authentication, app management, and usage statistics.

pub mod apps;
pub mod auth;
pub mod statistics;

pub use apps::AppsService;
pub use auth::AuthService;
pub use statistics::StatisticsService;

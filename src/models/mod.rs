//! Data types for the console API.
//!
//! These mirror the JSON the console endpoints exchange. Fields the server
//! omits or nulls are `Option` with serde defaults so partial payloads
//! still decode.

pub mod account;
pub mod app;
pub mod statistics;

pub use account::{AccountProfile, AuthResponse, LoginRequest, TokenData};
pub use app::{
    ApiKey, ApiKeysResponse, AppData, AppExport, AppsQuery, AppsResponse, CopyAppRequest,
    ExportedApp,
};
pub use statistics::{
    AppStatisticsResponse, DailyValue, StatisticsKind, StatisticsOverview, TokenCostsResponse,
};

use serde::Deserialize;

/// Decoded form of an empty or non-JSON success response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmptyResponse {}

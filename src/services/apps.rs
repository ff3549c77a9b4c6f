use tracing::{debug, warn};

use crate::api::{ApiError, ApiGateway};
use crate::models::{
    ApiKey, ApiKeysResponse, AppData, AppExport, AppStatisticsResponse, AppsQuery, AppsResponse,
    CopyAppRequest, EmptyResponse, ExportedApp, StatisticsKind, TokenCostsResponse,
};

/// App management: listing, detail, deletion, export, copy, API keys, and
/// per-app usage statistics.
pub struct AppsService {
    gateway: ApiGateway,
}

impl AppsService {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// List apps with pagination and optional search
    pub async fn list(&self, query: &AppsQuery) -> Result<AppsResponse, ApiError> {
        let path = format!("/console/api/apps?{}", query.to_query_string());
        let response: AppsResponse = self.gateway.get(&path).await?;
        debug!(count = response.data.len(), total = response.total, "Fetched app list");
        Ok(response)
    }

    /// Fetch a single app
    pub async fn detail(&self, app_id: &str) -> Result<AppData, ApiError> {
        self.gateway
            .get(&format!("/console/api/apps/{}", app_id))
            .await
    }

    /// Delete an app
    pub async fn delete(&self, app_id: &str) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .gateway
            .delete(&format!("/console/api/apps/{}", app_id))
            .await?;
        Ok(())
    }

    /// Export an app's configuration as a DSL document
    pub async fn export(&self, app_id: &str, include_secret: bool) -> Result<AppExport, ApiError> {
        self.gateway
            .get(&format!(
                "/console/api/apps/{}/export?include_secret={}",
                app_id, include_secret
            ))
            .await
    }

    /// Export every app's configuration.
    ///
    /// Pages through the full listing and exports each app in turn. An app
    /// whose export fails is skipped, as in the dashboard's bulk export;
    /// listing failures abort the whole operation.
    pub async fn export_all(&self, include_secret: bool) -> Result<Vec<ExportedApp>, ApiError> {
        let mut exports = Vec::new();
        let mut query = AppsQuery::default();

        loop {
            let page = self.list(&query).await?;
            for app in &page.data {
                match self.export(&app.id, include_secret).await {
                    Ok(export) => exports.push(ExportedApp {
                        app_id: app.id.clone(),
                        name: app.name.clone(),
                        data: export.data,
                    }),
                    Err(e) => {
                        warn!(app_id = %app.id, error = %e, "Skipping app that failed to export")
                    }
                }
            }
            if !page.has_more {
                break;
            }
            query.page += 1;
        }

        debug!(count = exports.len(), "Exported app configurations");
        Ok(exports)
    }

    /// Duplicate an app under a new name. The server answers 201 Created
    /// with the new app.
    pub async fn copy(&self, app_id: &str, request: &CopyAppRequest) -> Result<AppData, ApiError> {
        self.gateway
            .post(&format!("/console/api/apps/{}/copy", app_id), request)
            .await
    }

    /// List the app's API keys
    pub async fn api_keys(&self, app_id: &str) -> Result<ApiKeysResponse, ApiError> {
        self.gateway
            .get(&format!("/console/api/apps/{}/api-keys", app_id))
            .await
    }

    /// Create a new API key for the app
    pub async fn create_api_key(&self, app_id: &str) -> Result<ApiKey, ApiError> {
        self.gateway
            .post(
                &format!("/console/api/apps/{}/api-keys", app_id),
                &serde_json::json!({}),
            )
            .await
    }

    /// Delete one of the app's API keys
    pub async fn delete_api_key(&self, app_id: &str, key_id: &str) -> Result<(), ApiError> {
        let _: EmptyResponse = self
            .gateway
            .delete(&format!("/console/api/apps/{}/api-keys/{}", app_id, key_id))
            .await?;
        Ok(())
    }

    /// Fetch a daily usage series for the app.
    ///
    /// `start` and `end` use the console's `YYYY-MM-DD HH:MM` format. The
    /// token-costs series has a different shape; use [`Self::token_costs`].
    pub async fn statistics(
        &self,
        app_id: &str,
        kind: StatisticsKind,
        start: &str,
        end: &str,
    ) -> Result<AppStatisticsResponse, ApiError> {
        self.gateway.get(&statistics_path(app_id, kind, start, end)).await
    }

    /// Fetch the token-costs series, which carries totals alongside the
    /// daily breakdown
    pub async fn token_costs(
        &self,
        app_id: &str,
        start: &str,
        end: &str,
    ) -> Result<TokenCostsResponse, ApiError> {
        self.gateway
            .get(&statistics_path(app_id, StatisticsKind::TokenCosts, start, end))
            .await
    }
}

fn statistics_path(app_id: &str, kind: StatisticsKind, start: &str, end: &str) -> String {
    format!(
        "/console/api/apps/{}/statistics/{}?start={}&end={}",
        app_id,
        kind,
        urlencoding::encode(start),
        urlencoding::encode(end)
    )
}

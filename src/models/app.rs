use serde::{Deserialize, Serialize};

/// A hosted application as listed by `/console/api/apps`
#[derive(Debug, Clone, Deserialize)]
pub struct AppData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub max_active_requests: Option<i64>,
    #[serde(default)]
    pub description: String,
    /// Application kind: "chat", "completion", "workflow", ...
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub icon_type: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_background: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub model_config: Option<serde_json::Value>,
    #[serde(default)]
    pub workflow: Option<WorkflowInfo>,
    #[serde(default)]
    pub use_icon_as_answer_icon: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Workflow summary attached to workflow-mode apps
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowInfo {
    pub id: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Paginated app listing
#[derive(Debug, Clone, Deserialize)]
pub struct AppsResponse {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
    #[serde(default)]
    pub data: Vec<AppData>,
}

/// Query parameters for the app listing endpoint
#[derive(Debug, Clone)]
pub struct AppsQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub include_deleted: bool,
}

impl Default for AppsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 30,
            search: None,
            include_deleted: false,
        }
    }
}

impl AppsQuery {
    /// Render as a URL query string, omitting unset parameters
    pub fn to_query_string(&self) -> String {
        let mut query = format!("page={}&limit={}", self.page, self.limit);
        if let Some(ref search) = self.search {
            if !search.is_empty() {
                query.push_str("&search=");
                query.push_str(&urlencoding::encode(search));
            }
        }
        if self.include_deleted {
            query.push_str("&include_deleted=true");
        }
        query
    }
}

/// An API key for an app
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub id: String,
    #[serde(default)]
    pub r#type: Option<String>,
    pub token: String,
    #[serde(default)]
    pub last_used_at: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeysResponse {
    #[serde(default)]
    pub data: Vec<ApiKey>,
}

/// Exported app configuration (a DSL document)
#[derive(Debug, Clone, Deserialize)]
pub struct AppExport {
    pub data: String,
}

/// One app's entry in a bulk export
#[derive(Debug, Clone, Serialize)]
pub struct ExportedApp {
    pub app_id: String,
    pub name: String,
    /// The app's DSL document
    pub data: String,
}

/// Body for `POST /console/api/apps/{id}/copy`
#[derive(Debug, Clone, Serialize)]
pub struct CopyAppRequest {
    pub name: String,
    pub icon_type: String,
    pub icon: String,
    pub icon_background: String,
    pub mode: String,
}

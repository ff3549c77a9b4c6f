use serde::Deserialize;

/// Installation-wide counters from `GET /api/v1/statistics`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsOverview {
    pub total_apps: i64,
    pub chat_apps: i64,
    pub text_gen_apps: i64,
    pub api_keys: i64,
}

/// One day of a per-app usage series
#[derive(Debug, Clone, Deserialize)]
pub struct DailyValue {
    pub date: String,
    pub value: f64,
}

/// Per-app usage series from `/console/api/apps/{id}/statistics/{kind}`
#[derive(Debug, Clone, Deserialize)]
pub struct AppStatisticsResponse {
    #[serde(default)]
    pub data: Vec<DailyValue>,
}

/// One day of the token-costs series
#[derive(Debug, Clone, Deserialize)]
pub struct TokenCostsDay {
    pub date: String,
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub completion_tokens: i64,
    #[serde(default)]
    pub total_tokens: i64,
    #[serde(default)]
    pub prompt_cost: f64,
    #[serde(default)]
    pub completion_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
}

/// Token-costs series, which carries totals alongside the daily breakdown
#[derive(Debug, Clone, Deserialize)]
pub struct TokenCostsResponse {
    #[serde(default)]
    pub total_tokens: i64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub prompt_cost: f64,
    #[serde(default)]
    pub completion_tokens: i64,
    #[serde(default)]
    pub completion_cost: f64,
    #[serde(default)]
    pub data: Vec<TokenCostsDay>,
}

/// Usage statistics series exposed per app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsKind {
    Conversations,
    EndUsers,
    Messages,
    Tokens,
    Costs,
    DailyConversations,
    DailyEndUsers,
    AverageSessionInteractions,
    TokensPerSecond,
    UserSatisfactionRate,
    TokenCosts,
    DailyMessages,
}

impl StatisticsKind {
    /// Path segment used by the statistics endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticsKind::Conversations => "conversations",
            StatisticsKind::EndUsers => "end-users",
            StatisticsKind::Messages => "messages",
            StatisticsKind::Tokens => "tokens",
            StatisticsKind::Costs => "costs",
            StatisticsKind::DailyConversations => "daily-conversations",
            StatisticsKind::DailyEndUsers => "daily-end-users",
            StatisticsKind::AverageSessionInteractions => "average-session-interactions",
            StatisticsKind::TokensPerSecond => "tokens-per-second",
            StatisticsKind::UserSatisfactionRate => "user-satisfaction-rate",
            StatisticsKind::TokenCosts => "token-costs",
            StatisticsKind::DailyMessages => "daily-messages",
        }
    }
}

impl std::fmt::Display for StatisticsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use crate::api::{ApiError, ApiGateway};
use crate::models::StatisticsOverview;

/// Installation-wide statistics counters
pub struct StatisticsService {
    gateway: ApiGateway,
}

impl StatisticsService {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Fetch the overview counters shown on the dashboard
    pub async fn overview(&self) -> Result<StatisticsOverview, ApiError> {
        self.gateway.get("/api/v1/statistics").await
    }
}

use defects_core::analytics::{BuildingDefectCount, StatusCount};

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    pub async fn defects_per_building(&self) -> ClientResult<Vec<BuildingDefectCount>> {
        self.get_json("/analytics/defects-per-building").await
    }

    pub async fn defects_by_status(&self) -> ClientResult<Vec<StatusCount>> {
        self.get_json("/analytics/defects-status").await
    }
}

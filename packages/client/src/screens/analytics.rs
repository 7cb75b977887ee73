use tracing::warn;

use defects_core::analytics::{
    dashboard, summarize, BuildingDefectCount, DashboardStats, DefectSummary, StatusCount,
};
use defects_core::permissions::NavItem;
use defects_core::{Defect, User};

use super::SessionGate;
use crate::client::ApiClient;
use crate::error::ClientResult;

pub const ANALYTICS_FAILED: &str = "Failed to load analytics data.";
pub const DASHBOARD_FAILED: &str = "Failed to load dashboard data.";

/// Admin analytics page. Counts come from the defect list; the server-side
/// breakdowns are extra and may be missing.
pub struct AnalyticsScreen {
    pub user: User,
    pub defects: Vec<Defect>,
    pub summary: DefectSummary,
    pub per_building: Vec<BuildingDefectCount>,
    pub server_status_counts: Vec<StatusCount>,
}

impl AnalyticsScreen {
    pub async fn load(client: &ApiClient) -> ClientResult<Self> {
        let user = SessionGate::new(client).require(NavItem::Analytics).await?;
        let defects = client
            .list_defects()
            .await
            .map_err(|e| e.on_screen(ANALYTICS_FAILED))?;

        let per_building = client.defects_per_building().await.unwrap_or_else(|e| {
            warn!("Per-building counts unavailable: {}", e);
            Vec::new()
        });
        let server_status_counts = client.defects_by_status().await.unwrap_or_else(|e| {
            warn!("Status counts unavailable: {}", e);
            Vec::new()
        });

        Ok(Self {
            summary: summarize(&defects),
            user,
            defects,
            per_building,
            server_status_counts,
        })
    }
}

pub struct DashboardScreen {
    pub user: User,
    pub stats: DashboardStats,
}

impl DashboardScreen {
    pub async fn load(client: &ApiClient) -> ClientResult<Self> {
        let user = SessionGate::new(client).require(NavItem::Dashboard).await?;
        let defects = client
            .list_defects()
            .await
            .map_err(|e| e.on_screen(DASHBOARD_FAILED))?;
        Ok(Self {
            user,
            stats: dashboard(&defects),
        })
    }
}

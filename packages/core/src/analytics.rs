// ABOUTME: Aggregate counts computed from the full defect list
// ABOUTME: Feeds the analytics page, the dashboard and the server-side summary views

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::parse_timestamp;
use crate::types::{Defect, DefectStatus, Id, Priority};

/// Number of rows in the dashboard's "recent activity" list
pub const RECENT_DEFECTS: usize = 5;

/// Row of `GET /analytics/defects-per-building`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingDefectCount {
    pub building_id: Id,
    pub building_name: String,
    pub defect_count: u64,
}

/// Row of `GET /analytics/defects-status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusCount {
    pub status: DefectStatus,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectSummary {
    pub total: usize,
    /// Every status, zero counts included, in lifecycle order
    pub by_status: Vec<(DefectStatus, usize)>,
    /// Every priority, zero counts included, highest first
    pub by_priority: Vec<(Priority, usize)>,
    /// Whole percent of defects that reached Completed
    pub completion_rate: u32,
    pub created_this_month: usize,
}

impl DefectSummary {
    pub fn count(&self, status: DefectStatus) -> usize {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.by_priority
            .iter()
            .find(|(p, _)| *p == priority)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

pub fn summarize(defects: &[Defect]) -> DefectSummary {
    summarize_at(defects, Utc::now())
}

pub fn summarize_at(defects: &[Defect], now: DateTime<Utc>) -> DefectSummary {
    let total = defects.len();

    let by_status = DefectStatus::ALL
        .into_iter()
        .map(|status| (status, defects.iter().filter(|d| d.status == status).count()))
        .collect::<Vec<_>>();

    let by_priority = [Priority::High, Priority::Medium, Priority::Low]
        .into_iter()
        .map(|priority| (priority, defects.iter().filter(|d| d.priority == priority).count()))
        .collect();

    let completed = defects
        .iter()
        .filter(|d| d.status == DefectStatus::Completed)
        .count();

    let created_this_month = defects
        .iter()
        .filter_map(|d| d.created_at.as_deref().and_then(parse_timestamp))
        .filter(|created| created.year() == now.year() && created.month() == now.month())
        .count();

    DefectSummary {
        total,
        by_status,
        by_priority,
        completion_rate: completion_rate(completed, total),
        created_this_month,
    }
}

/// `round(completed / total * 100)`, 0 for an empty list
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// Headline numbers on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub open: usize,
    pub ongoing: usize,
    pub completed: usize,
    pub recent: Vec<Defect>,
}

pub fn dashboard(defects: &[Defect]) -> DashboardStats {
    let count = |status: DefectStatus| defects.iter().filter(|d| d.status == status).count();

    let mut recent = defects.to_vec();
    recent.sort_by_key(|d| std::cmp::Reverse(d.updated_at_millis()));
    recent.truncate(RECENT_DEFECTS);

    DashboardStats {
        total: defects.len(),
        open: count(DefectStatus::Open),
        ongoing: count(DefectStatus::Ongoing),
        completed: count(DefectStatus::Completed),
        recent,
    }
}

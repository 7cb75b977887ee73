// ABOUTME: Offline snapshots of the in-memory defect list
// ABOUTME: CSV with building and assignee names, XLSX matching the analytics download

pub mod csv;
pub mod error;
pub mod xlsx;

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use defects_core::{Building, Defect, Id, User};

pub use error::{ExportError, ExportResult};
pub use xlsx::{Cell, Column, Sheet};

/// Worksheet name used for the analytics download
pub const SHEET_NAME: &str = "Defects";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "defects-analytics.csv",
            ExportFormat::Xlsx => "defects-analytics.xlsx",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// One defect flattened for export, with ids resolved to names
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub id: Id,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub building: String,
    pub assignee: String,
    pub created_at: String,
    pub updated_at: String,
}

pub fn export_rows(defects: &[Defect], buildings: &[Building], users: &[User]) -> Vec<ExportRow> {
    let building_names: HashMap<Id, &str> =
        buildings.iter().map(|b| (b.id, b.name.as_str())).collect();
    let user_names: HashMap<Id, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();

    defects
        .iter()
        .map(|defect| ExportRow {
            id: defect.id,
            title: defect.title.clone(),
            status: defect.status.as_str().to_string(),
            priority: defect.priority.as_str().to_string(),
            building: defect
                .building_id
                .and_then(|id| building_names.get(&id).copied())
                .unwrap_or_default()
                .to_string(),
            assignee: defect
                .assigned_technician_id
                .and_then(|id| user_names.get(&id).copied())
                .unwrap_or_default()
                .to_string(),
            created_at: defect.created_at.clone().unwrap_or_default(),
            updated_at: defect.updated_at.clone().unwrap_or_default(),
        })
        .collect()
}

/// The analytics worksheet: ID, Title, Status, Priority, Created At
pub fn analytics_sheet(defects: &[Defect]) -> Sheet {
    let mut sheet = Sheet::new(
        SHEET_NAME,
        vec![
            Column::new("ID", 10.0),
            Column::new("Title", 40.0),
            Column::new("Status", 14.0),
            Column::new("Priority", 12.0),
            Column::new("Created At", 24.0),
        ],
    );

    for defect in defects {
        sheet.push_row(vec![
            Cell::from(defect.id),
            Cell::from(defect.title.as_str()),
            Cell::from(defect.status.as_str()),
            Cell::from(defect.priority.as_str()),
            Cell::from(defect.created_at.clone().unwrap_or_default()),
        ]);
    }

    sheet
}

/// Render a snapshot in the requested format
pub fn render(
    format: ExportFormat,
    defects: &[Defect],
    buildings: &[Building],
    users: &[User],
) -> ExportResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => {
            Ok(csv::build_csv(&export_rows(defects, buildings, users)).into_bytes())
        }
        ExportFormat::Xlsx => analytics_sheet(defects).to_xlsx(),
    }
}

/// Render and write a snapshot to `path`
pub async fn write_snapshot(
    path: &Path,
    format: ExportFormat,
    defects: &[Defect],
    buildings: &[Building],
    users: &[User],
) -> ExportResult<usize> {
    let bytes = render(format, defects, buildings, users)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &bytes).await?;
    info!(path = %path.display(), rows = defects.len(), "Wrote defect export");
    Ok(bytes.len())
}

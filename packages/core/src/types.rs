// ABOUTME: Domain types mirroring the defect tracker REST API payloads
// ABOUTME: Defects, buildings, users, roles and the per-defect comment set

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::dates;

/// Numeric primary key used by every resource on the server
pub type Id = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

/// User role. Decides navigation, comment tabs and defect actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    Csr,
    BuildingExecutive,
    Technician,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Csr,
        Role::BuildingExecutive,
        Role::Technician,
        Role::Admin,
    ];

    /// Parse a role the way the server stores it: trimmed, lowercased,
    /// with a space standing in for the underscore ("Building Executive").
    pub fn normalize(raw: &str) -> Result<Self, UnknownRole> {
        let normalized = raw.trim().to_lowercase().replace(' ', "_");
        match normalized.as_str() {
            "csr" => Ok(Role::Csr),
            "building_executive" => Ok(Role::BuildingExecutive),
            "technician" => Ok(Role::Technician),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Csr => "csr",
            Role::BuildingExecutive => "building_executive",
            Role::Technician => "technician",
            Role::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Csr => "CSR",
            Role::BuildingExecutive => "Building Executive",
            Role::Technician => "Technician",
            Role::Admin => "Admin",
        }
    }

    /// True when the role appears in `roles`
    pub fn is_one_of(&self, roles: &[Role]) -> bool {
        roles.contains(self)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Csr
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::normalize(&value)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::normalize(s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lifecycle status of a defect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefectStatus {
    Open,
    Reviewed,
    Ongoing,
    Done,
    Completed,
}

impl DefectStatus {
    pub const ALL: [DefectStatus; 5] = [
        DefectStatus::Open,
        DefectStatus::Reviewed,
        DefectStatus::Ongoing,
        DefectStatus::Done,
        DefectStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectStatus::Open => "Open",
            DefectStatus::Reviewed => "Reviewed",
            DefectStatus::Ongoing => "Ongoing",
            DefectStatus::Done => "Done",
            DefectStatus::Completed => "Completed",
        }
    }
}

impl Default for DefectStatus {
    fn default() -> Self {
        DefectStatus::Open
    }
}

impl FromStr for DefectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DefectStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

impl fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Defect priority levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

/// A logged facility issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Defect {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: DefectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub initial_report_image: Option<String>,
    #[serde(default)]
    pub technician_report_image: Option<String>,
    #[serde(default)]
    pub building_id: Option<Id>,
    #[serde(default)]
    pub reporter_id: Option<Id>,
    #[serde(default)]
    pub reviewed_by: Option<Id>,
    #[serde(default)]
    pub assigned_technician_id: Option<Id>,
    #[serde(default)]
    pub external_contractor: bool,
    #[serde(default)]
    pub contractor_name: Option<String>,
    #[serde(default)]
    pub done_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Defect {
    /// Photo captured when the defect was filed. Older records only carry `image_url`.
    pub fn initial_photo(&self) -> Option<&str> {
        self.initial_report_image
            .as_deref()
            .or(self.image_url.as_deref())
            .filter(|value| !value.is_empty())
    }

    pub fn technician_photo(&self) -> Option<&str> {
        self.technician_report_image
            .as_deref()
            .filter(|value| !value.is_empty())
    }

    pub fn created_at_millis(&self) -> i64 {
        dates::timestamp_millis(self.created_at.as_deref())
    }

    pub fn updated_at_millis(&self) -> i64 {
        dates::timestamp_millis(self.updated_at.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Building {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One of the five free-text report fields attached to a defect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CommentField {
    InitialReport,
    ExecutiveDecision,
    TechnicianReport,
    VerificationReport,
    FinalCompletion,
}

impl CommentField {
    /// Tab order on the detail screen
    pub const ALL: [CommentField; 5] = [
        CommentField::InitialReport,
        CommentField::ExecutiveDecision,
        CommentField::TechnicianReport,
        CommentField::VerificationReport,
        CommentField::FinalCompletion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentField::InitialReport => "initial_report",
            CommentField::ExecutiveDecision => "executive_decision",
            CommentField::TechnicianReport => "technician_report",
            CommentField::VerificationReport => "verification_report",
            CommentField::FinalCompletion => "final_completion",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CommentField::InitialReport => "Initial Report",
            CommentField::ExecutiveDecision => "Executive Decision",
            CommentField::TechnicianReport => "Technician Report",
            CommentField::VerificationReport => "Verification Report",
            CommentField::FinalCompletion => "Final Completion",
        }
    }
}

impl FromStr for CommentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        CommentField::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| format!("Unknown report field: {}", s))
    }
}

impl fmt::Display for CommentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A comment row as returned by `GET /defects/:id/comments`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommentRecord {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub defect_id: Option<Id>,
    #[serde(default)]
    pub initial_report: Option<String>,
    #[serde(default)]
    pub executive_decision: Option<String>,
    #[serde(default)]
    pub technician_report: Option<String>,
    #[serde(default)]
    pub verification_report: Option<String>,
    #[serde(default)]
    pub final_completion: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl CommentRecord {
    pub fn get(&self, field: CommentField) -> Option<&str> {
        let value = match field {
            CommentField::InitialReport => &self.initial_report,
            CommentField::ExecutiveDecision => &self.executive_decision,
            CommentField::TechnicianReport => &self.technician_report,
            CommentField::VerificationReport => &self.verification_report,
            CommentField::FinalCompletion => &self.final_completion,
        };
        value.as_deref()
    }
}

/// Current value of each report field. Last write wins, no history is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentSet {
    values: BTreeMap<CommentField, String>,
}

impl CommentSet {
    /// Collapse comment rows into one value per field, keeping the latest
    /// non-empty value seen in server order.
    pub fn merge(records: &[CommentRecord]) -> Self {
        let mut set = CommentSet::default();
        for record in records {
            for field in CommentField::ALL {
                if let Some(value) = record.get(field).filter(|v| !v.is_empty()) {
                    set.values.insert(field, value.to_string());
                }
            }
        }
        set
    }

    pub fn get(&self, field: CommentField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: CommentField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Payload for `POST /defects`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefectCreate {
    pub title: String,
    pub description: String,
    pub building_id: Option<Id>,
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_report: Option<String>,
    pub initial_report_image: Option<String>,
    pub image_url: Option<String>,
    pub external_contractor: bool,
    pub contractor_name: Option<String>,
}

impl DefectCreate {
    /// Attach a photo. Both image fields carry the same data URI.
    pub fn with_photo(mut self, data_uri: impl Into<String>) -> Self {
        let data_uri = data_uri.into();
        self.image_url = Some(data_uri.clone());
        self.initial_report_image = Some(data_uri);
        self
    }

    /// Toggle the contractor flag. Unchecking also drops the name.
    pub fn set_external_contractor(&mut self, enabled: bool) {
        self.external_contractor = enabled;
        if !enabled {
            self.contractor_name = None;
        }
    }
}

/// A single-field (or photo pair) update for `PUT /defects/:id`.
///
/// Kept as a JSON object so that clearing a photo sends an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectUpdate {
    fields: serde_json::Map<String, serde_json::Value>,
    /// First field set; the map itself is ordered by key
    primary: Option<String>,
}

impl DefectUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        if self.primary.is_none() {
            self.primary = Some(name.to_string());
        }
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn status(self, status: DefectStatus) -> Self {
        self.field("status", status.as_str())
    }

    pub fn priority(self, priority: Priority) -> Self {
        self.field("priority", priority.as_str())
    }

    pub fn external_contractor(self, enabled: bool) -> Self {
        self.field("external_contractor", enabled)
    }

    pub fn contractor_name(self, name: &str) -> Self {
        self.field("contractor_name", name)
    }

    pub fn initial_photo(self, data_uri: &str) -> Self {
        self.field("initial_report_image", data_uri)
    }

    pub fn technician_photo(self, data_uri: &str) -> Self {
        self.field("technician_report_image", data_uri)
    }

    /// Remove the initial photo, including the legacy `image_url` copy
    pub fn clear_initial_photo(self) -> Self {
        self.field("initial_report_image", serde_json::Value::Null)
            .field("image_url", serde_json::Value::Null)
    }

    pub fn clear_technician_photo(self) -> Self {
        self.field("technician_report_image", serde_json::Value::Null)
    }

    /// Name of the first field, used to build "Failed to update {field}"
    pub fn primary_field(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.fields.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildingInput {
    pub name: String,
    pub address: String,
}

/// Payload for creating or editing a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for UserInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: Role::Csr,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

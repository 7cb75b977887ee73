// ABOUTME: Defect lifecycle actions and the local checks run before calling the server
// ABOUTME: Open -> Reviewed -> Ongoing -> Done -> Completed, with reopen back to Open

use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::{CommentField, Defect, DefectStatus, Id, Role};

pub const PHOTO_REQUIRED: &str = "Completed job photo is required.";
pub const TECHNICIAN_REQUIRED: &str = "Select a technician to assign.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Completed job photo is required.")]
    PhotoRequired,

    #[error("Select a technician to assign.")]
    TechnicianRequired,

    #[error("A {role} cannot {action} this defect")]
    NotPermitted { action: DefectAction, role: Role },

    #[error("Cannot {action} a defect that is {from}")]
    IllegalTransition {
        action: DefectAction,
        from: DefectStatus,
    },
}

/// HTTP verb used by an action endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMethod {
    Patch,
    Delete,
}

/// The fixed action set on the defect detail screen, one endpoint each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectAction {
    Review,
    Assign,
    Ongoing,
    Done,
    Complete,
    Reopen,
    Delete,
}

impl DefectAction {
    pub const ALL: [DefectAction; 7] = [
        DefectAction::Review,
        DefectAction::Assign,
        DefectAction::Ongoing,
        DefectAction::Done,
        DefectAction::Complete,
        DefectAction::Reopen,
        DefectAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectAction::Review => "review",
            DefectAction::Assign => "assign",
            DefectAction::Ongoing => "ongoing",
            DefectAction::Done => "done",
            DefectAction::Complete => "complete",
            DefectAction::Reopen => "reopen",
            DefectAction::Delete => "delete",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            DefectAction::Review => "reviewed",
            DefectAction::Assign => "assigned",
            DefectAction::Ongoing => "marked ongoing",
            DefectAction::Done => "marked done",
            DefectAction::Complete => "completed",
            DefectAction::Reopen => "reopened",
            DefectAction::Delete => "deleted",
        }
    }

    pub fn method(&self) -> ActionMethod {
        match self {
            DefectAction::Delete => ActionMethod::Delete,
            _ => ActionMethod::Patch,
        }
    }

    /// Path below `/defects/:id`. Delete targets the defect itself.
    pub fn path_segment(&self) -> Option<&'static str> {
        match self {
            DefectAction::Delete => None,
            other => Some(other.as_str()),
        }
    }

    /// Status the server moves the defect to
    pub fn resulting_status(&self) -> Option<DefectStatus> {
        match self {
            DefectAction::Review => Some(DefectStatus::Reviewed),
            DefectAction::Assign | DefectAction::Ongoing => Some(DefectStatus::Ongoing),
            DefectAction::Done => Some(DefectStatus::Done),
            DefectAction::Complete => Some(DefectStatus::Completed),
            DefectAction::Reopen => Some(DefectStatus::Open),
            DefectAction::Delete => None,
        }
    }

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            DefectAction::Review
            | DefectAction::Assign
            | DefectAction::Complete
            | DefectAction::Reopen => &[Role::BuildingExecutive, Role::Admin],
            DefectAction::Ongoing | DefectAction::Done => &[Role::Technician, Role::Admin],
            DefectAction::Delete => &[Role::Admin],
        }
    }

    /// Report fields the endpoint accepts alongside the transition
    pub fn accepted_reports(&self) -> &'static [CommentField] {
        match self {
            DefectAction::Review => &[CommentField::ExecutiveDecision],
            DefectAction::Ongoing => &[CommentField::TechnicianReport],
            DefectAction::Done => &[
                CommentField::TechnicianReport,
                CommentField::VerificationReport,
            ],
            DefectAction::Complete => &[
                CommentField::VerificationReport,
                CommentField::FinalCompletion,
            ],
            DefectAction::Assign | DefectAction::Reopen | DefectAction::Delete => &[],
        }
    }

    /// Statuses the lifecycle normally moves from. Only consulted in strict mode.
    pub fn conventional_sources(&self) -> &'static [DefectStatus] {
        match self {
            DefectAction::Review => &[DefectStatus::Open],
            DefectAction::Assign => &[
                DefectStatus::Open,
                DefectStatus::Reviewed,
                DefectStatus::Ongoing,
            ],
            DefectAction::Ongoing => &[DefectStatus::Reviewed, DefectStatus::Ongoing],
            DefectAction::Done => &[DefectStatus::Ongoing],
            DefectAction::Complete => &[DefectStatus::Done],
            DefectAction::Reopen | DefectAction::Delete => &DefectStatus::ALL,
        }
    }

    /// Fallback shown when the server gives no message
    pub fn failure_message(&self) -> String {
        format!("Failed to {} defect", self.as_str())
    }
}

impl FromStr for DefectAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DefectAction::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| format!("Unknown action: {}", s))
    }
}

impl fmt::Display for DefectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far the client checks transitions before sending them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Offer every action the role may take, whatever the current status
    #[default]
    RoleOnly,
    /// Also refuse actions outside the conventional lifecycle order
    Strict,
}

/// The signed-in user performing an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Id,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Id, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Technicians may only progress work assigned to them
    pub fn may_perform(&self, action: DefectAction, defect: &Defect) -> bool {
        if !self.role.is_one_of(action.allowed_roles()) {
            return false;
        }
        match (self.role, action) {
            (Role::Technician, DefectAction::Ongoing | DefectAction::Done) => {
                defect.assigned_technician_id == Some(self.user_id)
            }
            _ => true,
        }
    }

    /// Actions to offer for a defect, in display order
    pub fn available_actions(&self, defect: &Defect, policy: TransitionPolicy) -> Vec<DefectAction> {
        DefectAction::ALL
            .into_iter()
            .filter(|action| self.may_perform(*action, defect))
            .filter(|action| {
                policy == TransitionPolicy::RoleOnly
                    || action.conventional_sources().contains(&defect.status)
            })
            .collect()
    }
}

/// Values staged on the detail screen before an action is submitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionInput {
    /// JPEG data URI of the completed job photo
    pub technician_photo: Option<String>,
    pub technician_id: Option<Id>,
    pub reports: Vec<(CommentField, String)>,
    pub external_contractor: Option<bool>,
    pub contractor_name: Option<String>,
}

/// A request ready to be sent to the action endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action: DefectAction,
    pub defect_id: Id,
    pub body: Value,
}

impl ActionRequest {
    /// Path relative to the API base
    pub fn path(&self) -> String {
        match self.action.path_segment() {
            Some(segment) => format!("/defects/{}/{}", self.defect_id, segment),
            None => format!("/defects/{}", self.defect_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    Send(ActionRequest),
    /// Nothing to do, e.g. re-assigning the current technician
    Unchanged,
}

/// Validate an action locally and build its request body.
///
/// Fails without touching the network when a precondition is missing.
pub fn prepare(
    action: DefectAction,
    defect: &Defect,
    actor: &Actor,
    input: ActionInput,
    policy: TransitionPolicy,
) -> Result<Prepared, WorkflowError> {
    if !actor.may_perform(action, defect) {
        return Err(WorkflowError::NotPermitted {
            action,
            role: actor.role,
        });
    }

    let mut body = Map::new();
    for (field, text) in &input.reports {
        let text = text.trim();
        if !text.is_empty() && action.accepted_reports().contains(field) {
            body.insert(field.as_str().to_string(), json!(text));
        }
    }

    match action {
        DefectAction::Done => {
            let photo = input
                .technician_photo
                .filter(|photo| !photo.is_empty())
                .ok_or(WorkflowError::PhotoRequired)?;
            body.insert("technician_report_image".to_string(), json!(photo));
        }
        DefectAction::Assign => {
            let technician_id = input.technician_id.ok_or(WorkflowError::TechnicianRequired)?;
            if defect.assigned_technician_id == Some(technician_id) {
                return Ok(Prepared::Unchanged);
            }
            body.insert("assigned_technician_id".to_string(), json!(technician_id));
        }
        DefectAction::Review => {
            if let Some(enabled) = input.external_contractor {
                body.insert("external_contractor".to_string(), json!(enabled));
            }
            if let Some(name) = input.contractor_name {
                body.insert("contractor_name".to_string(), json!(name.trim()));
            }
        }
        _ => {}
    }

    // missing input is reported before the lifecycle check
    if policy == TransitionPolicy::Strict && !action.conventional_sources().contains(&defect.status) {
        return Err(WorkflowError::IllegalTransition {
            action,
            from: defect.status,
        });
    }

    Ok(Prepared::Send(ActionRequest {
        action,
        defect_id: defect.id,
        body: Value::Object(body),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn defect(status: DefectStatus, assigned: Option<Id>) -> Defect {
        serde_json::from_value(json!({
            "id": 12,
            "title": "Cracked window",
            "status": status.as_str(),
            "assigned_technician_id": assigned,
        }))
        .unwrap()
    }

    fn admin() -> Actor {
        Actor::new(1, Role::Admin)
    }

    #[test]
    fn test_done_without_photo_is_rejected_locally() {
        let result = prepare(
            DefectAction::Done,
            &defect(DefectStatus::Done, Some(5)),
            &admin(),
            ActionInput::default(),
            TransitionPolicy::RoleOnly,
        );
        assert_eq!(result, Err(WorkflowError::PhotoRequired));
        assert_eq!(
            WorkflowError::PhotoRequired.to_string(),
            "Completed job photo is required."
        );
    }

    #[test]
    fn test_done_carries_photo() {
        let input = ActionInput {
            technician_photo: Some("data:image/jpeg;base64,AAA".into()),
            reports: vec![(CommentField::TechnicianReport, " replaced seal ".into())],
            ..Default::default()
        };
        let prepared = prepare(
            DefectAction::Done,
            &defect(DefectStatus::Ongoing, Some(5)),
            &Actor::new(5, Role::Technician),
            input,
            TransitionPolicy::RoleOnly,
        )
        .unwrap();

        let Prepared::Send(request) = prepared else {
            panic!("expected a request");
        };
        assert_eq!(request.path(), "/defects/12/done");
        assert_eq!(
            request.body,
            json!({
                "technician_report": "replaced seal",
                "technician_report_image": "data:image/jpeg;base64,AAA"
            })
        );
    }

    #[test]
    fn test_assign_requires_technician() {
        let result = prepare(
            DefectAction::Assign,
            &defect(DefectStatus::Open, None),
            &admin(),
            ActionInput::default(),
            TransitionPolicy::RoleOnly,
        );
        assert_eq!(result, Err(WorkflowError::TechnicianRequired));
    }

    #[test]
    fn test_assign_same_technician_is_noop() {
        let input = ActionInput {
            technician_id: Some(9),
            ..Default::default()
        };
        let result = prepare(
            DefectAction::Assign,
            &defect(DefectStatus::Ongoing, Some(9)),
            &admin(),
            input,
            TransitionPolicy::RoleOnly,
        );
        assert_eq!(result, Ok(Prepared::Unchanged));
    }

    #[test]
    fn test_role_only_policy_allows_review_of_completed_defect() {
        let result = prepare(
            DefectAction::Review,
            &defect(DefectStatus::Completed, None),
            &admin(),
            ActionInput::default(),
            TransitionPolicy::RoleOnly,
        );
        assert!(matches!(result, Ok(Prepared::Send(_))));
    }

    #[test]
    fn test_strict_policy_reports_missing_photo_first() {
        let result = prepare(
            DefectAction::Done,
            &defect(DefectStatus::Done, Some(5)),
            &admin(),
            ActionInput::default(),
            TransitionPolicy::Strict,
        );
        assert_eq!(result, Err(WorkflowError::PhotoRequired));

        let input = ActionInput {
            technician_photo: Some("data:image/jpeg;base64,AAA".into()),
            ..Default::default()
        };
        let result = prepare(
            DefectAction::Done,
            &defect(DefectStatus::Done, Some(5)),
            &admin(),
            input,
            TransitionPolicy::Strict,
        );
        assert_eq!(
            result,
            Err(WorkflowError::IllegalTransition {
                action: DefectAction::Done,
                from: DefectStatus::Done,
            })
        );
    }

    #[test]
    fn test_strict_policy_rejects_out_of_order_review() {
        let result = prepare(
            DefectAction::Review,
            &defect(DefectStatus::Completed, None),
            &admin(),
            ActionInput::default(),
            TransitionPolicy::Strict,
        );
        assert_eq!(
            result,
            Err(WorkflowError::IllegalTransition {
                action: DefectAction::Review,
                from: DefectStatus::Completed,
            })
        );
    }

    #[test]
    fn test_technician_must_be_assigned() {
        let tech = Actor::new(5, Role::Technician);
        assert!(tech.may_perform(DefectAction::Ongoing, &defect(DefectStatus::Reviewed, Some(5))));
        assert!(!tech.may_perform(DefectAction::Ongoing, &defect(DefectStatus::Reviewed, Some(6))));
        assert!(!tech.may_perform(DefectAction::Review, &defect(DefectStatus::Open, Some(5))));
    }

    #[test]
    fn test_available_actions_for_csr_is_empty() {
        let csr = Actor::new(3, Role::Csr);
        assert!(csr
            .available_actions(&defect(DefectStatus::Open, None), TransitionPolicy::RoleOnly)
            .is_empty());
    }

    #[test]
    fn test_delete_path_and_method() {
        assert_eq!(DefectAction::Delete.method(), ActionMethod::Delete);
        assert_eq!(DefectAction::Delete.path_segment(), None);
        assert_eq!(DefectAction::Reopen.resulting_status(), Some(DefectStatus::Open));
        assert_eq!(DefectAction::Assign.failure_message(), "Failed to assign defect");
    }
}

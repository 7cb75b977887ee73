// ABOUTME: Detail page controller for a single defect
// ABOUTME: Loads the defect with its secondary data, saves report tabs, runs actions and attribute edits

use tracing::{debug, warn};

use defects_core::permissions::{
    can_edit_contractor, can_edit_initial_photo, can_edit_priority, can_edit_status,
    can_edit_tab, can_edit_technician_photo, editable_tabs, loads_technician_roster, NavItem,
    PERMISSION_DENIED,
};
use defects_core::validator::validate_comment;
use defects_core::{
    prepare, ActionInput, Actor, Building, CommentField, CommentSet, Defect, DefectAction,
    DefectStatus, DefectUpdate, Id, Prepared, Priority, TransitionPolicy, User,
};
use defects_media::{detail_photo, ImageUpload};

use super::SessionGate;
use crate::api::ActionResponse;
use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

pub const LOAD_FAILED: &str = "Failed to load defect";
pub const COMMENT_FAILED: &str = "Failed to save comment";
pub const PHOTO_DELETE_FAILED: &str = "Failed to delete photo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    /// Photo attached when the defect was filed
    Initial,
    /// Completed job photo
    Technician,
}

impl PhotoKind {
    pub fn label(&self) -> &'static str {
        match self {
            PhotoKind::Initial => "initial report photo",
            PhotoKind::Technician => "completed job photo",
        }
    }

    fn field(&self) -> &'static str {
        match self {
            PhotoKind::Initial => "initial_report_image",
            PhotoKind::Technician => "technician_report_image",
        }
    }

    fn may_edit(&self, role: defects_core::Role) -> bool {
        match self {
            PhotoKind::Initial => can_edit_initial_photo(role),
            PhotoKind::Technician => can_edit_technician_photo(role),
        }
    }
}

/// Result of running an action from the detail page
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Updated,
    /// Nothing was sent
    Unchanged,
    /// The defect no longer exists; leave the page
    Deleted,
}

pub struct DefectDetailScreen {
    client: ApiClient,
    user: User,
    policy: TransitionPolicy,
    pub defect: Defect,
    pub comments: CommentSet,
    pub building: Option<Building>,
    pub assignee: Option<User>,
    pub technicians: Vec<User>,
    staged_technician_photo: Option<String>,
}

impl DefectDetailScreen {
    pub async fn load(client: &ApiClient, id: Id, policy: TransitionPolicy) -> ClientResult<Self> {
        let user = SessionGate::new(client).require(NavItem::Defects).await?;
        let defect = client
            .get_defect(id)
            .await
            .map_err(|e| e.on_screen(LOAD_FAILED))?;

        let mut screen = Self {
            client: client.clone(),
            user,
            policy,
            defect,
            comments: CommentSet::default(),
            building: None,
            assignee: None,
            technicians: Vec::new(),
            staged_technician_photo: None,
        };
        screen.load_secondary().await;
        Ok(screen)
    }

    /// Fetch the defect again, then its secondary data
    pub async fn reload(&mut self) -> ClientResult<()> {
        self.defect = self
            .client
            .get_defect(self.defect.id)
            .await
            .map_err(|e| e.on_screen(LOAD_FAILED))?;
        self.load_secondary().await;
        Ok(())
    }

    /// Comments, building, assignee and roster each fail on their own
    async fn load_secondary(&mut self) {
        let id = self.defect.id;

        self.comments = match self.client.get_comments(id).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!("Comments for defect {} unavailable: {}", id, e);
                CommentSet::default()
            }
        };

        self.building = match self.defect.building_id {
            Some(building_id) => match self.client.get_building(building_id).await {
                Ok(building) => Some(building),
                Err(e) => {
                    warn!("Building {} unavailable: {}", building_id, e);
                    None
                }
            },
            None => None,
        };

        self.assignee = match self.defect.assigned_technician_id {
            Some(user_id) => match self.client.get_user(user_id).await {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Assigned technician {} unavailable: {}", user_id, e);
                    None
                }
            },
            None => None,
        };

        if loads_technician_roster(self.user.role) {
            match self.client.list_technicians().await {
                Ok(technicians) => self.technicians = technicians,
                Err(e) => warn!("Technician roster unavailable: {}", e),
            }
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.user.id, self.user.role)
    }

    pub fn editable_tabs(&self) -> Vec<CommentField> {
        editable_tabs(self.user.role)
    }

    pub fn available_actions(&self) -> Vec<DefectAction> {
        self.actor().available_actions(&self.defect, self.policy)
    }

    /// Save one report tab. Blank text is rejected before any request.
    pub async fn save_comment(&mut self, field: CommentField, text: &str) -> ClientResult<()> {
        if !can_edit_tab(self.user.role, field) {
            return Err(ClientError::forbidden(PERMISSION_DENIED));
        }
        let text = validate_comment(text)?;

        let record = self
            .client
            .update_comment(self.defect.id, field, &text)
            .await
            .map_err(|e| e.on_screen(COMMENT_FAILED))?;

        let saved = record
            .get(field)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or(text);
        self.comments.set(field, saved);
        Ok(())
    }

    /// Keep an optimized completion photo for the next `done` action
    pub fn stage_technician_photo(&mut self, upload: &ImageUpload) -> ClientResult<()> {
        self.staged_technician_photo = Some(detail_photo(upload)?);
        Ok(())
    }

    pub fn staged_technician_photo(&self) -> Option<&str> {
        self.staged_technician_photo.as_deref()
    }

    pub fn clear_staged_photo(&mut self) {
        self.staged_technician_photo = None;
    }

    /// Validate an action locally, send it, then reload the page
    pub async fn perform(
        &mut self,
        action: DefectAction,
        mut input: ActionInput,
    ) -> ClientResult<ActionOutcome> {
        if input.technician_photo.is_none() {
            input.technician_photo = self.staged_technician_photo.clone();
        }

        let request = match prepare(action, &self.defect, &self.actor(), input, self.policy)? {
            Prepared::Send(request) => request,
            Prepared::Unchanged => {
                debug!("{} on defect {} changes nothing", action, self.defect.id);
                return Ok(ActionOutcome::Unchanged);
            }
        };

        let response = self
            .client
            .run_action(&request)
            .await
            .map_err(|e| e.on_screen(&action.failure_message()))?;

        match response {
            ActionResponse::Deleted => Ok(ActionOutcome::Deleted),
            ActionResponse::Updated(defect) => {
                self.defect = *defect;
                if action == DefectAction::Done {
                    self.staged_technician_photo = None;
                }
                self.reload().await?;
                Ok(ActionOutcome::Updated)
            }
        }
    }

    /// Send a `PUT` with the given fields and adopt the returned defect
    pub async fn update_attribute(&mut self, update: DefectUpdate) -> ClientResult<()> {
        if update.is_empty() {
            return Ok(());
        }
        let fallback = format!(
            "Failed to update {}",
            update.primary_field().unwrap_or("defect")
        );

        self.defect = self
            .client
            .update_defect(self.defect.id, &update)
            .await
            .map_err(|e| e.on_screen(&fallback))?;
        Ok(())
    }

    pub async fn set_status(&mut self, status: DefectStatus) -> ClientResult<()> {
        self.ensure(can_edit_status(self.user.role))?;
        self.update_attribute(DefectUpdate::new().status(status)).await
    }

    pub async fn set_priority(&mut self, priority: Priority) -> ClientResult<()> {
        self.ensure(can_edit_priority(self.user.role))?;
        self.update_attribute(DefectUpdate::new().priority(priority))
            .await
    }

    pub async fn set_external_contractor(&mut self, enabled: bool) -> ClientResult<()> {
        self.ensure(can_edit_contractor(self.user.role))?;
        self.update_attribute(DefectUpdate::new().external_contractor(enabled))
            .await
    }

    /// Returns `false` when the trimmed name matches what is stored
    pub async fn save_contractor_name(&mut self, name: &str) -> ClientResult<bool> {
        self.ensure(can_edit_contractor(self.user.role))?;
        let name = name.trim();
        if self.defect.contractor_name.as_deref().unwrap_or("") == name {
            return Ok(false);
        }
        self.update_attribute(DefectUpdate::new().contractor_name(name))
            .await?;
        Ok(true)
    }

    /// Cover-fit the upload into the detail frame and store it
    pub async fn replace_photo(&mut self, kind: PhotoKind, upload: &ImageUpload) -> ClientResult<()> {
        self.ensure(kind.may_edit(self.user.role))?;
        let data_uri = detail_photo(upload)?;
        let update = match kind {
            PhotoKind::Initial => DefectUpdate::new().initial_photo(&data_uri),
            PhotoKind::Technician => DefectUpdate::new().technician_photo(&data_uri),
        };
        debug!("Replacing {} on defect {}", kind.field(), self.defect.id);
        self.update_attribute(update).await
    }

    pub async fn delete_photo(&mut self, kind: PhotoKind) -> ClientResult<()> {
        self.ensure(kind.may_edit(self.user.role))?;
        let update = match kind {
            PhotoKind::Initial => DefectUpdate::new().clear_initial_photo(),
            PhotoKind::Technician => DefectUpdate::new().clear_technician_photo(),
        };

        self.defect = self
            .client
            .update_defect(self.defect.id, &update)
            .await
            .map_err(|e| e.on_screen(PHOTO_DELETE_FAILED))?;
        self.reload().await
    }

    fn ensure(&self, allowed: bool) -> ClientResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(ClientError::forbidden(PERMISSION_DENIED))
        }
    }
}

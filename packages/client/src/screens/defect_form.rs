use tracing::warn;

use defects_core::permissions::{can_create_defect, PERMISSION_DENIED};
use defects_core::validator::validate_defect;
use defects_core::{Building, Defect, DefectCreate, Priority, User};
use defects_media::{form_photo, ImageUpload};

use super::SessionGate;
use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

pub const CREATE_FAILED: &str = "Failed to create defect";
pub const BUILDINGS_FAILED: &str = "Failed to load buildings";

/// New-defect form
pub struct DefectFormScreen {
    client: ApiClient,
    pub user: User,
    pub buildings: Vec<Building>,
    /// Set when the building list could not be fetched; the form still opens
    pub load_error: Option<String>,
}

impl DefectFormScreen {
    pub async fn load(client: &ApiClient) -> ClientResult<Self> {
        let user = SessionGate::new(client).user().await?;
        if !can_create_defect(user.role) {
            return Err(ClientError::forbidden(PERMISSION_DENIED));
        }

        let (buildings, load_error) = match client.list_buildings().await {
            Ok(buildings) => (buildings, None),
            Err(e) => {
                warn!("Building list unavailable: {}", e);
                (Vec::new(), Some(e.user_message(BUILDINGS_FAILED)))
            }
        };

        Ok(Self {
            client: client.clone(),
            user,
            buildings,
            load_error,
        })
    }

    /// Empty form with the default priority selected
    pub fn blank() -> DefectCreate {
        DefectCreate {
            priority: Some(Priority::Medium),
            ..DefectCreate::default()
        }
    }

    /// Scale the photo down and attach it to both image fields
    pub fn attach_photo(form: DefectCreate, upload: &ImageUpload) -> ClientResult<DefectCreate> {
        Ok(form.with_photo(form_photo(upload)?))
    }

    /// Validate locally, then create the defect
    pub async fn submit(&self, mut form: DefectCreate) -> ClientResult<Defect> {
        let errors = validate_defect(&form);
        if !errors.is_empty() {
            return Err(ClientError::validation(errors));
        }

        if form
            .initial_report
            .as_deref()
            .is_some_and(|text| text.trim().is_empty())
        {
            form.initial_report = None;
        }
        if form
            .contractor_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            form.contractor_name = None;
        }

        self.client
            .create_defect(&form)
            .await
            .map_err(|e| e.on_screen(CREATE_FAILED))
    }
}

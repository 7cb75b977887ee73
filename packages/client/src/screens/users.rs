use defects_core::permissions::NavItem;
use defects_core::validator::{normalize_user_input, validate_user, validate_user_deletion};
use defects_core::{Id, User, UserInput};

use super::SessionGate;
use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

pub const LOAD_FAILED: &str = "Failed to load users";
pub const SAVE_FAILED: &str = "Failed to save user. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete user";

/// Account management, admin only
pub struct UsersScreen {
    client: ApiClient,
    pub user: User,
    pub users: Vec<User>,
}

impl UsersScreen {
    pub async fn load(client: &ApiClient) -> ClientResult<Self> {
        let user = SessionGate::new(client).require(NavItem::Users).await?;
        let users = client
            .list_users()
            .await
            .map_err(|e| e.on_screen(LOAD_FAILED))?;
        Ok(Self {
            client: client.clone(),
            user,
            users,
        })
    }

    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.users = self
            .client
            .list_users()
            .await
            .map_err(|e| e.on_screen(LOAD_FAILED))?;
        Ok(())
    }

    /// Create when `id` is `None`, otherwise edit. A blank password on edit keeps the old one.
    pub async fn save(&mut self, id: Option<Id>, input: UserInput) -> ClientResult<User> {
        let errors = validate_user(&input, id.is_none());
        if !errors.is_empty() {
            return Err(ClientError::validation(errors));
        }
        let input = normalize_user_input(input);

        let saved = match id {
            Some(id) => self.client.update_user(id, &input).await,
            None => self.client.create_user(&input).await,
        }
        .map_err(|e| e.on_screen(SAVE_FAILED))?;

        self.refresh().await?;
        Ok(saved)
    }

    pub async fn delete(&mut self, id: Id) -> ClientResult<()> {
        validate_user_deletion(self.user.id, id)?;
        self.client
            .delete_user(id)
            .await
            .map_err(|e| e.on_screen(DELETE_FAILED))?;
        self.users.retain(|u| u.id != id);
        Ok(())
    }
}

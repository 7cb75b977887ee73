use defects_core::permissions::{navigation, NavItem, PERMISSION_DENIED};
use defects_core::User;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

/// Decides whether the current session may see a page
pub struct SessionGate<'a> {
    client: &'a ApiClient,
}

impl<'a> SessionGate<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The signed-in user, or `NotAuthenticated`
    pub async fn user(&self) -> ClientResult<User> {
        self.client
            .current_user()
            .await
            .ok_or(ClientError::NotAuthenticated)
    }

    /// The signed-in user, provided their role can open `item`
    pub async fn require(&self, item: NavItem) -> ClientResult<User> {
        let user = self.user().await?;
        if !item.is_visible_to(user.role) {
            return Err(ClientError::forbidden(PERMISSION_DENIED));
        }
        Ok(user)
    }

    pub async fn navigation(&self) -> ClientResult<Vec<NavItem>> {
        Ok(navigation(self.user().await?.role))
    }
}

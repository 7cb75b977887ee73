use reqwest::Method;

use defects_core::{Id, User, UserInput};

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get_json("/users").await
    }

    pub async fn get_user(&self, id: Id) -> ClientResult<User> {
        self.get_json(&format!("/users/{}", id)).await
    }

    pub async fn list_technicians(&self) -> ClientResult<Vec<User>> {
        self.get_json("/users/technicians").await
    }

    pub async fn create_user(&self, input: &UserInput) -> ClientResult<User> {
        let body = serde_json::to_value(input)?;
        self.send_json(Method::POST, "/users", &body).await
    }

    pub async fn update_user(&self, id: Id, input: &UserInput) -> ClientResult<User> {
        let body = serde_json::to_value(input)?;
        self.send_json(Method::PUT, &format!("/users/{}", id), &body)
            .await
    }

    pub async fn delete_user(&self, id: Id) -> ClientResult<()> {
        self.send_unit(Method::DELETE, &format!("/users/{}", id), None)
            .await
    }
}

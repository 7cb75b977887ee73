use reqwest::Method;

use defects_core::{Building, BuildingInput, Id};

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    pub async fn list_buildings(&self) -> ClientResult<Vec<Building>> {
        self.get_json("/buildings").await
    }

    pub async fn get_building(&self, id: Id) -> ClientResult<Building> {
        self.get_json(&format!("/buildings/{}", id)).await
    }

    pub async fn create_building(&self, input: &BuildingInput) -> ClientResult<Building> {
        let body = serde_json::to_value(input)?;
        self.send_json(Method::POST, "/buildings", &body).await
    }

    pub async fn update_building(&self, id: Id, input: &BuildingInput) -> ClientResult<Building> {
        let body = serde_json::to_value(input)?;
        self.send_json(Method::PUT, &format!("/buildings/{}", id), &body)
            .await
    }

    pub async fn delete_building(&self, id: Id) -> ClientResult<()> {
        self.send_unit(Method::DELETE, &format!("/buildings/{}", id), None)
            .await
    }
}

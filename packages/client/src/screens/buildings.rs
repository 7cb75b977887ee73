use defects_core::permissions::NavItem;
use defects_core::validator::validate_building;
use defects_core::{Building, BuildingInput, Id, User};

use super::SessionGate;
use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

pub const LOAD_FAILED: &str = "Failed to load buildings";
pub const SAVE_FAILED: &str = "Failed to save building.";
pub const DELETE_FAILED: &str = "Failed to delete building";

pub struct BuildingsScreen {
    client: ApiClient,
    pub user: User,
    pub buildings: Vec<Building>,
}

impl BuildingsScreen {
    pub async fn load(client: &ApiClient) -> ClientResult<Self> {
        let user = SessionGate::new(client).require(NavItem::Buildings).await?;
        let buildings = client
            .list_buildings()
            .await
            .map_err(|e| e.on_screen(LOAD_FAILED))?;
        Ok(Self {
            client: client.clone(),
            user,
            buildings,
        })
    }

    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.buildings = self
            .client
            .list_buildings()
            .await
            .map_err(|e| e.on_screen(LOAD_FAILED))?;
        Ok(())
    }

    /// Create when `id` is `None`, otherwise edit; the list is refetched afterwards
    pub async fn save(&mut self, id: Option<Id>, input: BuildingInput) -> ClientResult<Building> {
        let errors = validate_building(&input);
        if !errors.is_empty() {
            return Err(ClientError::validation(errors));
        }
        let input = BuildingInput {
            name: input.name.trim().to_string(),
            address: input.address.trim().to_string(),
        };

        let saved = match id {
            Some(id) => self.client.update_building(id, &input).await,
            None => self.client.create_building(&input).await,
        }
        .map_err(|e| e.on_screen(SAVE_FAILED))?;

        self.refresh().await?;
        Ok(saved)
    }

    pub async fn delete(&mut self, id: Id) -> ClientResult<()> {
        self.client
            .delete_building(id)
            .await
            .map_err(|e| e.on_screen(DELETE_FAILED))?;
        self.buildings.retain(|b| b.id != id);
        Ok(())
    }
}

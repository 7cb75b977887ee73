use tracing::warn;

use defects_core::permissions::{loads_technician_roster, NavItem};
use defects_core::{Building, Defect, DefectListState, Id, PaginationMeta, User};

use super::SessionGate;
use crate::client::ApiClient;
use crate::error::ClientResult;

pub const LOAD_FAILED: &str = "Failed to load defects";

/// One rendered page of the list
#[derive(Debug, Clone, PartialEq)]
pub struct DefectPage {
    pub rows: Vec<Defect>,
    pub meta: PaginationMeta,
}

/// Everything fetched up front; filtering, sorting and paging happen locally
pub struct DefectListScreen {
    pub user: User,
    defects: Vec<Defect>,
    buildings: Vec<Building>,
    technicians: Vec<User>,
    state: DefectListState,
}

impl DefectListScreen {
    /// Defects and buildings must both load. A failed technician roster only
    /// logs a warning and leaves the assignee names blank.
    pub async fn load(client: &ApiClient, page_size: usize) -> ClientResult<Self> {
        let user = SessionGate::new(client).require(NavItem::Defects).await?;

        let (defects, buildings) = tokio::try_join!(client.list_defects(), client.list_buildings())
            .map_err(|e| e.on_screen(LOAD_FAILED))?;

        let technicians = if loads_technician_roster(user.role) {
            client.list_technicians().await.unwrap_or_else(|e| {
                warn!("Technician roster unavailable: {}", e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        Ok(Self {
            user,
            defects,
            buildings,
            technicians,
            state: DefectListState::with_page_size(page_size),
        })
    }

    pub fn state(&self) -> &DefectListState {
        &self.state
    }

    /// Filter and sort setters on the state reset the page
    pub fn state_mut(&mut self) -> &mut DefectListState {
        &mut self.state
    }

    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn technicians(&self) -> &[User] {
        &self.technicians
    }

    pub fn building_name(&self, id: Option<Id>) -> Option<&str> {
        let id = id?;
        self.buildings
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.name.as_str())
    }

    pub fn technician_name(&self, id: Option<Id>) -> Option<&str> {
        let id = id?;
        self.technicians
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }

    /// Every row passing the filter, in sort order
    pub fn visible(&self) -> Vec<Defect> {
        self.state.visible(&self.defects, &self.buildings)
    }

    /// Recount the filtered rows and slice out the current page
    pub fn page(&mut self) -> DefectPage {
        let visible = self.visible();
        self.state.page_mut().set_total(visible.len());
        DefectPage {
            rows: self.state.page().slice(&visible).to_vec(),
            meta: self.state.page().meta(),
        }
    }
}

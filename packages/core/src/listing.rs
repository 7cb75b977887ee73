// ABOUTME: Client-side filtering, search and sorting for the defect list
// ABOUTME: Every defect is fetched up front; this module derives the visible subset

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::pagination::{PageState, DEFECT_LIST_PAGE_SIZE};
use crate::types::{Building, Defect, DefectStatus, Id};

/// Building filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildingFilter {
    #[default]
    All,
    Only(Id),
}

/// Status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(DefectStatus),
}

/// Assignee filter, including an explicit "nobody assigned" choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssigneeFilter {
    #[default]
    All,
    Unassigned,
    Technician(Id),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectFilter {
    pub building: BuildingFilter,
    pub status: StatusFilter,
    pub assignee: AssigneeFilter,
    pub search: String,
}

impl DefectFilter {
    /// Conjunction of every active predicate
    pub fn matches(&self, defect: &Defect, building_names: &HashMap<Id, String>) -> bool {
        let building_ok = match self.building {
            BuildingFilter::All => true,
            BuildingFilter::Only(id) => defect.building_id == Some(id),
        };
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => defect.status == status,
        };
        let assignee_ok = match self.assignee {
            AssigneeFilter::All => true,
            AssigneeFilter::Unassigned => defect.assigned_technician_id.is_none(),
            AssigneeFilter::Technician(id) => defect.assigned_technician_id == Some(id),
        };

        building_ok && status_ok && assignee_ok && self.matches_search(defect, building_names)
    }

    /// Case-insensitive substring match on title, building name or id
    fn matches_search(&self, defect: &Defect, building_names: &HashMap<Id, String>) -> bool {
        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let building_name = defect
            .building_id
            .and_then(|id| building_names.get(&id))
            .map(|name| name.to_lowercase())
            .unwrap_or_default();

        defect.title.to_lowercase().contains(&query)
            || building_name.contains(&query)
            || defect.id.to_string().contains(&query)
    }

    pub fn is_active(&self) -> bool {
        *self != DefectFilter::default()
    }
}

/// Columns the list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    Title,
    Building,
    Status,
    Assignee,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Title => "title",
            SortKey::Building => "building_id",
            SortKey::Status => "status",
            SortKey::Assignee => "assigned_technician_id",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }

    fn compare(&self, a: &Defect, b: &Defect) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Building => a.building_id.cmp(&b.building_id),
            SortKey::Status => a
                .status
                .as_str()
                .to_lowercase()
                .cmp(&b.status.as_str().to_lowercase()),
            SortKey::Assignee => a.assigned_technician_id.cmp(&b.assigned_technician_id),
            SortKey::CreatedAt => a.created_at_millis().cmp(&b.created_at_millis()),
            SortKey::UpdatedAt => a.updated_at_millis().cmp(&b.updated_at_millis()),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "title" => Ok(SortKey::Title),
            "building" | "building_id" => Ok(SortKey::Building),
            "status" => Ok(SortKey::Status),
            "assignee" | "assigned_technician_id" => Ok(SortKey::Assignee),
            "created" | "created_at" => Ok(SortKey::CreatedAt),
            "updated" | "updated_at" => Ok(SortKey::UpdatedAt),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    /// Most recently updated first
    fn default() -> Self {
        Self {
            key: SortKey::UpdatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Same key flips direction, a new key starts ascending
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.reversed();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }

    /// Stable sort in place
    pub fn apply(&self, defects: &mut [Defect]) {
        defects.sort_by(|a, b| {
            let ordering = self.key.compare(a, b);
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

/// Filter, sort and page state of the defect list screen
#[derive(Debug, Clone)]
pub struct DefectListState {
    filter: DefectFilter,
    sort: SortConfig,
    page: PageState,
}

impl Default for DefectListState {
    fn default() -> Self {
        Self::with_page_size(DEFECT_LIST_PAGE_SIZE)
    }
}

impl DefectListState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            filter: DefectFilter::default(),
            sort: SortConfig::default(),
            page: PageState::new(page_size),
        }
    }

    pub fn filter(&self) -> &DefectFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut PageState {
        &mut self.page
    }

    pub fn set_building(&mut self, building: BuildingFilter) {
        self.filter.building = building;
        self.page.reset_page();
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.filter.status = status;
        self.page.reset_page();
    }

    pub fn set_assignee(&mut self, assignee: AssigneeFilter) {
        self.filter.assignee = assignee;
        self.page.reset_page();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.page.reset_page();
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
        self.page.reset_page();
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
        self.page.reset_page();
    }

    /// Every defect passing the filter, in sort order
    pub fn visible(&self, defects: &[Defect], buildings: &[Building]) -> Vec<Defect> {
        let names = building_names(buildings);
        let mut rows: Vec<Defect> = defects
            .iter()
            .filter(|defect| self.filter.matches(defect, &names))
            .cloned()
            .collect();
        self.sort.apply(&mut rows);
        rows
    }

    /// The current page of the visible rows
    pub fn current_page(&self, defects: &[Defect], buildings: &[Building]) -> Vec<Defect> {
        let rows = self.visible(defects, buildings);
        self.page.slice(&rows).to_vec()
    }
}

pub fn building_names(buildings: &[Building]) -> HashMap<Id, String> {
    buildings
        .iter()
        .map(|building| (building.id, building.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn defect(id: Id, title: &str, building: Id, status: &str, assignee: Option<Id>, updated: &str) -> Defect {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "building_id": building,
            "status": status,
            "assigned_technician_id": assignee,
            "updated_at": updated,
        }))
        .unwrap()
    }

    fn buildings() -> Vec<Building> {
        vec![
            Building {
                id: 1,
                name: "North Tower".into(),
                address: None,
                created_at: None,
                updated_at: None,
            },
            Building {
                id: 2,
                name: "Harbour View".into(),
                address: None,
                created_at: None,
                updated_at: None,
            },
        ]
    }

    fn sample() -> Vec<Defect> {
        vec![
            defect(1, "Leaking tap", 1, "Open", None, "2024-01-01T00:00:00"),
            defect(2, "Broken lift", 2, "Ongoing", Some(7), "2024-01-03T00:00:00"),
            defect(13, "loose tile", 1, "Done", Some(8), "2024-01-02T00:00:00"),
            defect(21, "Cracked window", 2, "Open", Some(7), "2024-01-04T00:00:00"),
        ]
    }

    fn ids(rows: &[Defect]) -> Vec<Id> {
        rows.iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_default_order_is_updated_desc() {
        let state = DefectListState::default();
        assert_eq!(ids(&state.visible(&sample(), &buildings())), vec![21, 2, 13, 1]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let mut state = DefectListState::default();
        state.set_building(BuildingFilter::Only(2));
        state.set_status(StatusFilter::Only(DefectStatus::Open));
        assert_eq!(ids(&state.visible(&sample(), &buildings())), vec![21]);
    }

    #[test]
    fn test_unassigned_filter() {
        let mut state = DefectListState::default();
        state.set_assignee(AssigneeFilter::Unassigned);
        assert_eq!(ids(&state.visible(&sample(), &buildings())), vec![1]);

        state.set_assignee(AssigneeFilter::Technician(7));
        assert_eq!(ids(&state.visible(&sample(), &buildings())), vec![21, 2]);
    }

    #[test]
    fn test_search_matches_title_building_and_id() {
        let mut state = DefectListState::default();

        state.set_search("HARBOUR");
        assert_eq!(ids(&state.visible(&sample(), &buildings())), vec![21, 2]);

        state.set_search("tile");
        assert_eq!(ids(&state.visible(&sample(), &buildings())), vec![13]);

        state.set_search("1");
        assert_eq!(ids(&state.visible(&sample(), &buildings())), vec![21, 13, 1]);
    }

    #[test]
    fn test_toggle_same_key_reverses_order() {
        let mut state = DefectListState::default();
        state.toggle_sort(SortKey::Title);
        assert_eq!(state.sort().direction, SortDirection::Asc);
        let ascending = ids(&state.visible(&sample(), &buildings()));
        assert_eq!(ascending, vec![2, 21, 1, 13]);

        state.toggle_sort(SortKey::Title);
        let mut descending = ids(&state.visible(&sample(), &buildings()));
        descending.reverse();
        assert_eq!(descending, ascending);
    }

    #[test]
    fn test_switching_key_starts_ascending() {
        let mut sort = SortConfig::new(SortKey::Title, SortDirection::Desc);
        sort.toggle(SortKey::Id);
        assert_eq!(sort, SortConfig::new(SortKey::Id, SortDirection::Asc));
    }

    #[test]
    fn test_sort_is_idempotent() {
        let sort = SortConfig::new(SortKey::Status, SortDirection::Asc);
        let mut once = sample();
        sort.apply(&mut once);
        let mut twice = once.clone();
        sort.apply(&mut twice);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_missing_dates_sort_first_ascending() {
        let mut rows = sample();
        rows.push(serde_json::from_value(json!({"id": 99, "title": "No date"})).unwrap());
        SortConfig::new(SortKey::UpdatedAt, SortDirection::Asc).apply(&mut rows);
        assert_eq!(rows[0].id, 99);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let many: Vec<Defect> = (1..=25)
            .map(|id| defect(id, "Item", 1, "Open", None, "2024-01-01T00:00:00"))
            .collect();
        let mut state = DefectListState::default();
        state.page_mut().set_total(many.len());
        state.page_mut().goto(3);
        assert_eq!(state.page().page(), 3);
        assert_eq!(state.current_page(&many, &buildings()).len(), 5);

        state.set_status(StatusFilter::Only(DefectStatus::Open));
        assert_eq!(state.page().page(), 1);
    }
}

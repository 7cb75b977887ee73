// ABOUTME: Static role matrix for navigation, report tabs and defect attributes
// ABOUTME: The server remains the authority; these rules only decide what is offered

use crate::types::{CommentField, Role};

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_AND_EXECUTIVE: &[Role] = &[Role::Admin, Role::BuildingExecutive];
const ADMIN_AND_CSR: &[Role] = &[Role::Admin, Role::Csr];
const OFFICE_ROLES: &[Role] = &[Role::Admin, Role::BuildingExecutive, Role::Csr];
const FIELD_ROLES: &[Role] = &[Role::Admin, Role::BuildingExecutive, Role::Technician];

/// Message shown when a role opens a screen it cannot use
pub const PERMISSION_DENIED: &str = "You don't have permission to access this page.";

/// Roles allowed to edit a report tab
pub fn tab_editors(field: CommentField) -> &'static [Role] {
    match field {
        CommentField::InitialReport => &[Role::Csr, Role::Admin],
        CommentField::ExecutiveDecision => &[Role::BuildingExecutive, Role::Admin],
        CommentField::TechnicianReport => &[Role::Technician, Role::Admin],
        CommentField::VerificationReport => &[Role::BuildingExecutive, Role::Admin],
        CommentField::FinalCompletion => &[Role::BuildingExecutive, Role::Admin],
    }
}

pub fn can_edit_tab(role: Role, field: CommentField) -> bool {
    role.is_one_of(tab_editors(field))
}

/// Report tabs the role may write, in tab order
pub fn editable_tabs(role: Role) -> Vec<CommentField> {
    CommentField::ALL
        .into_iter()
        .filter(|field| can_edit_tab(role, *field))
        .collect()
}

pub fn can_edit_status(role: Role) -> bool {
    role.is_one_of(ADMIN_AND_EXECUTIVE)
}

pub fn can_edit_priority(role: Role) -> bool {
    role.is_one_of(ADMIN_AND_CSR)
}

pub fn can_edit_initial_photo(role: Role) -> bool {
    role.is_one_of(OFFICE_ROLES)
}

pub fn can_edit_technician_photo(role: Role) -> bool {
    role.is_one_of(FIELD_ROLES)
}

pub fn can_edit_contractor(role: Role) -> bool {
    role.is_one_of(ADMIN_AND_EXECUTIVE)
}

pub fn can_create_defect(role: Role) -> bool {
    role.is_one_of(OFFICE_ROLES)
}

pub fn can_delete_defect(role: Role) -> bool {
    role.is_one_of(ADMIN_ONLY)
}

/// Only roles that assign work need the technician roster
pub fn loads_technician_roster(role: Role) -> bool {
    role.is_one_of(ADMIN_AND_EXECUTIVE)
}

/// Top-level navigation entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Dashboard,
    Defects,
    Buildings,
    Users,
    Analytics,
}

impl NavItem {
    pub const ALL: [NavItem; 5] = [
        NavItem::Dashboard,
        NavItem::Defects,
        NavItem::Buildings,
        NavItem::Users,
        NavItem::Analytics,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Dashboard => "Dashboard",
            NavItem::Defects => "Defects",
            NavItem::Buildings => "Buildings",
            NavItem::Users => "Users",
            NavItem::Analytics => "Analytics",
        }
    }

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            NavItem::Dashboard | NavItem::Defects => &Role::ALL,
            NavItem::Buildings => OFFICE_ROLES,
            NavItem::Users | NavItem::Analytics => ADMIN_ONLY,
        }
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        role.is_one_of(self.allowed_roles())
    }
}

pub fn navigation(role: Role) -> Vec<NavItem> {
    NavItem::ALL
        .into_iter()
        .filter(|item| item.is_visible_to(role))
        .collect()
}

// ABOUTME: Core types and rules for the building defect tracker
// ABOUTME: Pure logic shared by the API client, exporters and the command line front end

pub mod analytics;
pub mod dates;
pub mod debounce;
pub mod listing;
pub mod pagination;
pub mod permissions;
pub mod types;
pub mod validator;
pub mod workflow;

// Re-export main types
pub use types::{
    Building, BuildingInput, CommentField, CommentRecord, CommentSet, Defect, DefectCreate,
    DefectStatus, DefectUpdate, Id, Priority, Role, SignupInput, UnknownRole, User, UserInput,
};

// Re-export list derivation
pub use listing::{
    AssigneeFilter, BuildingFilter, DefectFilter, DefectListState, SortConfig, SortDirection,
    SortKey, StatusFilter,
};
pub use pagination::{PageState, PaginationMeta, PaginationParams};

// Re-export workflow
pub use workflow::{
    prepare, ActionInput, ActionMethod, ActionRequest, Actor, DefectAction, Prepared,
    TransitionPolicy, WorkflowError,
};

// Re-export validation
pub use validator::ValidationError;

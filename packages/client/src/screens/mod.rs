// ABOUTME: Screen controllers: load what a page needs and apply its mutations
// ABOUTME: Each one owns its fallback error messages and the degrade-on-failure rules for secondary data

mod analytics;
mod buildings;
mod defect_detail;
mod defect_form;
mod defect_list;
mod gate;
mod users;

pub use analytics::{AnalyticsScreen, DashboardScreen};
pub use buildings::BuildingsScreen;
pub use defect_detail::{ActionOutcome, DefectDetailScreen, PhotoKind};
pub use defect_form::DefectFormScreen;
pub use defect_list::{DefectListScreen, DefectPage};
pub use gate::SessionGate;
pub use users::UsersScreen;

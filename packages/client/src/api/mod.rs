//! Endpoint wrappers, one module per resource

mod analytics;
mod auth;
mod buildings;
mod defects;
mod users;

pub use auth::LoginResponse;
pub use defects::ActionResponse;

/// `{"message": ...}` acknowledgement returned by delete and signup endpoints
#[derive(Debug, Clone, serde::Deserialize, PartialEq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

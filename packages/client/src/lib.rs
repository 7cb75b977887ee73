//! Client for the building defect service.
//!
//! [`ApiClient`] wraps the REST API with bearer authentication and a single
//! shared token refresh. The [`screens`] module holds one controller per page
//! of the application, each applying the page's permission checks, local
//! validation and error messages before anything reaches the network.

pub mod api;
pub mod client;
pub mod error;
pub mod screens;
pub mod session;

pub use api::{ActionResponse, LoginResponse, MessageResponse};
pub use client::{ApiClient, ClientConfig, DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS};
pub use error::{ClientError, ClientResult};
pub use session::{SessionStore, StoredSession};

pub mod analytics;
pub mod auth;
pub mod buildings;
pub mod dashboard;
pub mod defects;
pub mod users;
pub mod utils;

use defects_cli::Config;
use defects_client::ApiClient;

/// What every command handler needs
pub struct Context {
    pub client: ApiClient,
    pub config: Config,
}

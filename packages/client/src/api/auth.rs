use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use defects_core::{SignupInput, User};

use super::MessageResponse;
use crate::client::{check, decode, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::session::StoredSession;

/// Body of a successful `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

impl ApiClient {
    /// Sign in with HTTP Basic credentials and persist the returned session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let credentials = STANDARD.encode(format!("{}:{}", email, password));
        debug!("POST /auth/login");

        let response = self
            .http()
            .post(self.url("/auth/login"))
            .header(AUTHORIZATION, format!("Basic {}", credentials))
            .json(&json!({}))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.clear_session().await;
            let message = match check(response).await {
                Err(ClientError::Server {
                    message: Some(message),
                    ..
                }) => message,
                _ => "Could not verify".to_string(),
            };
            return Err(ClientError::auth(message));
        }

        let login: LoginResponse = decode(check(response).await?).await?;
        let user = login.user.clone();
        self.store_session(StoredSession::new(login.token, login.refresh_token, login.user))
            .await?;
        Ok(user)
    }

    /// Register an account, then sign in with the same credentials
    pub async fn signup(&self, input: &SignupInput) -> ClientResult<User> {
        let body = serde_json::to_value(input)?;
        let created: MessageResponse = self.send_json(Method::POST, "/auth/signup", &body).await?;
        debug!("Signup acknowledged: {}", created.message);
        self.login(&input.email, &input.password).await
    }

    /// Tell the server and forget the local session, even if the call fails
    pub async fn logout(&self) -> ClientResult<()> {
        if let Err(e) = self.send_unit(Method::POST, "/auth/logout", None).await {
            warn!("Logout request failed: {}", e);
        }
        self.clear_session().await;
        Ok(())
    }
}

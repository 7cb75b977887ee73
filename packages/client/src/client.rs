// ABOUTME: HTTP client for the defect service with bearer auth and session persistence
// ABOUTME: A 401 triggers one shared token refresh; waiting requests replay once with the new token

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use defects_core::User;

use crate::error::{ClientError, ClientResult};
use crate::session::{SessionStore, StoredSession};

pub use defects_config::{DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS};

/// Paths under this prefix never trigger a token refresh
const AUTH_PREFIX: &str = "/auth/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Session file; `None` keeps the session in memory only
    pub session_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            session_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }
}

#[derive(Default)]
struct SessionState {
    session: Option<StoredSession>,
    /// Bumped whenever the token changes or the session is cleared
    generation: u64,
}

struct Inner {
    http: Client,
    base_url: String,
    store: Option<SessionStore>,
    state: RwLock<SessionState>,
    refresh_lock: Mutex<()>,
}

/// Error payload returned by the service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "access_token")]
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

/// Cheap to clone; clones share the session and the refresh lock
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = url::Url::parse(config.base_url.trim())
            .map_err(|e| ClientError::config(format!("Invalid API URL '{}': {}", config.base_url, e)))?
            .to_string()
            .trim_end_matches('/')
            .to_string();

        let http = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                store: config.session_path.map(SessionStore::new),
                state: RwLock::new(SessionState::default()),
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    /// Build a client and restore any saved session
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        let client = Self::new(config)?;
        client.restore_session().await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    async fn restore_session(&self) -> ClientResult<()> {
        let Some(store) = &self.inner.store else {
            return Ok(());
        };
        match store.load().await {
            Ok(Some(session)) => {
                debug!("Restored session for {}", session.user.email);
                let mut state = self.inner.state.write().await;
                state.session = Some(session);
                state.generation += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Ignoring unreadable session file: {}", e);
            }
        }
        Ok(())
    }

    /// The signed-in user, if any
    pub async fn current_user(&self) -> Option<User> {
        self.inner
            .state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.read().await.session.is_some()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Replace the session and persist it
    pub(crate) async fn store_session(&self, session: StoredSession) -> ClientResult<()> {
        if let Some(store) = &self.inner.store {
            store.save(&session).await?;
        }
        info!("Signed in as {} ({})", session.user.email, session.user.role);
        let mut state = self.inner.state.write().await;
        state.session = Some(session);
        state.generation += 1;
        Ok(())
    }

    /// Drop the session from memory and disk
    pub(crate) async fn clear_session(&self) {
        {
            let mut state = self.inner.state.write().await;
            if state.session.is_some() {
                info!("Session cleared");
            }
            state.session = None;
            state.generation += 1;
        }
        if let Some(store) = &self.inner.store {
            if let Err(e) = store.clear().await {
                warn!("Failed to remove session file: {}", e);
            }
        }
    }

    async fn snapshot(&self) -> (Option<String>, u64) {
        let state = self.inner.state.read().await;
        (
            state.session.as_ref().map(|s| s.token.clone()),
            state.generation,
        )
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> ClientResult<Response> {
        debug!("{} {}", method, path);
        let mut request = self.inner.http.request(method.clone(), self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Send an authenticated request, refreshing the token once on a 401
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ClientResult<Response> {
        let (token, generation) = self.snapshot().await;
        let response = self.dispatch(&method, path, body, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check(response).await;
        }

        if path.starts_with(AUTH_PREFIX) {
            self.clear_session().await;
            return Err(check(response).await.err().unwrap_or(ClientError::SessionExpired));
        }

        let token = self.refresh_after(generation).await?;
        let response = self.dispatch(&method, path, body, Some(&token)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Request to {} rejected after token refresh", path);
            self.clear_session().await;
            return Err(ClientError::SessionExpired);
        }
        check(response).await
    }

    /// Obtain a fresh token. Only one refresh runs at a time; callers that
    /// saw an older generation reuse the token the winner obtained.
    async fn refresh_after(&self, seen_generation: u64) -> ClientResult<String> {
        let _guard = self.inner.refresh_lock.lock().await;

        {
            let state = self.inner.state.read().await;
            if state.generation != seen_generation {
                return match &state.session {
                    Some(session) => Ok(session.token.clone()),
                    None => Err(ClientError::SessionExpired),
                };
            }
        }

        match self.request_refresh().await {
            Ok(refreshed) => {
                let token = refreshed.token.clone();
                let session = {
                    let mut state = self.inner.state.write().await;
                    let Some(session) = state.session.as_mut() else {
                        return Err(ClientError::SessionExpired);
                    };
                    session.token = refreshed.token;
                    if refreshed.refresh_token.is_some() {
                        session.refresh_token = refreshed.refresh_token;
                    }
                    if let Some(user) = refreshed.user {
                        session.user = user;
                    }
                    session.saved_at = chrono::Utc::now();
                    let session = session.clone();
                    state.generation += 1;
                    session
                };
                if let Some(store) = &self.inner.store {
                    if let Err(e) = store.save(&session).await {
                        warn!("Failed to persist refreshed session: {}", e);
                    }
                }
                debug!("Session token refreshed");
                Ok(token)
            }
            Err(ClientError::NotAuthenticated) => Err(ClientError::NotAuthenticated),
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.clear_session().await;
                Err(ClientError::SessionExpired)
            }
        }
    }

    async fn request_refresh(&self) -> ClientResult<RefreshResponse> {
        let (token, refresh_token) = {
            let state = self.inner.state.read().await;
            match &state.session {
                Some(s) => (Some(s.token.clone()), s.refresh_token.clone()),
                None => return Err(ClientError::NotAuthenticated),
            }
        };

        let body = match refresh_token {
            Some(refresh_token) => json!({ "refresh_token": refresh_token }),
            None => json!({}),
        };
        let response = self
            .dispatch(&Method::POST, "/auth/refresh", Some(&body), token.as_deref())
            .await?;
        let response = check(response).await?;
        decode(response).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(Method::GET, path, None).await?;
        decode(response).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> ClientResult<T> {
        let response = self.send(method, path, Some(body)).await?;
        decode(response).await
    }

    /// Send a request whose response body is not needed
    pub(crate) async fn send_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ClientResult<()> {
        self.send(method, path, body).await?;
        Ok(())
    }
}

/// Turn a non-success response into `ClientError::Server`
pub(crate) async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{') && !trimmed.starts_with('<'))
                .then(|| trimmed.to_string())
        });

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

//! Session persistence for the signed-in user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use defects_core::User;

use crate::error::{ClientError, ClientResult};

/// Directory under the home folder holding client state
const SESSION_DIR: &str = ".defects";
const SESSION_FILE: &str = "session.toml";

/// Token and profile stored between runs.
///
/// Field order matters: TOML needs plain values before the `user` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub saved_at: DateTime<Utc>,
    pub user: User,
}

impl StoredSession {
    pub fn new(token: impl Into<String>, refresh_token: Option<String>, user: User) -> Self {
        Self {
            token: token.into(),
            refresh_token,
            saved_at: Utc::now(),
            user,
        }
    }
}

/// Reads and writes the session file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.defects/session.toml`
    pub fn default_location() -> ClientResult<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ClientError::config("Could not determine home directory"))?;
        Ok(Self::new(home_dir.join(SESSION_DIR).join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, `None` when nobody is signed in
    pub async fn load(&self) -> ClientResult<Option<StoredSession>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        let session = toml::from_str(&content)
            .map_err(|e| ClientError::config(format!("Invalid session file: {}", e)))?;
        Ok(Some(session))
    }

    pub async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(session)
            .map_err(|e| ClientError::config(format!("Failed to serialize session: {}", e)))?;
        fs::write(&self.path, content).await?;
        Ok(())
    }

    pub async fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

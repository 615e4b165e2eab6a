use std::env;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";
pub const DEFAULT_SESSION_DB: &str = "sqlite://projecthub-session.db?mode=rwc";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base: String,
    pub session_db_url: String,
    pub google_client_id: Option<String>,
    pub settings_toast: Duration,
    pub board_toast: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            session_db_url: DEFAULT_SESSION_DB.to_string(),
            google_client_id: None,
            settings_toast: Duration::from_millis(5000),
            board_toast: Duration::from_millis(3000),
        }
    }
}

impl ClientConfig {
    pub fn new_from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let api_base = env::var("PROJECTHUB_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let session_db_url =
            env::var("PROJECTHUB_SESSION_DB").unwrap_or(defaults.session_db_url);
        let google_client_id = env::var("PROJECTHUB_GOOGLE_CLIENT_ID")
            .ok()
            .filter(|v| !v.is_empty());
        let settings_toast =
            millis_from_env("PROJECTHUB_SETTINGS_TOAST_MS")?.unwrap_or(defaults.settings_toast);
        let board_toast =
            millis_from_env("PROJECTHUB_BOARD_TOAST_MS")?.unwrap_or(defaults.board_toast);

        Ok(Self {
            api_base,
            session_db_url,
            google_client_id,
            settings_toast,
            board_toast,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

fn millis_from_env(key: &str) -> Result<Option<Duration>, ClientError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ClientError::Config(format!("{} must be a number of milliseconds", key))),
        Err(_) => Ok(None),
    }
}

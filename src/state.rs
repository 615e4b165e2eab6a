use std::sync::Arc;

use crate::client::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::controllers::{
    AccountSettings, ActivityFeed, AuthFlow, Dashboard, ProjectList, TaskBoard, TeamDirectory,
};
use crate::error::ClientError;
use crate::session::{Session, SqliteTokenStore, TokenStore};
use crate::toast::Toast;

/// Everything a controller needs, wired once and handed out explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub backend: Arc<dyn Backend>,
    pub session: Arc<Session>,
}

impl AppContext {
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn Backend>,
        tokens: Option<Arc<dyn TokenStore>>,
    ) -> Self {
        let session = Arc::new(Session::new(backend.clone(), tokens));
        Self {
            config,
            backend,
            session,
        }
    }

    /// HTTP backend plus the sqlite token store named in the config.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let store = SqliteTokenStore::connect(&config.session_db_url).await?;
        let tokens: Arc<dyn TokenStore> = Arc::new(store);
        let backend: Arc<dyn Backend> =
            Arc::new(HttpBackend::new(config.clone(), Some(tokens.clone()))?);
        Ok(Self::new(config, backend, Some(tokens)))
    }

    pub fn auth_flow(&self) -> AuthFlow {
        AuthFlow::new(self.session.clone(), self.config.google_client_id.clone())
    }

    pub fn project_list(&self) -> ProjectList {
        ProjectList::new(self.backend.clone(), self.session.clone())
    }

    pub fn task_board(&self) -> TaskBoard {
        TaskBoard::new(
            self.backend.clone(),
            self.session.clone(),
            Toast::new(self.config.board_toast),
        )
    }

    pub fn account_settings(&self) -> AccountSettings {
        AccountSettings::new(
            self.backend.clone(),
            self.session.clone(),
            Toast::new(self.config.settings_toast),
        )
    }

    pub fn team(&self) -> TeamDirectory {
        TeamDirectory::new(self.backend.clone())
    }

    pub fn activity(&self) -> ActivityFeed {
        ActivityFeed::new(self.backend.clone())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.backend.clone())
    }
}

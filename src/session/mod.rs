//! Authenticated identity and bearer token for one client runtime.
//!
//! The token lives in a [`TokenStore`]; the identity is broadcast through a
//! `watch` channel so every subscriber sees the latest value immediately on
//! subscribing, and every later change.

pub mod store;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::Backend;
use crate::error::ClientError;
use crate::models::{AuthResponse, Identity, LoginRequest, SignupRequest};

pub use store::{MemoryTokenStore, SqliteTokenStore, TokenStore};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "ph_token";

pub struct Session {
    backend: Arc<dyn Backend>,
    tokens: Option<Arc<dyn TokenStore>>,
    identity: watch::Sender<Option<Identity>>,
}

impl Session {
    /// `tokens: None` models a runtime without persistent storage: the
    /// session then never reports itself as authenticated.
    pub fn new(backend: Arc<dyn Backend>, tokens: Option<Arc<dyn TokenStore>>) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            backend,
            tokens,
            identity,
        }
    }

    pub async fn login(&self, body: &LoginRequest) -> Result<Identity, ClientError> {
        let res = self.backend.login(body).await?;
        self.store_session(res).await
    }

    pub async fn signup(&self, body: &SignupRequest) -> Result<Identity, ClientError> {
        let res = self.backend.signup(body).await?;
        self.store_session(res).await
    }

    pub async fn login_with_federated_credential(
        &self,
        credential: &str,
    ) -> Result<Identity, ClientError> {
        let res = self.backend.google_login(credential).await?;
        self.store_session(res).await
    }

    /// Fetches `/auth/me` and publishes the result.
    pub async fn refresh_identity(&self) -> Result<Identity, ClientError> {
        let user = self.backend.me().await?;
        self.publish(Some(user.clone()));
        Ok(user)
    }

    pub async fn store_session(&self, res: AuthResponse) -> Result<Identity, ClientError> {
        if !res.token.is_empty() {
            if let Some(store) = &self.tokens {
                store.set(TOKEN_KEY, &res.token).await?;
            }
        }
        info!("Session established for user {}", res.user.id);
        self.publish(Some(res.user.clone()));
        Ok(res.user)
    }

    pub async fn logout(&self) {
        if let Some(store) = &self.tokens {
            if let Err(e) = store.remove(TOKEN_KEY).await {
                warn!("Failed to clear session token: {}", e);
            }
        }
        info!("Session cleared");
        self.publish(None);
    }

    pub async fn token(&self) -> Option<String> {
        let store = self.tokens.as_ref()?;
        match store.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.identity.borrow().as_ref().map(|u| u.id.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    pub fn publish(&self, identity: Option<Identity>) {
        self.identity.send_replace(identity);
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        self.backend.clone()
    }
}

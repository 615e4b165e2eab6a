use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::Backend;
use crate::controllers::cancellable;
use crate::error::ClientError;
use crate::models::DirectoryUser;

pub struct TeamDirectory {
    backend: Arc<dyn Backend>,
    cancel: CancellationToken,
    pub users: Vec<DirectoryUser>,
    pub error: Option<String>,
    pub invite_open: bool,
    pub invite_email: String,
    pub invite_loading: bool,
    pub invite_error: Option<String>,
    pub invite_success: Option<String>,
}

impl TeamDirectory {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            cancel: CancellationToken::new(),
            users: Vec::new(),
            error: None,
            invite_open: false,
            invite_email: String::new(),
            invite_loading: false,
            invite_error: None,
            invite_success: None,
        }
    }

    pub fn deactivate(&self) {
        self.cancel.cancel();
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.error = None;
        match cancellable(&self.cancel, self.backend.list_users()).await {
            Ok(users) => {
                self.users = users;
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!("Failed to load team: {}", e);
                    self.error = Some(e.user_message("Failed to load team"));
                }
                Err(e)
            }
        }
    }

    pub fn open_invite(&mut self) {
        self.invite_open = true;
        self.reset_invite();
    }

    pub fn close_invite(&mut self) {
        self.invite_open = false;
        self.reset_invite();
    }

    fn reset_invite(&mut self) {
        self.invite_email.clear();
        self.invite_loading = false;
        self.invite_error = None;
        self.invite_success = None;
    }

    pub async fn send_invitation(&mut self) -> Result<(), ClientError> {
        let email = self.invite_email.trim().to_string();
        if email.is_empty() {
            self.invite_error = Some("Email is required".to_string());
            return Err(ClientError::Validation("Email is required".to_string()));
        }

        self.invite_loading = true;
        self.invite_error = None;
        self.invite_success = None;
        let res = cancellable(&self.cancel, self.backend.invite_member(&email)).await;
        self.invite_loading = false;

        match res {
            Ok(()) => {
                info!("Invitation sent to {}", email);
                self.invite_success = Some("Invitation sent!".to_string());
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.invite_error = Some(e.user_message("Failed to send invite"));
                }
                Err(e)
            }
        }
    }
}

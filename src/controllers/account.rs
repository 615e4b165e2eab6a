use std::sync::Arc;

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::client::Backend;
use crate::controllers::cancellable;
use crate::error::ClientError;
use crate::models::{AuthMethod, Identity, Project, ResetPasswordRequest, UpdateProfileRequest};
use crate::routes::Route;
use crate::session::Session;
use crate::toast::Toast;

/// First letter of the first word, or of each of the first two words, upper-cased.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Profile form. The email is shown but never editable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    email: String,
}

impl ProfileForm {
    pub fn seed(&mut self, user: &Identity) {
        self.name = user.name.clone();
        self.email = user.email.clone();
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn email_editable(&self) -> bool {
        false
    }

    /// Only the name is validated; the email is read-only and never blocks a save.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountDeletion {
    /// Projects and account are gone and the session is cleared.
    Completed { redirect: Route },
    /// An owned project could not be deleted; the account was left alone.
    ProjectsFailed,
    /// Projects were removed but the account deletion itself failed.
    AccountFailed,
}

pub struct AccountSettings {
    backend: Arc<dyn Backend>,
    session: Arc<Session>,
    cancel: CancellationToken,
    pub toast: Toast,
    pub user: Option<Identity>,
    pub initials: String,
    pub profile: ProfileForm,
    pub profile_error: Option<String>,
    pub profile_success: Option<String>,
    pub password_mismatch: bool,
    pub delete_dialog_open: bool,
    pub owned_projects: Vec<Project>,
    pub delete_error: Option<String>,
}

impl AccountSettings {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<Session>, toast: Toast) -> Self {
        Self {
            backend,
            session,
            cancel: CancellationToken::new(),
            toast,
            user: None,
            initials: String::new(),
            profile: ProfileForm::default(),
            profile_error: None,
            profile_success: None,
            password_mismatch: false,
            delete_dialog_open: false,
            owned_projects: Vec::new(),
            delete_error: None,
        }
    }

    pub fn deactivate(&self) {
        self.cancel.cancel();
    }

    pub async fn activate(&mut self) -> Result<(), ClientError> {
        match cancellable(&self.cancel, self.session.refresh_identity()).await {
            Ok(user) => {
                self.set_user(user);
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!("Failed to load profile: {}", e);
                    self.profile_error = Some(e.user_message("Failed to load profile"));
                }
                Err(e)
            }
        }
    }

    fn set_user(&mut self, user: Identity) {
        self.initials = initials(&user.name);
        self.profile.seed(&user);
        self.user = Some(user);
    }

    /// Password reset only applies to accounts that sign in with a password.
    pub fn can_reset_password(&self) -> bool {
        matches!(
            self.user.as_ref().map(|u| &u.auth_method),
            Some(AuthMethod::Password)
        )
    }

    /// Does nothing when the form is invalid.
    pub async fn update_profile(&mut self) -> Result<(), ClientError> {
        if !self.profile.is_valid() {
            return Ok(());
        }
        self.profile_error = None;
        self.profile_success = None;

        let body = UpdateProfileRequest {
            name: self.profile.name.trim().to_string(),
            email: self.profile.email().to_string(),
        };
        match cancellable(&self.cancel, self.backend.update_profile(&body)).await {
            Ok(user) => {
                info!("Profile updated for {}", user.id);
                self.profile_success = Some("Profile updated!".to_string());
                self.session.publish(Some(user.clone()));
                self.set_user(user);
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.profile_error = Some(e.user_message("Failed to update profile"));
                }
                Err(e)
            }
        }
    }

    /// The confirmation must match byte for byte; a mismatch never reaches
    /// the backend.
    pub async fn reset_password(
        &mut self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ClientError> {
        self.password_mismatch = new_password != confirm_password;
        if self.password_mismatch {
            self.toast.error("Password Mismatch");
            return Err(ClientError::Validation("Password Mismatch".to_string()));
        }

        let body = ResetPasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        match cancellable(&self.cancel, self.backend.reset_password(&body)).await {
            Ok(()) => {
                self.toast.success("Password reset successfully.");
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.toast.error(e.user_message("Failed to reset password"));
                }
                Err(e)
            }
        }
    }

    async fn fetch_owned_projects(&self) -> Result<Vec<Project>, ClientError> {
        let Some(user_id) = self.user.as_ref().map(|u| u.id.clone()) else {
            return Ok(Vec::new());
        };
        let projects = cancellable(&self.cancel, self.backend.list_projects()).await?;
        Ok(projects.into_iter().filter(|p| p.owner == user_id).collect())
    }

    /// Opens the confirmation dialog and lists the projects that will go with
    /// the account.
    pub async fn open_delete_dialog(&mut self) -> Result<(), ClientError> {
        self.delete_dialog_open = true;
        self.delete_error = None;
        match self.fetch_owned_projects().await {
            Ok(projects) => {
                self.owned_projects = projects;
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!("Failed to list owned projects: {}", e);
                    self.owned_projects.clear();
                }
                Err(e)
            }
        }
    }

    pub fn close_delete_dialog(&mut self) {
        self.delete_dialog_open = false;
    }

    /// Deletes every owned project, and only once all of them are gone,
    /// the account itself.
    pub async fn confirm_delete_account(&mut self) -> Result<AccountDeletion, ClientError> {
        let owned = match self.fetch_owned_projects().await {
            Ok(owned) => owned,
            Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
            Err(e) => {
                error!("Failed to list owned projects before account deletion: {}", e);
                self.toast.error("Failed to delete projects before account deletion");
                self.delete_dialog_open = false;
                return Ok(AccountDeletion::ProjectsFailed);
            }
        };
        self.owned_projects = owned;

        if !self.owned_projects.is_empty() {
            let backend = self.backend.clone();
            let deletions = self
                .owned_projects
                .iter()
                .map(|p| backend.delete_project(&p.id));
            match cancellable(&self.cancel, try_join_all(deletions)).await {
                Ok(_) => info!("Deleted {} owned projects", self.owned_projects.len()),
                Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
                Err(e) => {
                    error!("Cascade delete failed: {}", e);
                    self.toast.error("Failed to delete projects before account deletion");
                    self.delete_dialog_open = false;
                    return Ok(AccountDeletion::ProjectsFailed);
                }
            }
        }

        self.delete_error = None;
        match cancellable(&self.cancel, self.backend.delete_account()).await {
            Ok(()) => {
                info!("Account deleted");
                self.session.logout().await;
                self.delete_dialog_open = false;
                Ok(AccountDeletion::Completed {
                    redirect: Route::Auth,
                })
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                error!("Account deletion failed: {}", e);
                self.delete_error = Some(e.user_message("Error deleting account"));
                Ok(AccountDeletion::AccountFailed)
            }
        }
    }
}

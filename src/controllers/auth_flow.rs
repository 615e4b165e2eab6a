//! Login, OTP-verified signup and federated sign-in.
//!
//! Signup walks `SignupEmail -> SignupOtp -> SignupPassword`; each step only
//! advances when its backend call succeeds, and the email verified by the
//! OTP step is carried inside the state so later steps cannot lose it.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::controllers::cancellable;
use crate::error::ClientError;
use crate::models::{LoginRequest, SignupRequest};
use crate::routes::Route;
use crate::session::Session;

pub const OTP_LEN: usize = 6;
const LOGIN_PASSWORD_MIN: usize = 6;
const SIGNUP_PASSWORD_MIN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStep {
    Login,
    SignupEmail,
    SignupOtp { email: String },
    SignupPassword { email: String },
}

impl AuthStep {
    pub fn mode(&self) -> AuthMode {
        match self {
            AuthStep::Login => AuthMode::Login,
            _ => AuthMode::Signup,
        }
    }

    pub fn otp_sent(&self) -> bool {
        matches!(self, AuthStep::SignupOtp { .. } | AuthStep::SignupPassword { .. })
    }

    pub fn otp_verified(&self) -> bool {
        matches!(self, AuthStep::SignupPassword { .. })
    }
}

/// Where input focus should go after an OTP box changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpFocus {
    Stay,
    Move(usize),
}

/// Six single-digit boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpCode {
    digits: [Option<char>; OTP_LEN],
}

impl OtpCode {
    /// Keeps only the first digit of `raw`; advances focus after a digit.
    pub fn input(&mut self, index: usize, raw: &str) -> OtpFocus {
        if index >= OTP_LEN {
            return OtpFocus::Stay;
        }
        let digit = raw.chars().find(char::is_ascii_digit);
        self.digits[index] = digit;
        match digit {
            Some(_) if index + 1 < OTP_LEN => OtpFocus::Move(index + 1),
            _ => OtpFocus::Stay,
        }
    }

    /// Backspace clears the box; on an already empty box focus moves back.
    pub fn backspace(&mut self, index: usize) -> OtpFocus {
        if index >= OTP_LEN {
            return OtpFocus::Stay;
        }
        if self.digits[index].take().is_some() {
            return OtpFocus::Stay;
        }
        if index > 0 {
            OtpFocus::Move(index - 1)
        } else {
            OtpFocus::Stay
        }
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    pub fn code(&self) -> Option<String> {
        self.digits.iter().copied().collect()
    }

    pub fn digit(&self, index: usize) -> Option<char> {
        self.digits.get(index).copied().flatten()
    }

    pub fn clear(&mut self) {
        self.digits = [None; OTP_LEN];
    }
}

pub fn validate_email(email: &str) -> Result<(), ClientError> {
    if email.trim().is_empty() {
        return Err(ClientError::Validation("Email is required".to_string()));
    }
    if !email.trim().to_string().validate_email() {
        return Err(ClientError::Validation("Enter a valid email".to_string()));
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ClientError> {
    validate_email(email)?;
    if password.chars().count() < LOGIN_PASSWORD_MIN {
        return Err(ClientError::Validation(format!(
            "Password must be at least {} characters",
            LOGIN_PASSWORD_MIN
        )));
    }
    Ok(())
}

/// At least seven characters with an upper-case letter, a lower-case letter
/// and a digit, confirmed exactly.
pub fn validate_signup_password(password: &str, confirm: &str) -> Result<(), ClientError> {
    let strong = password.chars().count() >= SIGNUP_PASSWORD_MIN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit());
    if !strong {
        return Err(ClientError::Validation(
            "Password must be at least 7 characters and include upper-case, lower-case and a number"
                .to_string(),
        ));
    }
    if password != confirm {
        return Err(ClientError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

pub struct AuthFlow {
    session: Arc<Session>,
    cancel: CancellationToken,
    step: AuthStep,
    google_client_id: Option<String>,
    widget_generation: u64,
    pub otp: OtpCode,
    pub submitting: bool,
    pub server_error: Option<String>,
    pub otp_error: Option<String>,
}

impl AuthFlow {
    pub fn new(session: Arc<Session>, google_client_id: Option<String>) -> Self {
        Self {
            session,
            cancel: CancellationToken::new(),
            step: AuthStep::Login,
            google_client_id,
            widget_generation: 1,
            otp: OtpCode::default(),
            submitting: false,
            server_error: None,
            otp_error: None,
        }
    }

    pub fn deactivate(&self) {
        self.cancel.cancel();
    }

    pub fn step(&self) -> &AuthStep {
        &self.step
    }

    pub fn mode(&self) -> AuthMode {
        self.step.mode()
    }

    pub fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref()
    }

    /// Bumped whenever the federated sign-in widget must be rendered again.
    pub fn widget_generation(&self) -> u64 {
        self.widget_generation
    }

    /// Switching modes drops all signup progress.
    pub fn switch(&mut self, mode: AuthMode) {
        self.step = match mode {
            AuthMode::Login => AuthStep::Login,
            AuthMode::Signup => AuthStep::SignupEmail,
        };
        self.server_error = None;
        self.otp_error = None;
        self.otp.clear();
        self.widget_generation += 1;
    }

    fn finish<T>(&mut self, res: Result<T, ClientError>, fallback: &str) -> Result<T, ClientError> {
        self.submitting = false;
        if let Err(e) = &res {
            if !e.is_cancelled() {
                warn!("{}: {}", fallback, e);
                self.server_error = Some(e.user_message(fallback));
            }
        }
        res
    }

    pub async fn submit_login(&mut self, email: &str, password: &str) -> Result<Route, ClientError> {
        validate_login(email, password)?;

        self.submitting = true;
        self.server_error = None;
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let res = cancellable(&self.cancel, self.session.login(&body)).await;
        let user = self.finish(res, "Login failed")?;
        info!("Logged in as {}", user.id);
        Ok(Route::Dashboard)
    }

    pub async fn submit_email(&mut self, email: &str) -> Result<(), ClientError> {
        if self.step != AuthStep::SignupEmail {
            return Err(ClientError::Validation("Not expecting an email".to_string()));
        }
        validate_email(email)?;

        self.submitting = true;
        self.server_error = None;
        let email = email.trim().to_string();
        let backend = self.session.backend();
        let res = cancellable(&self.cancel, backend.send_otp(&email)).await;
        self.finish(res, "Failed to send OTP")?;

        self.otp.clear();
        self.step = AuthStep::SignupOtp { email };
        Ok(())
    }

    pub async fn submit_otp(&mut self) -> Result<(), ClientError> {
        let AuthStep::SignupOtp { email } = &self.step else {
            return Err(ClientError::Validation("No code has been sent".to_string()));
        };
        let email = email.clone();
        let Some(code) = self.otp.code() else {
            self.otp_error = Some("Please fill all fields".to_string());
            return Err(ClientError::Validation("Please fill all fields".to_string()));
        };
        self.otp_error = None;

        let backend = self.session.backend();
        match cancellable(&self.cancel, backend.verify_otp(&email, &code)).await {
            Ok(()) => {
                self.step = AuthStep::SignupPassword { email };
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.otp_error = Some(e.user_message("OTP verification failed"));
                }
                Err(e)
            }
        }
    }

    pub async fn submit_password(&mut self, password: &str, confirm: &str) -> Result<Route, ClientError> {
        let AuthStep::SignupPassword { email } = &self.step else {
            return Err(ClientError::Validation("Email has not been verified".to_string()));
        };
        let email = email.clone();
        validate_signup_password(password, confirm)?;

        self.submitting = true;
        self.server_error = None;
        let body = SignupRequest {
            name: email.clone(),
            email,
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        };
        let res = cancellable(&self.cancel, self.session.signup(&body)).await;
        let user = self.finish(res, "Sign up failed")?;
        info!("Signed up as {}", user.id);
        Ok(Route::Dashboard)
    }

    /// `credential` is the opaque token handed over by the identity
    /// provider's widget.
    pub async fn submit_federated(&mut self, credential: &str) -> Result<Route, ClientError> {
        if credential.is_empty() {
            return Err(ClientError::Validation("Missing credential".to_string()));
        }

        self.submitting = true;
        self.server_error = None;
        let res = cancellable(
            &self.cancel,
            self.session.login_with_federated_credential(credential),
        )
        .await;
        let user = self.finish(res, "Google sign-in failed")?;
        info!("Signed in with federated credential as {}", user.id);
        Ok(Route::Dashboard)
    }
}

mod common;

use common::{FakeBackend, identity, session_with};
use projecthub::Route;
use projecthub::controllers::{AuthFlow, AuthMode, AuthStep};
use projecthub::session::{TOKEN_KEY, TokenStore};

fn enter_code(flow: &mut AuthFlow, code: &str) {
    for (i, c) in code.chars().enumerate() {
        flow.otp.input(i, &c.to_string());
    }
}

#[tokio::test]
async fn test_login_redirects_to_dashboard() {
    let backend = FakeBackend::new();
    backend.set_auth("T", identity("1", "A B"));
    let (session, _) = session_with(backend);
    let mut flow = AuthFlow::new(session.clone(), None);

    let route = flow.submit_login("a@b.com", "secret1").await.expect("login");

    assert_eq!(route, Route::Dashboard);
    assert!(flow.server_error.is_none());
    assert!(!flow.submitting);
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_login_failure_shows_server_message() {
    let backend = FakeBackend::new();
    let (session, _) = session_with(backend);
    let mut flow = AuthFlow::new(session, None);

    assert!(flow.submit_login("a@b.com", "secret1").await.is_err());
    assert_eq!(flow.server_error.as_deref(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_invalid_login_input_makes_no_call() {
    let backend = FakeBackend::new();
    let (session, _) = session_with(backend.clone());
    let mut flow = AuthFlow::new(session, None);

    assert!(flow.submit_login("not-an-email", "secret1").await.is_err());
    assert!(flow.submit_login("a@b.com", "short").await.is_err());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_signup_walks_through_otp_steps() {
    let backend = FakeBackend::new();
    backend.set_auth("S", identity("2", "new@b.com"));
    let (session, store) = session_with(backend.clone());
    let mut flow = AuthFlow::new(session, Some("client-id".to_string()));

    flow.switch(AuthMode::Signup);
    assert_eq!(flow.step(), &AuthStep::SignupEmail);

    flow.submit_email("new@b.com").await.expect("send otp");
    assert_eq!(
        flow.step(),
        &AuthStep::SignupOtp {
            email: "new@b.com".to_string()
        }
    );
    assert!(flow.step().otp_sent());

    enter_code(&mut flow, "123");
    assert!(flow.submit_otp().await.is_err());
    assert_eq!(flow.otp_error.as_deref(), Some("Please fill all fields"));
    assert_eq!(backend.count("verify_otp"), 0);

    enter_code(&mut flow, "123456");
    flow.submit_otp().await.expect("verify");
    assert!(flow.step().otp_verified());

    assert!(flow.submit_password("weak", "weak").await.is_err());
    assert_eq!(backend.count("signup"), 0);

    let route = flow.submit_password("Secret12", "Secret12").await.expect("signup");
    assert_eq!(route, Route::Dashboard);
    assert_eq!(backend.count("signup"), 1);
    assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("S"));
}

#[tokio::test]
async fn test_wrong_otp_stays_on_code_step() {
    let backend = FakeBackend::new();
    let (session, _) = session_with(backend);
    let mut flow = AuthFlow::new(session, None);
    flow.switch(AuthMode::Signup);
    flow.submit_email("new@b.com").await.expect("send otp");

    enter_code(&mut flow, "999999");
    assert!(flow.submit_otp().await.is_err());

    assert_eq!(flow.otp_error.as_deref(), Some("Invalid OTP"));
    assert!(matches!(flow.step(), AuthStep::SignupOtp { .. }));
}

#[tokio::test]
async fn test_failed_otp_send_stays_on_email_step() {
    let backend = FakeBackend::new();
    backend.fail_on("send_otp");
    let (session, _) = session_with(backend);
    let mut flow = AuthFlow::new(session, None);
    flow.switch(AuthMode::Signup);

    assert!(flow.submit_email("new@b.com").await.is_err());
    assert_eq!(flow.step(), &AuthStep::SignupEmail);
    assert_eq!(flow.server_error.as_deref(), Some("send_otp:new@b.com failed"));
}

#[tokio::test]
async fn test_switching_modes_resets_progress() {
    let backend = FakeBackend::new();
    let (session, _) = session_with(backend);
    let mut flow = AuthFlow::new(session, None);
    let generation = flow.widget_generation();

    flow.switch(AuthMode::Signup);
    flow.submit_email("new@b.com").await.expect("send otp");
    enter_code(&mut flow, "12");

    flow.switch(AuthMode::Login);
    assert_eq!(flow.step(), &AuthStep::Login);
    assert_eq!(flow.otp.digit(0), None);
    assert_eq!(flow.widget_generation(), generation + 2);
}

#[tokio::test]
async fn test_federated_failure_reports_server_message() {
    let backend = FakeBackend::new();
    backend.fail_on("google_login");
    let (session, _) = session_with(backend);
    let mut flow = AuthFlow::new(session, Some("client-id".to_string()));

    assert!(flow.submit_federated("cred").await.is_err());
    assert_eq!(flow.server_error.as_deref(), Some("google_login:cred failed"));
    assert_eq!(flow.google_client_id(), Some("client-id"));
}

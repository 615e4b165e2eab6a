mod common;

use std::sync::Arc;

use common::{FakeBackend, identity, session_with};
use projecthub::models::LoginRequest;
use projecthub::session::{Session, TOKEN_KEY, TokenStore};

fn login_body() -> LoginRequest {
    LoginRequest {
        email: "a@b.com".to_string(),
        password: "secret1".to_string(),
    }
}

#[tokio::test]
async fn test_login_stores_token_and_publishes_identity() {
    let backend = FakeBackend::new();
    backend.set_auth("T", identity("1", "A B"));
    let (session, store) = session_with(backend.clone());
    let mut rx = session.subscribe();

    let user = session.login(&login_body()).await.expect("login");

    assert_eq!(user.id, "1");
    assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("T"));
    assert!(session.is_authenticated().await);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_ref().map(|u| u.id.as_str()), Some("1"));
    assert_eq!(session.current_user_id().as_deref(), Some("1"));
}

#[tokio::test]
async fn test_failed_login_leaves_session_untouched() {
    let backend = FakeBackend::new();
    let (session, store) = session_with(backend);

    let err = session.login(&login_body()).await.unwrap_err();

    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    assert!(session.current_identity().is_none());
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_late_subscriber_sees_latest_identity() {
    let backend = FakeBackend::new();
    backend.set_me(identity("7", "Grace Hopper"));
    let (session, _) = session_with(backend);

    session.refresh_identity().await.expect("me");

    let rx = session.subscribe();
    assert_eq!(rx.borrow().as_ref().map(|u| u.name.as_str()), Some("Grace Hopper"));
}

#[tokio::test]
async fn test_logout_clears_token_and_identity() {
    let backend = FakeBackend::new();
    backend.set_auth("T", identity("1", "A B"));
    let (session, store) = session_with(backend);
    session.login(&login_body()).await.expect("login");
    let mut rx = session.subscribe();

    session.logout().await;

    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    assert!(!session.is_authenticated().await);
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_none());
}

#[tokio::test]
async fn test_empty_token_is_not_stored() {
    let backend = FakeBackend::new();
    backend.set_auth("", identity("1", "A B"));
    let (session, store) = session_with(backend);

    session.login(&login_body()).await.expect("login");

    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    assert!(!session.is_authenticated().await);
    assert!(session.current_identity().is_some());
}

#[tokio::test]
async fn test_session_without_storage_is_never_authenticated() {
    let backend = FakeBackend::new();
    backend.set_auth("T", identity("1", "A B"));
    let session = Session::new(backend, None);

    session.login(&login_body()).await.expect("login");

    assert!(session.token().await.is_none());
    assert!(!session.is_authenticated().await);
    session.logout().await;
}

#[tokio::test]
async fn test_federated_login_goes_through_same_path() {
    let backend = FakeBackend::new();
    backend.set_auth("G", identity("9", "Fed User"));
    let (session, store) = session_with(backend.clone());

    let user = session
        .login_with_federated_credential("opaque-credential")
        .await
        .expect("federated login");

    assert_eq!(user.id, "9");
    assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("G"));
    assert_eq!(backend.calls(), vec!["google_login:opaque-credential".to_string()]);
}

#[tokio::test]
async fn test_sessions_share_one_store() {
    let backend = FakeBackend::new();
    backend.set_auth("T", identity("1", "A B"));
    let (first, store) = session_with(backend.clone());
    let tokens: Arc<dyn TokenStore> = store;
    let second = Session::new(backend, Some(tokens));

    first.login(&login_body()).await.expect("login");

    assert!(second.is_authenticated().await);
    assert!(second.current_identity().is_none());
}

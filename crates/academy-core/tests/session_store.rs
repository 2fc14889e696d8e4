//! Session store behaviour against a mocked academy API.

use std::sync::Arc;
use std::time::Duration;

use academy_core::auth::{
    AccessGuard, FileStorage, Guarded, MemoryStorage, Navigator, PersistedSession, Session,
    SessionStorage, SessionStore, LOGIN_PATH,
};
use academy_core::forms::{Credentials, Registration};
use academy_core::{ApiClient, AuthError, Role};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestNavigator {
    visits: Vec<String>,
}

impl Navigator for TestNavigator {
    fn is_interactive(&self) -> bool {
        true
    }

    fn replace(&mut self, path: &str) {
        self.visits.push(path.to_string());
    }
}

fn identity_json(role: &str, token: &str) -> serde_json::Value {
    json!({
        "_id": "65a1",
        "name": "Admin User",
        "email": "admin@x.com",
        "role": role,
        "token": token,
    })
}

async fn mock_login(server: &MockServer, role: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_json(json!({"email": "admin@x.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json(role, token)))
        .mount(server)
        .await;
}

fn store_for(server: &MockServer, storage: Arc<MemoryStorage>) -> SessionStore {
    let api = ApiClient::new(format!("{}/api", server.uri())).expect("client should build");
    SessionStore::new(api, storage)
}

fn credentials() -> Credentials {
    Credentials::new("admin@x.com", "secret")
}

#[tokio::test]
async fn test_no_session_guard_loads_then_redirects() {
    let server = MockServer::start().await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let mut guard = AccessGuard::admin_only(TestNavigator::default());

    assert_eq!(guard.render(&store.current(), |_| "users"), Guarded::Loading);
    assert!(guard.navigator().visits.is_empty());

    store.hydrate();
    assert_eq!(guard.render(&store.current(), |_| "users"), Guarded::Nothing);
    assert_eq!(guard.navigator().visits, vec![LOGIN_PATH.to_string()]);
}

#[tokio::test]
async fn test_admin_login_renders_protected_content() {
    let server = MockServer::start().await;
    mock_login(&server, "admin", "t1").await;
    let storage = Arc::new(MemoryStorage::new());
    let store = store_for(&server, storage.clone());
    store.hydrate();

    let session = store.login(&credentials()).await.expect("login should succeed");
    assert_eq!(session.token(), Some("t1"));
    assert_eq!(store.current().token(), Some("t1"));

    let mut guard = AccessGuard::admin_only(TestNavigator::default());
    assert_eq!(guard.render(&store.current(), |u| u.id.clone()), Guarded::Content("65a1".to_string()));
    assert!(guard.navigator().visits.is_empty());

    let raw = storage.read().expect("read").expect("session persisted");
    assert_eq!(PersistedSession::decode(&raw).expect("decode").identity.token, "t1");
}

#[tokio::test]
async fn test_student_login_redirects_from_admin_page() {
    let server = MockServer::start().await;
    mock_login(&server, "student", "t2").await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.hydrate();

    store.login(&credentials()).await.expect("login should succeed");
    assert_eq!(store.current().role(), Some(Role::Student));

    let mut rendered_children = false;
    let mut guard = AccessGuard::admin_only(TestNavigator::default());
    let shown = guard.render(&store.current(), |_| rendered_children = true);
    assert_eq!(shown, Guarded::Nothing);
    assert!(!rendered_children);
    assert_eq!(guard.navigator().visits, vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_rejected_login_leaves_session_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid email or password"})),
        )
        .mount(&server)
        .await;
    let storage = Arc::new(MemoryStorage::new());
    let store = store_for(&server, storage.clone());
    store.hydrate();

    let err = store.login(&credentials()).await.expect_err("login should fail");
    assert_eq!(err.user_message("Login failed"), "Invalid email or password");
    assert_eq!(store.current(), Session::anonymous());
    assert_eq!(storage.read().expect("read"), None);
}

#[tokio::test]
async fn test_rejected_login_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.hydrate();

    let err = store.login(&credentials()).await.expect_err("login should fail");
    assert_eq!(err.user_message("Login failed. Please try again."), "Login failed. Please try again.");
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.hydrate();
    store
        .login_with_identity(serde_json::from_value(identity_json("admin", "t0")).expect("identity"))
        .expect("commit");

    assert!(store.login(&credentials()).await.is_err());
    assert_eq!(store.current().token(), Some("t0"));
}

#[tokio::test]
async fn test_login_completing_after_logout_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(identity_json("admin", "late"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(store_for(&server, storage.clone()));
    store.hydrate();

    let pending = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.login(&credentials()).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    store.logout().expect("logout");

    let result = pending.await.expect("task should not panic");
    assert!(matches!(result, Err(AuthError::Superseded)));
    assert_eq!(store.current().user, None);
    assert_eq!(storage.read().expect("read"), None);
}

#[tokio::test]
async fn test_failed_newer_login_keeps_older_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_json(json!({"email": "admin@x.com", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(identity_json("admin", "t1"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_json(json!({"email": "admin@x.com", "password": "typo"})))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid email or password"})))
        .mount(&server)
        .await;
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(store_for(&server, storage.clone()));
    store.hydrate();

    let slow_good = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.login(&credentials()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let typo = store.login(&Credentials::new("admin@x.com", "typo")).await;
    assert!(matches!(typo, Err(AuthError::Api(_))));

    let session = slow_good
        .await
        .expect("task should not panic")
        .expect("older successful login should commit");
    assert_eq!(session.token(), Some("t1"));
    assert_eq!(store.token().as_deref(), Some("t1"));
    assert!(storage.read().expect("read").is_some());
}

#[tokio::test]
async fn test_logout_clears_persisted_session() {
    let server = MockServer::start().await;
    mock_login(&server, "admin", "t1").await;
    let storage = Arc::new(MemoryStorage::new());
    let store = store_for(&server, storage.clone());
    store.hydrate();
    store.login(&credentials()).await.expect("login");

    store.logout().expect("logout");
    assert_eq!(store.current().user, None);
    assert_eq!(storage.read().expect("read"), None);
}

#[tokio::test]
async fn test_register_validates_before_sending() {
    let server = MockServer::start().await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.hydrate();

    let registration = Registration {
        name: "New Student".to_string(),
        email: "new@x.com".to_string(),
        password: "abc".to_string(),
        confirm_password: "abc".to_string(),
    };
    let err = store.register(&registration).await.expect_err("short password");
    assert_eq!(err.to_string(), "Password must be at least 6 characters long.");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_register_logs_in_with_returned_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .and(body_json(json!({"name": "New Student", "email": "new@x.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "77",
            "name": "New Student",
            "email": "new@x.com",
            "role": "student",
            "token": "fresh",
        })))
        .mount(&server)
        .await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.hydrate();

    let registration = Registration {
        name: "New Student".to_string(),
        email: "new@x.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    };
    let session = store.register(&registration).await.expect("registration");
    assert_eq!(session.role(), Some(Role::Student));
    assert_eq!(store.token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_unauthorized_request_invalidates_session() {
    let server = MockServer::start().await;
    mock_login(&server, "admin", "expired").await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Not authorized, token failed"})))
        .mount(&server)
        .await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.hydrate();
    store.login(&credentials()).await.expect("login");

    let err = store
        .with_authorized(|api| async move { api.list_users().await })
        .await
        .expect_err("request should be rejected");
    assert!(err.is_unauthorized());
    assert_eq!(store.current().user, None);
}

#[tokio::test]
async fn test_with_authorized_requires_login() {
    let server = MockServer::start().await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    store.hydrate();

    let err = store
        .with_authorized(|api| async move { api.list_users().await })
        .await
        .expect_err("anonymous");
    assert!(matches!(err, AuthError::LoginRequired));
}

#[tokio::test]
async fn test_subscriber_observes_login_before_next_render() {
    let server = MockServer::start().await;
    mock_login(&server, "admin", "t1").await;
    let store = store_for(&server, Arc::new(MemoryStorage::new()));
    let mut rx = store.subscribe();
    store.hydrate();
    let _ = rx.borrow_and_update();

    store.login(&credentials()).await.expect("login");
    assert!(rx.has_changed().expect("sender alive"));
    assert_eq!(rx.borrow_and_update().token(), Some("t1"));
}

#[test]
fn test_hydrate_from_file_storage_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let identity = serde_json::from_value(identity_json("content_manager", "disk")).expect("identity");

    {
        let api = ApiClient::new("http://127.0.0.1:9/api").expect("client");
        let store = SessionStore::new(api, FileStorage::new(dir.path().to_path_buf()));
        store.hydrate();
        store.login_with_identity(identity).expect("commit");
    }

    let api = ApiClient::new("http://127.0.0.1:9/api").expect("client");
    let store = SessionStore::new(api, FileStorage::new(dir.path().to_path_buf()));
    let session = store.hydrate();
    assert_eq!(session.role(), Some(Role::ContentManager));
    assert_eq!(session.token(), Some("disk"));
}

#[test]
fn test_hydrate_never_fails_on_malformed_files() {
    let payloads = [
        "",
        "{",
        "[]",
        "\"just a string\"",
        r#"{"identity":null,"saved_at":"2024-01-01T00:00:00Z"}"#,
        r#"{"identity":{"id":"1","email":"a@x.com","role":"admin","token":""},"saved_at":"2024-01-01T00:00:00Z"}"#,
        r#"{"identity":{"id":"1","email":"a@x.com","role":"owner","token":"t"},"saved_at":"2024-01-01T00:00:00Z"}"#,
    ];

    for payload in payloads {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        storage.write(payload).expect("seed payload");

        let api = ApiClient::new("http://127.0.0.1:9/api").expect("client");
        let store = SessionStore::new(api, FileStorage::new(dir.path().to_path_buf()));
        let session = store.hydrate();
        assert_eq!(session, Session::anonymous(), "payload {:?}", payload);
        assert!(!storage.path().exists(), "corrupt payload should be removed");
    }
}

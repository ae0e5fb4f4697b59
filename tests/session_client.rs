//! End-to-end: session client against a live server on a loopback port.

use campus_portal::{
    access::{AccessResolver, Role},
    api::{build_router, RouterOptions},
    auth::{
        models::User, password::BCRYPT_MIN_COST, AuthService, JwtHandler, PasswordVerifier,
        UserStore,
    },
    db::{DbPool, PoolConfig},
    portal::{
        models::{LeaveDecision, LeaveStatus},
        PortalRepositories, PortalService,
    },
    session::{
        ClientError, FileSessionStorage, MemorySessionStorage, PortalClient, SessionHolder,
        SessionStorage, StoredSession,
    },
};
use chrono::{Duration, Utc};
use std::{net::SocketAddr, sync::Arc};
use tempfile::{NamedTempFile, TempDir};
use tokio::net::TcpListener;

const SECRET: &str = "integration-secret-0123456789abcdef";

struct TestServer {
    base_url: String,
    _db: NamedTempFile,
}

async fn spawn_server() -> TestServer {
    let db = NamedTempFile::new().unwrap();
    let pool = DbPool::open(db.path().to_str().unwrap(), PoolConfig::default()).unwrap();
    let users = UserStore::new(pool).await.unwrap();
    let verifier = Arc::new(PasswordVerifier::new(BCRYPT_MIN_COST).unwrap());
    users.seed_demo_users(&verifier).await.unwrap();

    let auth = Arc::new(AuthService::new(
        users,
        verifier,
        Arc::new(JwtHandler::new(SECRET)),
    ));
    let portal = Arc::new(PortalService::new(
        AccessResolver::builtin().unwrap(),
        PortalRepositories::demo(),
    ));
    let (app, _) = build_router(auth, portal, RouterOptions::default()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        _db: db,
    }
}

fn client_with(server: &TestServer, storage: Arc<dyn SessionStorage>) -> PortalClient {
    PortalClient::new(&server.base_url, Arc::new(SessionHolder::new(storage)))
}

fn teacher_user() -> User {
    User {
        id: 3,
        name: "Prof. Smith".to_string(),
        email: "teacher@campus.edu".to_string(),
        password_hash: String::new(),
        role: Role::Teacher,
    }
}

#[tokio::test]
async fn test_login_and_protected_calls() {
    let server = spawn_server().await;
    let client = client_with(&server, Arc::new(MemorySessionStorage::new()));

    let user = client.login("teacher@campus.edu", "teacher123").await.unwrap();
    assert_eq!(user.id, "3");
    assert_eq!(user.role, Role::Teacher);

    let me = client.me().await.unwrap();
    assert_eq!(me.email, "teacher@campus.edu");

    let access = client.access().await.unwrap();
    assert!(access.features["research_projects"]);
    assert!(!access.features["users"]);

    let notifications = client.notifications().await.unwrap();
    assert!(notifications.iter().all(|n| n.user_id == "3"));
}

#[tokio::test]
async fn test_login_failures_are_generic() {
    let server = spawn_server().await;
    let client = client_with(&server, Arc::new(MemorySessionStorage::new()));

    let wrong_password = client
        .login("teacher@campus.edu", "wrong")
        .await
        .unwrap_err();
    let unknown_email = client
        .login("nobody@campus.edu", "teacher123")
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, ClientError::LoginFailed));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_session_restored_from_file() {
    let server = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    let first = client_with(&server, Arc::new(FileSessionStorage::new(&path)));
    first.login("dean@campus.edu", "dean123").await.unwrap();
    drop(first);

    let second = client_with(&server, Arc::new(FileSessionStorage::new(&path)));
    assert!(!second.session().is_authenticated());
    assert!(second.session().restore().unwrap());

    let leave_requests: Vec<serde_json::Value> = second.get("/api/leave-requests").await.unwrap();
    assert_eq!(leave_requests.len(), 3);
}

#[tokio::test]
async fn test_expired_token_forces_logout() {
    let server = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    let (expired, _) = JwtHandler::new(SECRET)
        .generate_token_at(&teacher_user(), Utc::now() - Duration::hours(25))
        .unwrap();
    let storage = FileSessionStorage::new(&path);
    storage
        .save(&StoredSession {
            token: expired,
            user: campus_portal::auth::models::UserProfile::from_user(&teacher_user()),
        })
        .unwrap();

    let client = client_with(&server, Arc::new(FileSessionStorage::new(&path)));
    assert!(client.session().restore().unwrap());

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthenticated));
    assert!(!client.session().is_authenticated());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_forged_token_forces_logout() {
    let server = spawn_server().await;
    let storage = Arc::new(MemorySessionStorage::new());

    let (forged, _) = JwtHandler::new("some-other-secret-0123456789abcdef")
        .generate_token(&User {
            role: Role::Admin,
            ..teacher_user()
        })
        .unwrap();
    storage
        .save(&StoredSession {
            token: forged,
            user: campus_portal::auth::models::UserProfile::from_user(&teacher_user()),
        })
        .unwrap();

    let client = client_with(&server, storage.clone());
    client.session().restore().unwrap();

    let err = client.announcements().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthenticated));
    assert!(storage.load().unwrap().is_none());
}

#[tokio::test]
async fn test_dean_decision_reaches_the_requester() {
    let server = spawn_server().await;

    let dean = client_with(&server, Arc::new(MemorySessionStorage::new()));
    dean.login("dean@campus.edu", "dean123").await.unwrap();
    let decided = dean
        .decide_leave_request("2", LeaveDecision::Approved)
        .await
        .unwrap();
    assert_eq!(decided.status, LeaveStatus::Approved);
    assert_eq!(decided.approved_by.as_deref(), Some("2"));

    let registrar = client_with(&server, Arc::new(MemorySessionStorage::new()));
    registrar
        .login("registrar@campus.edu", "registrar123")
        .await
        .unwrap();
    let notifications = registrar.notifications().await.unwrap();
    assert!(notifications
        .iter()
        .any(|n| n.message == "Your leave request has been approved"));

    // deciding needs approve_leave_requests
    let err = registrar
        .decide_leave_request("2", LeaveDecision::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Forbidden));
}

#[tokio::test]
async fn test_forbidden_keeps_session() {
    let server = spawn_server().await;
    let client = client_with(&server, Arc::new(MemorySessionStorage::new()));
    client.login("registrar@campus.edu", "registrar123").await.unwrap();

    let err = client
        .get::<Vec<serde_json::Value>>("/api/leave-requests")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Forbidden));
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_logout_is_local_only() {
    let server = spawn_server().await;
    let client = client_with(&server, Arc::new(MemorySessionStorage::new()));
    client.login("admin@campus.edu", "admin123").await.unwrap();
    let token = client.session().token().unwrap();

    client.logout().unwrap();
    assert!(matches!(
        client.me().await.unwrap_err(),
        ClientError::Unauthenticated
    ));

    // the server was never told; the token remains usable until it expires
    let response = reqwest::Client::new()
        .get(format!("{}/auth/me", server.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_password_reset_acknowledges_any_email() {
    let server = spawn_server().await;
    let client = client_with(&server, Arc::new(MemorySessionStorage::new()));

    let known = client
        .request_password_reset("teacher@campus.edu")
        .await
        .unwrap();
    let unknown = client
        .request_password_reset("nobody@campus.edu")
        .await
        .unwrap();
    assert_eq!(known, unknown);
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use redtag_api::auth::jwt::{generate_access_token, JwtConfig};
use redtag_api::auth::password::hash_password;
use redtag_api::config::ServerConfig;
use redtag_api::router::build_app_router;
use redtag_api::state::AppState;
use redtag_api::storage::ImageStore;
use redtag_api::stream::StreamManager;
use redtag_db::models::user::{CreateUser, User};
use redtag_db::repositories::UserRepo;

/// Password given to every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "till-drawer-42";

const TEST_JWT_SECRET: &str = "test-secret-not-for-production";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Build a test `ServerConfig` with safe defaults, storing uploads in
/// `upload_dir`.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 64 * 1024,
        stream_keepalive_secs: 15,
        jwt: test_jwt_config(),
    }
}

/// A router plus the state behind it, so tests can reach the stream
/// registry and the upload directory directly.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: tempfile::TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Number of files currently in the upload directory.
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.uploads.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Build the full application with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let uploads = tempfile::tempdir().expect("tempdir");
    let config = test_config(uploads.path());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        stream_manager: Arc::new(StreamManager::new()),
        image_store: Arc::new(ImageStore::new(
            config.upload_dir.clone(),
            config.max_upload_bytes,
        )),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        uploads,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and return it with an access token.
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@thrift.test"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");

    let token = generate_access_token(user.id, &user.role, &test_jwt_config())
        .expect("token generation should succeed");
    (user, token)
}

// ---------------------------------------------------------------------------
// Database faults
// ---------------------------------------------------------------------------

/// Make every row INSERT or UPDATE on `table` fail inside the database.
///
/// Reads still succeed, so handlers get past validation and image storage
/// before the write is rejected.
pub async fn reject_writes_to(pool: &PgPool, table: &str) {
    sqlx::query(
        "CREATE OR REPLACE FUNCTION reject_write() RETURNS trigger AS $$
         BEGIN
             RAISE EXCEPTION 'writes to % are disabled', TG_TABLE_NAME;
         END;
         $$ LANGUAGE plpgsql",
    )
    .execute(pool)
    .await
    .expect("trigger function should be created");

    sqlx::query(&format!(
        "CREATE TRIGGER reject_write BEFORE INSERT OR UPDATE ON {table}
         FOR EACH ROW EXECUTE FUNCTION reject_write()"
    ))
    .execute(pool)
    .await
    .expect("trigger should be created");
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn authed(method: Method, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, authed(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, authed(Method::DELETE, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, authed(Method::POST, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, authed(Method::PATCH, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = authed(Method::POST, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = authed(Method::PUT, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    form: MultipartForm,
    token: &str,
) -> Response<Body> {
    let (content_type, body) = form.finish();
    let request = authed(method, uri, token)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "redtag-test-boundary";

/// Minimal `multipart/form-data` encoder for request tests.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}

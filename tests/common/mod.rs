#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use classhub::router::init_router;
use classhub::state::AppState;
use classhub_auth::create_access_token;
use classhub_config::{CorsConfig, JwtConfig, UploadConfig};
use classhub_core::password::hash_password_with_cost;
use classhub_db::{MemoryStore, NewUser, UserStore};
use classhub_models::{Role, UserId};

pub const PASSWORD: &str = "password123";
const BOUNDARY: &str = "classhub-test-boundary";

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: PathBuf,
    pub admin: TestUser,
    pub teacher: TestUser,
    pub student: TestUser,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry: 3600,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let upload_dir =
            std::env::temp_dir().join(format!("classhub-uploads-{}", uuid::Uuid::new_v4()));
        let upload_config = UploadConfig {
            dir: upload_dir.clone(),
            base_url: "/uploads".to_string(),
            max_bytes: 1024 * 1024,
        };
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            jwt_config(),
            CorsConfig::default(),
            upload_config,
        );
        let router = init_router(state.clone(), None);

        let admin = create_user(&state, "Ada Admin", "admin@classhub.test", Role::Admin).await;
        let teacher =
            create_user(&state, "Tom Teacher", "teacher@classhub.test", Role::Teacher).await;
        let student =
            create_user(&state, "Sam Student", "student@classhub.test", Role::Student).await;

        Self {
            router,
            state,
            upload_dir,
            admin,
            teacher,
            student,
        }
    }

    pub async fn user(&self, name: &str, email: &str, role: Role) -> TestUser {
        create_user(&self.state, name, email, role).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

pub async fn create_user(state: &AppState, name: &str, email: &str, role: Role) -> TestUser {
    let user = state
        .store
        .insert_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password_with_cost(PASSWORD, 4).unwrap(),
            role,
        })
        .await
        .unwrap();
    let token = create_access_token(
        user.id.into_inner(),
        &user.email,
        role.as_str(),
        role.permissions(),
        &state.jwt_config,
    )
    .unwrap();

    TestUser {
        id: user.id,
        email: user.email,
        token,
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Creates a course and returns its id.
pub async fn create_course(app: &TestApp, name: &str) -> String {
    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/courses",
            Some(&app.admin.token),
            Some(serde_json::json!({ "name": name, "teacher": app.teacher.id.to_string() })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["course"]["id"].as_str().unwrap().to_string()
}

/// Creates a classroom for `course` and returns its id.
pub async fn create_classroom(
    app: &TestApp,
    name: &str,
    course: &str,
    students: &[UserId],
) -> String {
    let students: Vec<String> = students.iter().map(|id| id.to_string()).collect();
    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/classrooms",
            Some(&app.admin.token),
            Some(serde_json::json!({
                "name": name,
                "course": course,
                "teacher": app.teacher.id.to_string(),
                "students": students,
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["classroom"]["id"].as_str().unwrap().to_string()
}

mod common;

use axum::http::StatusCode;
use classhub_models::Role;
use common::{PASSWORD, TestApp, json_request};
use serde_json::json;

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": app.student.email, "password": PASSWORD })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], app.student.email);
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": app.teacher.email, "password": "not-the-password" })),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email_looks_like_wrong_password() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@classhub.test", "password": PASSWORD })),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_missing_password_field() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": app.admin.email })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password is required");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send(json_request("GET", "/api/users", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .send(json_request("GET", "/api/courses", Some("not-a-jwt"), None))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_cannot_list_users() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(json_request("GET", "/api/users", Some(&app.student.token), None))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Missing required permission: users:read");
}

#[tokio::test]
async fn test_admin_registers_user_and_duplicate_email_conflicts() {
    let app = TestApp::spawn().await;
    let payload = json!({
        "name": "New Teacher",
        "email": "new.teacher@classhub.test",
        "password": "longenough1",
        "role": "teacher"
    });

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            Some(&app.admin.token),
            Some(payload.clone()),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "teacher");

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            Some(&app.admin.token),
            Some(payload),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_teacher_cannot_register_users() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            Some(&app.teacher.token),
            Some(json!({
                "name": "Sneaky",
                "email": "sneaky@classhub.test",
                "password": "longenough1",
                "role": "admin"
            })),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_reads_own_profile_only() {
    let app = TestApp::spawn().await;
    let other = app.user("Other Student", "other@classhub.test", Role::Student).await;

    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/users/profile/{}", app.student.id),
            Some(&app.student.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = app
        .send(json_request(
            "GET",
            &format!("/api/users/profile/{}", other.id),
            Some(&app.student.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send(json_request("GET", "/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API is running");

    let (status, body) = app.send(json_request("GET", "/api/nope", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}

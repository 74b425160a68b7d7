mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TestApp, create_classroom, create_course, json_request};
use serde_json::{Value, json};

async fn course_teacher(app: &TestApp, course: &str) -> Value {
    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/courses/{course}"),
            Some(&app.admin.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["course"]["teacher"].clone()
}

async fn update_course(app: &TestApp, course: &str, payload: Value) -> (StatusCode, Value) {
    app.send(json_request(
        "PUT",
        &format!("/api/courses/{course}"),
        Some(&app.admin.token),
        Some(payload),
    ))
    .await
}

#[tokio::test]
async fn test_course_update_clears_teacher_with_null_or_empty_string() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Biology").await;
    assert_eq!(course_teacher(&app, &course).await["email"], app.teacher.email);

    let (status, body) = update_course(&app, &course, json!({ "name": "Biology II" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["course"]["name"], "Biology II");
    assert_eq!(body["course"]["teacher"]["email"], app.teacher.email);

    let (status, body) = update_course(&app, &course, json!({ "teacher": null })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["course"]["teacher"].is_null());

    let (status, _) =
        update_course(&app, &course, json!({ "teacher": app.teacher.id.to_string() })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course_teacher(&app, &course).await["email"], app.teacher.email);

    let (status, body) = update_course(&app, &course, json!({ "teacher": "" })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(course_teacher(&app, &course).await.is_null());
}

#[tokio::test]
async fn test_course_teacher_must_hold_teacher_role() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Chemistry").await;

    let (status, body) =
        update_course(&app, &course, json!({ "teacher": app.student.id.to_string() })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ids"], json!([app.student.id.to_string()]));
    assert_eq!(course_teacher(&app, &course).await["email"], app.teacher.email);
}

#[tokio::test]
async fn test_teacher_cannot_write_courses() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/courses",
            Some(&app.teacher.token),
            Some(json!({ "name": "Rogue" })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Missing required permission: courses:write");
}

#[tokio::test]
async fn test_deleting_course_keeps_classroom_intact() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Physics").await;
    let room = create_classroom(&app, "Phys A", &course, &[app.student.id]).await;

    let (status, _) = app
        .send(json_request(
            "DELETE",
            &format!("/api/courses/{course}"),
            Some(&app.admin.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/classrooms/{room}"),
            Some(&app.admin.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let classroom = &body["classroom"];
    assert!(classroom["course"].is_null());
    assert_eq!(classroom["name"], "Phys A");
    assert_eq!(classroom["teacher"]["email"], app.teacher.email);
    assert_eq!(classroom["students"][0]["id"], app.student.id.to_string());

    let (status, _) = app
        .send(json_request(
            "GET",
            &format!("/api/courses/{course}"),
            Some(&app.admin.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_demoting_teacher_clears_course_and_classroom_teacher() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "History").await;
    let room = create_classroom(&app, "Hist A", &course, &[]).await;

    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}", app.teacher.id),
            Some(&app.admin.token),
            Some(json!({ "role": "student" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["role"], "student");

    assert!(course_teacher(&app, &course).await.is_null());
    let (_, body) = app
        .send(json_request(
            "GET",
            &format!("/api/classrooms/{room}"),
            Some(&app.admin.token),
            None,
        ))
        .await;
    assert!(body["classroom"]["teacher"].is_null());
}

#[tokio::test]
async fn test_classroom_assignments_sorted_by_due_date() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Maths").await;
    let room = create_classroom(&app, "Maths A", &course, &[app.student.id]).await;

    for (title, days) in [("Later", 10), ("Sooner", 2), ("Middle", 5)] {
        let (status, body) = app
            .send(json_request(
                "POST",
                "/api/assignments",
                Some(&app.teacher.token),
                Some(json!({
                    "title": title,
                    "due_date": (Utc::now() + Duration::days(days)).to_rfc3339(),
                    "classroom_id": room,
                })),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["created_by"], app.teacher.id.to_string());
    }

    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/assignments/classroom/{room}"),
            Some(&app.student.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sooner", "Middle", "Later"]);
    assert_eq!(body[0]["classroom"]["name"], "Maths A");
}

#[tokio::test]
async fn test_announcement_author_is_caller() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Music").await;
    let room = create_classroom(&app, "Music A", &course, &[app.student.id]).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/announcements",
            Some(&app.teacher.token),
            Some(json!({
                "title": "Recital",
                "message": "Friday at noon",
                "classroom_id": room,
                "created_by": app.admin.id.to_string(),
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["created_by"], app.teacher.id.to_string());
    assert_eq!(body["creator"]["email"], app.teacher.email);

    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/announcements/classroom/{room}"),
            Some(&app.student.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Recital");

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/announcements",
            Some(&app.student.token),
            Some(json!({ "title": "Hi", "message": "From a student", "classroom_id": room })),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

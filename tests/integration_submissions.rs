mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use classhub_models::Role;
use common::{FilePart, TestApp, create_classroom, create_course, json_request, multipart_request};
use serde_json::json;

async fn create_assignment(app: &TestApp, classroom: &str, title: &str) -> String {
    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/assignments",
            Some(&app.teacher.token),
            Some(json!({
                "title": title,
                "due_date": (Utc::now() + Duration::days(7)).to_rfc3339(),
                "classroom_id": classroom,
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn setup(app: &TestApp) -> String {
    let course = create_course(app, "Literature").await;
    let room = create_classroom(app, "Lit A", &course, &[app.student.id]).await;
    create_assignment(app, &room, "Essay").await
}

#[tokio::test]
async fn test_student_submits_file_and_it_is_stored() {
    let app = TestApp::spawn().await;
    let assignment = setup(&app).await;

    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/submissions",
            &app.student.token,
            &[("assignment", assignment.as_str()), ("submission_text", "My essay")],
            Some(FilePart {
                file_name: "essay.txt",
                content_type: "text/plain",
                bytes: b"Once upon a time",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["student_id"], app.student.id.to_string());
    assert_eq!(body["submission_text"], "My essay");
    assert_eq!(body["original_file_name"], "essay.txt");
    assert_eq!(body["file_size"], 16);

    let key = body["submission_file"].as_str().unwrap();
    assert!(key.starts_with("submissions/submission-"));
    assert!(key.ends_with(".txt"));
    assert_eq!(body["file_url"], format!("/uploads/{key}"));
    assert_eq!(std::fs::read(app.upload_dir.join(key)).unwrap(), b"Once upon a time");
}

#[tokio::test]
async fn test_duplicate_submission_conflicts() {
    let app = TestApp::spawn().await;
    let assignment = setup(&app).await;
    let fields = [("assignment", assignment.as_str()), ("submission_text", "first")];

    let (status, _) = app
        .send(multipart_request("POST", "/api/submissions", &app.student.token, &fields, None))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(multipart_request("POST", "/api/submissions", &app.student.token, &fields, None))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Assignment already submitted. Use update instead.");
}

#[tokio::test]
async fn test_disallowed_file_is_rejected_and_nothing_recorded() {
    let app = TestApp::spawn().await;
    let assignment = setup(&app).await;

    let (status, _) = app
        .send(multipart_request(
            "POST",
            "/api/submissions",
            &app.student.token,
            &[("assignment", assignment.as_str())],
            Some(FilePart {
                file_name: "virus.exe",
                content_type: "application/octet-stream",
                bytes: b"MZ",
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/submissions/student/{}", app.student.id),
            Some(&app.student.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_missing_assignment_field() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/submissions",
            &app.student.token,
            &[("submission_text", "orphan")],
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "assignment is required");
}

#[tokio::test]
async fn test_student_cannot_submit_for_someone_else() {
    let app = TestApp::spawn().await;
    let assignment = setup(&app).await;
    let other = app.user("Olga Student", "olga@classhub.test", Role::Student).await;
    let other_id = other.id.to_string();

    let (status, _) = app
        .send(multipart_request(
            "POST",
            "/api/submissions",
            &app.student.token,
            &[("assignment", assignment.as_str()), ("student", other_id.as_str())],
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_resubmit_replaces_file_and_grade_flows_into_stats() {
    let app = TestApp::spawn().await;
    let assignment = setup(&app).await;

    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/api/submissions",
            &app.student.token,
            &[("assignment", assignment.as_str())],
            Some(FilePart {
                file_name: "draft.txt",
                content_type: "text/plain",
                bytes: b"draft",
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    let old_key = body["submission_file"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(multipart_request(
            "PUT",
            &format!("/api/submissions/{id}"),
            &app.student.token,
            &[("submission_text", "final version")],
            Some(FilePart {
                file_name: "final.pdf",
                content_type: "application/pdf",
                bytes: b"%PDF-1.4",
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["submission_text"], "final version");
    let new_key = body["submission_file"].as_str().unwrap();
    assert!(new_key.ends_with(".pdf"));
    assert!(!app.upload_dir.join(&old_key).exists());
    assert!(app.upload_dir.join(new_key).exists());

    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/api/submissions/{id}/grade"),
            Some(&app.teacher.token),
            Some(json!({ "grade": "A", "feedback": "Well argued" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grade"], "A");
    assert_eq!(body["graded_by"], app.teacher.id.to_string());

    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/submissions/stats/{}", app.teacher.id),
            Some(&app.teacher.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 1, "graded": 1, "pending": 0 }));
}

#[tokio::test]
async fn test_student_cannot_grade() {
    let app = TestApp::spawn().await;
    let assignment = setup(&app).await;
    let (_, body) = app
        .send(multipart_request(
            "POST",
            "/api/submissions",
            &app.student.token,
            &[("assignment", assignment.as_str())],
            None,
        ))
        .await;
    let id = body["id"].as_str().unwrap();

    let (status, _) = app
        .send(json_request(
            "PUT",
            &format!("/api/submissions/{id}/grade"),
            Some(&app.student.token),
            Some(json!({ "grade": "A+" })),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_submission_removes_file() {
    let app = TestApp::spawn().await;
    let assignment = setup(&app).await;
    let (_, body) = app
        .send(multipart_request(
            "POST",
            "/api/submissions",
            &app.student.token,
            &[("assignment", assignment.as_str())],
            Some(FilePart {
                file_name: "photo.png",
                content_type: "image/png",
                bytes: &[0x89, b'P', b'N', b'G'],
            }),
        ))
        .await;
    let id = body["id"].as_str().unwrap().to_string();
    let key = body["submission_file"].as_str().unwrap().to_string();
    assert!(app.upload_dir.join(&key).exists());

    let (status, _) = app
        .send(json_request(
            "DELETE",
            &format!("/api/submissions/{id}"),
            Some(&app.teacher.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.upload_dir.join(&key).exists());

    let (_, body) = app
        .send(json_request(
            "GET",
            &format!("/api/submissions/assignment/{assignment}"),
            Some(&app.teacher.token),
            None,
        ))
        .await;
    assert_eq!(body, json!([]));
}

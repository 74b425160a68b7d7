mod common;

use axum::http::StatusCode;
use classhub_models::Role;
use common::{TestApp, create_classroom, create_course, json_request};
use serde_json::json;

#[tokio::test]
async fn test_create_classroom_populates_course_teacher_and_students() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Biology").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/classrooms",
            Some(&app.admin.token),
            Some(json!({
                "name": "Bio 101",
                "course": course,
                "teacher": app.teacher.id.to_string(),
                "students": [app.student.id.to_string()],
            })),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let classroom = &body["classroom"];
    assert_eq!(classroom["name"], "Bio 101");
    assert_eq!(classroom["course"]["name"], "Biology");
    assert_eq!(classroom["teacher"]["email"], app.teacher.email);
    assert_eq!(classroom["students"][0]["id"], app.student.id.to_string());
}

#[tokio::test]
async fn test_student_cannot_join_second_classroom() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Chemistry").await;
    create_classroom(&app, "Chem A", &course, &[app.student.id]).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/classrooms",
            Some(&app.admin.token),
            Some(json!({
                "name": "Chem B",
                "course": course,
                "students": [app.student.id.to_string()],
            })),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["ids"], json!([app.student.id.to_string()]));
}

#[tokio::test]
async fn test_add_student_conflict_then_remove_and_move() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Physics").await;
    let first = create_classroom(&app, "Phys A", &course, &[app.student.id]).await;
    let second = create_classroom(&app, "Phys B", &course, &[]).await;
    let payload = json!({ "student_id": app.student.id.to_string() });

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/api/classrooms/{second}/add-student"),
            Some(&app.admin.token),
            Some(payload.clone()),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["ids"], json!([app.student.id.to_string()]));

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/api/classrooms/{first}/remove-student"),
            Some(&app.admin.token),
            Some(payload.clone()),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classroom"]["students"], json!([]));

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/api/classrooms/{second}/add-student"),
            Some(&app.admin.token),
            Some(payload),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classroom"]["students"][0]["id"], app.student.id.to_string());
}

#[tokio::test]
async fn test_adding_existing_member_is_a_no_op() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "History").await;
    let room = create_classroom(&app, "Hist A", &course, &[app.student.id]).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/api/classrooms/{room}/add-student"),
            Some(&app.admin.token),
            Some(json!({ "student_id": app.student.id.to_string() })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classroom"]["students"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_student_and_unknown_ids_are_rejected() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Art").await;
    let room = create_classroom(&app, "Art A", &course, &[]).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/api/classrooms/{room}/add-student"),
            Some(&app.admin.token),
            Some(json!({ "student_id": app.teacher.id.to_string() })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ids"], json!([app.teacher.id.to_string()]));

    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/api/classrooms/{room}/add-student"),
            Some(&app.admin.token),
            Some(json!({ "student_id": "not-a-uuid" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(json_request(
            "GET",
            "/api/classrooms/not-a-uuid",
            Some(&app.admin.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_cannot_manage_rosters() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Music").await;
    let room = create_classroom(&app, "Music A", &course, &[]).await;

    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/api/classrooms/{room}/add-student"),
            Some(&app.teacher.token),
            Some(json!({ "student_id": app.student.id.to_string() })),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleting_student_pulls_them_from_roster() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Geography").await;
    let other = app.user("Gina Student", "gina@classhub.test", Role::Student).await;
    let room = create_classroom(&app, "Geo A", &course, &[app.student.id, other.id]).await;

    let (status, _) = app
        .send(json_request(
            "DELETE",
            &format!("/api/users/{}", app.student.id),
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
    let students = body["classroom"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["id"], other.id.to_string());
}

#[tokio::test]
async fn test_student_lists_only_own_classrooms() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Drama").await;
    let other = app.user("Olly Student", "olly@classhub.test", Role::Student).await;
    create_classroom(&app, "Drama A", &course, &[app.student.id]).await;

    let (status, body) = app
        .send(json_request(
            "GET",
            &format!("/api/classrooms/student/{}", app.student.id),
            Some(&app.student.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classrooms"][0]["name"], "Drama A");

    let (status, _) = app
        .send(json_request(
            "GET",
            &format!("/api/classrooms/student/{}", other.id),
            Some(&app.student.token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_summary_reports_placements() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Economics").await;
    app.user("Una Placed", "una@classhub.test", Role::Student).await;
    create_classroom(&app, "Econ A", &course, &[app.student.id]).await;

    let (status, body) = app
        .send(json_request("GET", "/api/admin/summary", Some(&app.admin.token), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["total_students"], 2);
    assert_eq!(body["counts"]["students_in_classes"], 1);
    assert_eq!(body["counts"]["students_not_assigned"], 1);
    assert_eq!(body["students"][0]["class"], "Econ A");
    assert_eq!(body["teachers"][0]["email"], app.teacher.email);

    let (status, _) = app
        .send(json_request("GET", "/api/admin/summary", Some(&app.teacher.token), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_create_classrooms() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Latin").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/classrooms",
            Some(&app.student.token),
            Some(json!({ "name": "Latin A", "course": course })),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Missing required permission: classrooms:write");
}

#[tokio::test]
async fn test_update_with_non_array_students_is_rejected() {
    let app = TestApp::spawn().await;
    let course = create_course(&app, "Greek").await;
    let room = create_classroom(&app, "Greek A", &course, &[]).await;

    let (status, _) = app
        .send(json_request(
            "PUT",
            &format!("/api/classrooms/{room}"),
            Some(&app.admin.token),
            Some(json!({ "students": app.student.id.to_string() })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

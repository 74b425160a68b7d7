use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse, permissions};
use classhub_models::classrooms::{
    ClassroomEnvelope, ClassroomsEnvelope, CreateClassroomDto, RosterStudentDto,
    UpdateClassroomDto,
};
use classhub_models::{ClassroomId, MessageResponse, UserId};
use classhub_roster::parse_id;

use crate::middleware::auth::{
    AuthUser, RequireClassroomsRead, RequireClassroomsWrite, RequireRosterManage,
};
use crate::modules::classrooms::service::ClassroomService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a classroom with an optional initial roster
#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created", body = ClassroomEnvelope),
        (status = 400, description = "Invalid id, teacher is not a teacher, or a listed user is not a student", body = ErrorResponse),
        (status = 403, description = "Requires classrooms:write", body = ErrorResponse),
        (status = 404, description = "Course or students not found", body = ErrorResponse),
        (status = 409, description = "Students already belong to another classroom", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_classroom(
    State(state): State<AppState>,
    RequireClassroomsWrite(_auth_user): RequireClassroomsWrite,
    ValidatedJson(dto): ValidatedJson<CreateClassroomDto>,
) -> Result<(StatusCode, Json<ClassroomEnvelope>), AppError> {
    let classroom = ClassroomService::create_classroom(&state, dto).await?;
    Ok((StatusCode::CREATED, Json(ClassroomEnvelope { classroom })))
}

#[utoipa::path(
    get,
    path = "/api/classrooms",
    responses(
        (status = 200, description = "Classrooms with course, teacher and students", body = ClassroomsEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classrooms(
    State(state): State<AppState>,
    RequireClassroomsRead(_auth_user): RequireClassroomsRead,
) -> Result<Json<ClassroomsEnvelope>, AppError> {
    let classrooms = ClassroomService::get_classrooms(&state).await?;
    Ok(Json(ClassroomsEnvelope { classrooms }))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(("id" = String, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom; the course includes its description", body = ClassroomEnvelope),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classroom(
    State(state): State<AppState>,
    RequireClassroomsRead(_auth_user): RequireClassroomsRead,
    Path(id): Path<String>,
) -> Result<Json<ClassroomEnvelope>, AppError> {
    let id = parse_id::<ClassroomId>(&id)?;
    let classroom = ClassroomService::get_classroom(&state, id).await?;
    Ok(Json(ClassroomEnvelope { classroom }))
}

/// Classrooms a student is enrolled in (students may only ask about themselves)
#[utoipa::path(
    get,
    path = "/api/classrooms/student/{student_id}",
    params(("student_id" = String, Path, description = "Student user ID")),
    responses(
        (status = 200, description = "Classrooms holding the student", body = ClassroomsEnvelope),
        (status = 403, description = "Another student's classrooms", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_classrooms(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(student_id): Path<String>,
) -> Result<Json<ClassroomsEnvelope>, AppError> {
    let student = parse_id::<UserId>(&student_id)?;
    auth_user.require_self_or(student, permissions::USERS_READ)?;
    let classrooms = ClassroomService::get_student_classrooms(&state, student).await?;
    Ok(Json(ClassroomsEnvelope { classrooms }))
}

/// Update name, course, teacher, or replace the roster
#[utoipa::path(
    put,
    path = "/api/classrooms/{id}",
    params(("id" = String, Path, description = "Classroom ID")),
    request_body = UpdateClassroomDto,
    responses(
        (status = 200, description = "Classroom updated", body = ClassroomEnvelope),
        (status = 400, description = "Invalid id, teacher or students", body = ErrorResponse),
        (status = 404, description = "Classroom, course or students not found", body = ErrorResponse),
        (status = 409, description = "Students already belong to another classroom", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_classroom(
    State(state): State<AppState>,
    RequireClassroomsWrite(_auth_user): RequireClassroomsWrite,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateClassroomDto>,
) -> Result<Json<ClassroomEnvelope>, AppError> {
    let id = parse_id::<ClassroomId>(&id)?;
    let classroom = ClassroomService::update_classroom(&state, id, dto).await?;
    Ok(Json(ClassroomEnvelope { classroom }))
}

#[utoipa::path(
    delete,
    path = "/api/classrooms/{id}",
    params(("id" = String, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom deleted", body = MessageResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_classroom(
    State(state): State<AppState>,
    RequireClassroomsWrite(_auth_user): RequireClassroomsWrite,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id::<ClassroomId>(&id)?;
    ClassroomService::delete_classroom(&state, id).await?;
    Ok(Json(MessageResponse::with_id("Classroom deleted successfully", id)))
}

/// Enroll one student; a no-op if already on this roster
#[utoipa::path(
    post,
    path = "/api/classrooms/{id}/add-student",
    params(("id" = String, Path, description = "Classroom ID")),
    request_body = RosterStudentDto,
    responses(
        (status = 200, description = "Updated classroom", body = ClassroomEnvelope),
        (status = 400, description = "Invalid id or not a student", body = ErrorResponse),
        (status = 403, description = "Requires classrooms:manage_roster", body = ErrorResponse),
        (status = 404, description = "Classroom or student not found", body = ErrorResponse),
        (status = 409, description = "Student already belongs to another classroom", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_student(
    State(state): State<AppState>,
    RequireRosterManage(_auth_user): RequireRosterManage,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<RosterStudentDto>,
) -> Result<Json<ClassroomEnvelope>, AppError> {
    let id = parse_id::<ClassroomId>(&id)?;
    let classroom = ClassroomService::add_student(&state, id, &dto.student_id).await?;
    Ok(Json(ClassroomEnvelope { classroom }))
}

/// Remove one student; absent students are ignored
#[utoipa::path(
    post,
    path = "/api/classrooms/{id}/remove-student",
    params(("id" = String, Path, description = "Classroom ID")),
    request_body = RosterStudentDto,
    responses(
        (status = 200, description = "Updated classroom", body = ClassroomEnvelope),
        (status = 403, description = "Requires classrooms:manage_roster", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_student(
    State(state): State<AppState>,
    RequireRosterManage(_auth_user): RequireRosterManage,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<RosterStudentDto>,
) -> Result<Json<ClassroomEnvelope>, AppError> {
    let id = parse_id::<ClassroomId>(&id)?;
    let classroom = ClassroomService::remove_student(&state, id, &dto.student_id).await?;
    Ok(Json(ClassroomEnvelope { classroom }))
}

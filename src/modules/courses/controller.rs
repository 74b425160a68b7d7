use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse};
use classhub_models::courses::{
    CourseDetail, CourseEnvelope, CoursesEnvelope, CreateCourseDto, UpdateCourseDto,
};
use classhub_models::{CourseId, MessageResponse};
use classhub_roster::parse_id;

use crate::middleware::auth::{RequireCoursesRead, RequireCoursesWrite};
use crate::modules::courses::service::CourseService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = CourseEnvelope),
        (status = 400, description = "Teacher is not a teacher", body = ErrorResponse),
        (status = 403, description = "Requires courses:write", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    RequireCoursesWrite(_auth_user): RequireCoursesWrite,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<CourseEnvelope>), AppError> {
    let course = CourseService::create_course(&state, dto).await?;
    Ok((StatusCode::CREATED, Json(CourseEnvelope { course })))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Courses with their teacher", body = CoursesEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    RequireCoursesRead(_auth_user): RequireCoursesRead,
) -> Result<Json<CoursesEnvelope>, AppError> {
    let courses = CourseService::get_courses(&state).await?;
    Ok(Json(CoursesEnvelope { courses }))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course and the classrooms using it", body = CourseDetail),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    RequireCoursesRead(_auth_user): RequireCoursesRead,
    Path(id): Path<String>,
) -> Result<Json<CourseDetail>, AppError> {
    let id = parse_id::<CourseId>(&id)?;
    Ok(Json(CourseService::get_course(&state, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = CourseEnvelope),
        (status = 400, description = "Teacher is not a teacher", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_course(
    State(state): State<AppState>,
    RequireCoursesWrite(_auth_user): RequireCoursesWrite,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<CourseEnvelope>, AppError> {
    let id = parse_id::<CourseId>(&id)?;
    let course = CourseService::update_course(&state, id, dto).await?;
    Ok(Json(CourseEnvelope { course }))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted; classrooms unlinked", body = MessageResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    RequireCoursesWrite(_auth_user): RequireCoursesWrite,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id::<CourseId>(&id)?;
    CourseService::delete_course(&state, id).await?;
    Ok(Json(MessageResponse::with_id("Course deleted successfully", id)))
}

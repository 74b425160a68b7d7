use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse};
use classhub_models::assignments::{AssignmentView, CreateAssignmentDto, UpdateAssignmentDto};
use classhub_models::{AssignmentId, ClassroomId, MessageResponse};
use classhub_roster::parse_id;

use crate::middleware::auth::{RequireAssignmentsRead, RequireAssignmentsWrite};
use crate::modules::assignments::service::AssignmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = CreateAssignmentDto,
    responses(
        (status = 201, description = "Assignment created by the caller", body = AssignmentView),
        (status = 403, description = "Requires assignments:write", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_assignment(
    State(state): State<AppState>,
    RequireAssignmentsWrite(auth_user): RequireAssignmentsWrite,
    ValidatedJson(dto): ValidatedJson<CreateAssignmentDto>,
) -> Result<(StatusCode, Json<AssignmentView>), AppError> {
    let created_by = auth_user.user_id()?;
    let assignment =
        AssignmentService::create_assignment(state.store.as_ref(), created_by, dto).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    get,
    path = "/api/assignments",
    responses(
        (status = 200, description = "All assignments", body = Vec<AssignmentView>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_assignments(
    State(state): State<AppState>,
    RequireAssignmentsRead(_auth_user): RequireAssignmentsRead,
) -> Result<Json<Vec<AssignmentView>>, AppError> {
    Ok(Json(AssignmentService::get_assignments(state.store.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = String, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment", body = AssignmentView),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_assignment(
    State(state): State<AppState>,
    RequireAssignmentsRead(_auth_user): RequireAssignmentsRead,
    Path(id): Path<String>,
) -> Result<Json<AssignmentView>, AppError> {
    let id = parse_id::<AssignmentId>(&id)?;
    Ok(Json(AssignmentService::get_assignment(state.store.as_ref(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/assignments/classroom/{classroom_id}",
    params(("classroom_id" = String, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Assignments sorted by due date", body = Vec<AssignmentView>)
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classroom_assignments(
    State(state): State<AppState>,
    RequireAssignmentsRead(_auth_user): RequireAssignmentsRead,
    Path(classroom_id): Path<String>,
) -> Result<Json<Vec<AssignmentView>>, AppError> {
    let classroom_id = parse_id::<ClassroomId>(&classroom_id)?;
    let assignments =
        AssignmentService::get_classroom_assignments(state.store.as_ref(), classroom_id).await?;
    Ok(Json(assignments))
}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    params(("id" = String, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentDto,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentView),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_assignment(
    State(state): State<AppState>,
    RequireAssignmentsWrite(_auth_user): RequireAssignmentsWrite,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateAssignmentDto>,
) -> Result<Json<AssignmentView>, AppError> {
    let id = parse_id::<AssignmentId>(&id)?;
    Ok(Json(AssignmentService::update_assignment(state.store.as_ref(), id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    params(("id" = String, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment deleted", body = MessageResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_assignment(
    State(state): State<AppState>,
    RequireAssignmentsWrite(_auth_user): RequireAssignmentsWrite,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id::<AssignmentId>(&id)?;
    AssignmentService::delete_assignment(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse::with_id("Assignment deleted successfully", id)))
}

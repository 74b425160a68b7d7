use anyhow::anyhow;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse, permissions};
use classhub_models::submissions::{
    GradeSubmissionDto, SubmissionStats, SubmissionUploadForm, SubmissionView,
};
use classhub_models::{AssignmentId, MessageResponse, SubmissionId, UserId};
use classhub_roster::parse_id;

use crate::middleware::auth::{
    AuthUser, RequireSubmissionsDelete, RequireSubmissionsGrade, RequireSubmissionsRead,
    RequireSubmissionsSubmit,
};
use crate::modules::submissions::model::SubmissionForm;
use crate::modules::submissions::service::SubmissionService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Submit work for an assignment (multipart)
#[utoipa::path(
    post,
    path = "/api/submissions",
    request_body(content = SubmissionUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Submission recorded", body = SubmissionView),
        (status = 400, description = "Missing assignment, rejected file, or not a student", body = ErrorResponse),
        (status = 403, description = "Submitting for someone else", body = ErrorResponse),
        (status = 404, description = "Assignment or student not found", body = ErrorResponse),
        (status = 409, description = "Already submitted", body = ErrorResponse)
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn create_submission(
    State(state): State<AppState>,
    RequireSubmissionsSubmit(auth_user): RequireSubmissionsSubmit,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionView>), AppError> {
    let form = SubmissionForm::read(multipart).await?;

    let assignment = form
        .assignment
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow!("assignment is required")))?;
    let assignment = parse_id::<AssignmentId>(assignment)?;

    let student = match form.student.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_id::<UserId>(raw)?,
        None => auth_user.user_id()?,
    };
    auth_user.require_self_or(student, permissions::SUBMISSIONS_GRADE)?;

    let submission = SubmissionService::create_submission(
        &state,
        assignment,
        student,
        form.submission_text.unwrap_or_default(),
        form.file,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Resubmit: replaces the text and, when given, the file
#[utoipa::path(
    put,
    path = "/api/submissions/{id}",
    params(("id" = String, Path, description = "Submission ID")),
    request_body(content = SubmissionUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Submission updated", body = SubmissionView),
        (status = 403, description = "Not your submission", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn update_submission(
    State(state): State<AppState>,
    RequireSubmissionsSubmit(auth_user): RequireSubmissionsSubmit,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<SubmissionView>, AppError> {
    let id = parse_id::<SubmissionId>(&id)?;
    let existing = SubmissionService::get_submission(state.store.as_ref(), id).await?;
    auth_user.require_self_or(existing.student_id, permissions::SUBMISSIONS_GRADE)?;

    let form = SubmissionForm::read(multipart).await?;
    let submission = SubmissionService::resubmit(
        &state,
        existing,
        form.submission_text.unwrap_or_default(),
        form.file,
    )
    .await?;

    Ok(Json(submission))
}

#[utoipa::path(
    put,
    path = "/api/submissions/{id}/grade",
    params(("id" = String, Path, description = "Submission ID")),
    request_body = GradeSubmissionDto,
    responses(
        (status = 200, description = "Submission graded by the caller", body = SubmissionView),
        (status = 403, description = "Requires submissions:grade", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn grade_submission(
    State(state): State<AppState>,
    RequireSubmissionsGrade(auth_user): RequireSubmissionsGrade,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<GradeSubmissionDto>,
) -> Result<Json<SubmissionView>, AppError> {
    let id = parse_id::<SubmissionId>(&id)?;
    let graded_by = auth_user.user_id()?;
    let submission =
        SubmissionService::grade_submission(&state, id, dto.grade, dto.feedback, graded_by).await?;
    Ok(Json(submission))
}

#[utoipa::path(
    delete,
    path = "/api/submissions/{id}",
    params(("id" = String, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission and its file deleted", body = MessageResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_submission(
    State(state): State<AppState>,
    RequireSubmissionsDelete(_auth_user): RequireSubmissionsDelete,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id::<SubmissionId>(&id)?;
    SubmissionService::delete_submission(&state, id).await?;
    Ok(Json(MessageResponse::with_id("Submission deleted successfully", id)))
}

#[utoipa::path(
    get,
    path = "/api/submissions/assignment/{id}",
    params(("id" = String, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Submissions, newest first", body = Vec<SubmissionView>),
        (status = 403, description = "Requires submissions:read", body = ErrorResponse)
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_assignment_submissions(
    State(state): State<AppState>,
    RequireSubmissionsRead(_auth_user): RequireSubmissionsRead,
    Path(id): Path<String>,
) -> Result<Json<Vec<SubmissionView>>, AppError> {
    let id = parse_id::<AssignmentId>(&id)?;
    Ok(Json(SubmissionService::get_assignment_submissions(&state, id).await?))
}

/// A student's submissions (students may only list their own)
#[utoipa::path(
    get,
    path = "/api/submissions/student/{id}",
    params(("id" = String, Path, description = "Student user ID")),
    responses(
        (status = 200, description = "Submissions with assignment, classroom and course names", body = Vec<SubmissionView>),
        (status = 403, description = "Another student's submissions", body = ErrorResponse)
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_submissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<SubmissionView>>, AppError> {
    let student = parse_id::<UserId>(&id)?;
    auth_user.require_self_or(student, permissions::SUBMISSIONS_READ)?;
    Ok(Json(SubmissionService::get_student_submissions(&state, student).await?))
}

#[utoipa::path(
    get,
    path = "/api/submissions/stats/{teacher_id}",
    params(("teacher_id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Totals over the teacher's assignments", body = SubmissionStats),
        (status = 403, description = "Requires submissions:read", body = ErrorResponse)
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_submission_stats(
    State(state): State<AppState>,
    RequireSubmissionsRead(_auth_user): RequireSubmissionsRead,
    Path(teacher_id): Path<String>,
) -> Result<Json<SubmissionStats>, AppError> {
    let teacher = parse_id::<UserId>(&teacher_id)?;
    Ok(Json(SubmissionService::get_stats(state.store.as_ref(), teacher).await?))
}

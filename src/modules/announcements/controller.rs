use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse};
use classhub_models::announcements::{
    AnnouncementView, CreateAnnouncementDto, UpdateAnnouncementDto,
};
use classhub_models::{AnnouncementId, ClassroomId, MessageResponse};
use classhub_roster::parse_id;

use crate::middleware::auth::{RequireAnnouncementsRead, RequireAnnouncementsWrite};
use crate::modules::announcements::service::AnnouncementService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/announcements",
    responses(
        (status = 200, description = "Announcements with their author", body = Vec<AnnouncementView>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_announcements(
    State(state): State<AppState>,
    RequireAnnouncementsRead(_auth_user): RequireAnnouncementsRead,
) -> Result<Json<Vec<AnnouncementView>>, AppError> {
    Ok(Json(AnnouncementService::get_announcements(state.store.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/announcements/classroom/{classroom_id}",
    params(("classroom_id" = String, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Announcements posted to the classroom", body = Vec<AnnouncementView>)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classroom_announcements(
    State(state): State<AppState>,
    RequireAnnouncementsRead(_auth_user): RequireAnnouncementsRead,
    Path(classroom_id): Path<String>,
) -> Result<Json<Vec<AnnouncementView>>, AppError> {
    let classroom_id = parse_id::<ClassroomId>(&classroom_id)?;
    let announcements =
        AnnouncementService::get_classroom_announcements(state.store.as_ref(), classroom_id).await?;
    Ok(Json(announcements))
}

#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement posted by the caller", body = AnnouncementView),
        (status = 403, description = "Requires announcements:write", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_announcement(
    State(state): State<AppState>,
    RequireAnnouncementsWrite(auth_user): RequireAnnouncementsWrite,
    ValidatedJson(dto): ValidatedJson<CreateAnnouncementDto>,
) -> Result<(StatusCode, Json<AnnouncementView>), AppError> {
    let created_by = auth_user.user_id()?;
    let announcement =
        AnnouncementService::create_announcement(state.store.as_ref(), created_by, dto).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(("id" = String, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = AnnouncementView),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_announcement(
    State(state): State<AppState>,
    RequireAnnouncementsWrite(_auth_user): RequireAnnouncementsWrite,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateAnnouncementDto>,
) -> Result<Json<AnnouncementView>, AppError> {
    let id = parse_id::<AnnouncementId>(&id)?;
    Ok(Json(AnnouncementService::update_announcement(state.store.as_ref(), id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(("id" = String, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement deleted", body = MessageResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    tag = "Announcements",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    RequireAnnouncementsWrite(_auth_user): RequireAnnouncementsWrite,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id::<AnnouncementId>(&id)?;
    AnnouncementService::delete_announcement(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse::with_id("Announcement deleted successfully", id)))
}

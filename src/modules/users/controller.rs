use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse, permissions};
use classhub_models::users::{
    CreateUserDto, UpdateProfileDto, UpdateUserDto, UserDetail, UserEnvelope, UserFilterParams,
    UsersEnvelope,
};
use classhub_models::{MessageResponse, UserId};
use classhub_roster::parse_id;

use crate::middleware::auth::{
    AuthUser, RequireUsersCreate, RequireUsersDelete, RequireUsersRead, RequireUsersUpdate,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 403, description = "Requires users:create", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    RequireUsersCreate(_auth_user): RequireUsersCreate,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let user = UserService::create_user(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Users, optionally filtered by role", body = UsersEnvelope),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires users:read", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    RequireUsersRead(_auth_user): RequireUsersRead,
    filters: Result<Query<UserFilterParams>, QueryRejection>,
) -> Result<Json<UsersEnvelope>, AppError> {
    let Query(filters) =
        filters.map_err(|e| AppError::bad_request(anyhow::anyhow!(e.body_text())))?;
    let users = UserService::get_users(state.store.as_ref(), filters.role).await?;
    Ok(Json(UsersEnvelope { users }))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with what they teach or attend", body = UserDetail),
        (status = 403, description = "Requires users:read", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    RequireUsersRead(_auth_user): RequireUsersRead,
    Path(id): Path<String>,
) -> Result<Json<UserDetail>, AppError> {
    let id = parse_id::<UserId>(&id)?;
    let detail = UserService::get_user_detail(state.store.as_ref(), id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated; a role change clears stale references", body = UserEnvelope),
        (status = 403, description = "Requires users:update", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    RequireUsersUpdate(_auth_user): RequireUsersUpdate,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserEnvelope>, AppError> {
    let id = parse_id::<UserId>(&id)?;
    let user = UserService::update_user(&state.roster, id, dto).await?;
    Ok(Json(UserEnvelope { user }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted and unlinked everywhere", body = MessageResponse),
        (status = 403, description = "Requires users:delete", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireUsersDelete(_auth_user): RequireUsersDelete,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id::<UserId>(&id)?;
    UserService::delete_user(&state.roster, id).await?;
    Ok(Json(MessageResponse::with_id("User deleted successfully", id)))
}

#[utoipa::path(
    get,
    path = "/api/users/profile/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = UserEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not your profile", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, AppError> {
    let id = parse_id::<UserId>(&id)?;
    auth_user.require_self_or(id, permissions::USERS_READ)?;
    let user = UserService::get_user(state.store.as_ref(), id).await?;
    Ok(Json(UserEnvelope { user }))
}

#[utoipa::path(
    put,
    path = "/api/users/profile/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = UserEnvelope),
        (status = 403, description = "Not your profile", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<UserEnvelope>, AppError> {
    let id = parse_id::<UserId>(&id)?;
    auth_user.require_self_or(id, permissions::USERS_UPDATE)?;
    let user = UserService::update_profile(&state.roster, id, dto).await?;
    Ok(Json(UserEnvelope { user }))
}

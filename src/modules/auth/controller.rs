use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse};
use classhub_models::auth::{LoginRequest, LoginResponse};
use classhub_models::users::{CreateUserDto, UserEnvelope};

use crate::middleware::auth::RequireUsersCreate;
use crate::modules::auth::service::AuthService;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Login and receive an access token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(state.store.as_ref(), dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Register a user (admin only)
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User registered", body = UserEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires users:create", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    RequireUsersCreate(_auth_user): RequireUsersCreate,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let user = UserService::create_user(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

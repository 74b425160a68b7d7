use axum::{Json, extract::State};
use tracing::instrument;

use classhub_core::{AppError, ErrorResponse};
use classhub_models::admin::AdminSummary;

use crate::middleware::auth::RequireAdminSummary;
use crate::modules::admin::service::AdminService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/summary",
    responses(
        (status = 200, description = "Student placements, teacher loads and totals", body = AdminSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Requires admin:summary", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    RequireAdminSummary(_auth_user): RequireAdminSummary,
) -> Result<Json<AdminSummary>, AppError> {
    Ok(Json(AdminService::get_summary(state.store.as_ref()).await?))
}

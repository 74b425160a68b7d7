use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use classhub_auth::{Claims, verify_token};
use classhub_core::{AppError, permissions};
use classhub_models::{Role, UserId};

use crate::state::AppState;

/// Extractor that validates the bearer token and exposes its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.permissions.iter().any(|p| p == permission)
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn role(&self) -> Option<Role> {
        self.0.role.parse().ok()
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Passes when the caller is `owner` or holds `permission`.
    pub fn require_self_or(&self, owner: UserId, permission: &str) -> Result<(), AppError> {
        if self.user_id()? == owner || self.has_permission(permission) {
            return Ok(());
        }
        Err(AppError::forbidden(format!(
            "Access denied. Missing required permission: {}",
            permission
        )))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that authenticates the caller and then requires one capability.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = classhub_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if !auth_user.has_permission($permission) {
                    tracing::warn!(
                        user = %auth_user.0.sub,
                        permission = $permission,
                        "Permission denied"
                    );
                    return Err(classhub_core::AppError::forbidden(format!(
                        "Access denied. Missing required permission: {}",
                        $permission
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

// Users
require_permission!(RequireUsersCreate, permissions::USERS_CREATE);
require_permission!(RequireUsersRead, permissions::USERS_READ);
require_permission!(RequireUsersUpdate, permissions::USERS_UPDATE);
require_permission!(RequireUsersDelete, permissions::USERS_DELETE);

// Courses & classrooms
require_permission!(RequireCoursesRead, permissions::COURSES_READ);
require_permission!(RequireCoursesWrite, permissions::COURSES_WRITE);
require_permission!(RequireClassroomsRead, permissions::CLASSROOMS_READ);
require_permission!(RequireClassroomsWrite, permissions::CLASSROOMS_WRITE);
require_permission!(RequireRosterManage, permissions::CLASSROOMS_MANAGE_ROSTER);

// Coursework
require_permission!(RequireAssignmentsRead, permissions::ASSIGNMENTS_READ);
require_permission!(RequireAssignmentsWrite, permissions::ASSIGNMENTS_WRITE);
require_permission!(RequireAnnouncementsRead, permissions::ANNOUNCEMENTS_READ);
require_permission!(RequireAnnouncementsWrite, permissions::ANNOUNCEMENTS_WRITE);
require_permission!(RequireSubmissionsRead, permissions::SUBMISSIONS_READ);
require_permission!(RequireSubmissionsSubmit, permissions::SUBMISSIONS_SUBMIT);
require_permission!(RequireSubmissionsGrade, permissions::SUBMISSIONS_GRADE);
require_permission!(RequireSubmissionsDelete, permissions::SUBMISSIONS_DELETE);

// Admin
require_permission!(RequireAdminSummary, permissions::ADMIN_SUMMARY);

use tracing::instrument;

use classhub_auth::create_access_token;
use classhub_config::JwtConfig;
use classhub_core::{AppError, verify_password};
use classhub_db::{Store, UserStore};
use classhub_models::Email;
use classhub_models::auth::{LoginRequest, LoginResponse};

use crate::metrics::{track_login_failure, track_login_success};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// Exchanges credentials for an access token carrying the role's capabilities.
    #[instrument(skip(store, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        store: &dyn Store,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = Email::new(&dto.email).map_err(|_| {
            track_login_failure("invalid_email");
            AppError::unauthorized(INVALID_CREDENTIALS)
        })?;

        let Some(user) = store.find_user_by_email(email.as_str()).await? else {
            track_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &user.password)? {
            track_login_failure("wrong_password");
            tracing::warn!(user_id = %user.id, "Login rejected");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let access_token = create_access_token(
            user.id.into_inner(),
            &user.email,
            user.role.as_str(),
            user.role.permissions(),
            jwt_config,
        )?;

        track_login_success(user.role.as_str());
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse { access_token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_auth::verify_token;
    use classhub_core::password::hash_password_with_cost;
    use classhub_db::{MemoryStore, NewUser};
    use classhub_models::Role;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    async fn store_with_teacher() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_user(NewUser {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                password_hash: hash_password_with_cost("password123", 4).unwrap(),
                role: Role::Teacher,
            })
            .await
            .unwrap();
        store
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_with_role_capabilities() {
        let store = store_with_teacher().await;
        let config = jwt_config();

        let request = login("Grace@Example.com", "password123");
        let response = AuthService::login_user(&store, request, &config).await.unwrap();

        let claims = verify_token(&response.access_token, &config).unwrap();
        assert_eq!(claims.sub, response.user.id.to_string());
        assert_eq!(claims.role, "teacher");
        assert_eq!(claims.permissions, Role::Teacher.permissions());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_unauthorized() {
        let store = store_with_teacher().await;
        let config = jwt_config();

        let err = AuthService::login_user(&store, login("grace@example.com", "nope-nope"), &config)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 401);

        let request = login("ghost@example.com", "password123");
        let err = AuthService::login_user(&store, request, &config).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.error.to_string(), INVALID_CREDENTIALS);
    }
}

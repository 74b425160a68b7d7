use axum::{Router, routing::post};

use crate::modules::auth::controller::{login_user, register_user};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

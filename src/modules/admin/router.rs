use axum::{Router, routing::get};

use crate::modules::admin::controller::get_summary;
use crate::state::AppState;

pub fn init_admin_router() -> Router<AppState> {
    Router::new().route("/summary", get(get_summary))
}

use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::announcements::controller::{
    create_announcement, delete_announcement, get_announcements, get_classroom_announcements,
    update_announcement,
};
use crate::state::AppState;

pub fn init_announcements_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_announcements).post(create_announcement))
        .route("/classroom/{classroom_id}", get(get_classroom_announcements))
        .route("/{id}", put(update_announcement).delete(delete_announcement))
}

use axum::{Router, routing::get};

use crate::modules::assignments::controller::{
    create_assignment, delete_assignment, get_assignment, get_assignments,
    get_classroom_assignments, update_assignment,
};
use crate::state::AppState;

pub fn init_assignments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_assignments).post(create_assignment))
        .route("/classroom/{classroom_id}", get(get_classroom_assignments))
        .route(
            "/{id}",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
}

use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::classrooms::controller::{
    add_student, create_classroom, delete_classroom, get_classroom, get_classrooms,
    get_student_classrooms, remove_student, update_classroom,
};
use crate::state::AppState;

pub fn init_classrooms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classrooms).post(create_classroom))
        .route("/student/{student_id}", get(get_student_classrooms))
        .route(
            "/{id}",
            get(get_classroom)
                .put(update_classroom)
                .delete(delete_classroom),
        )
        .route("/{id}/add-student", post(add_student))
        .route("/{id}/remove-student", post(remove_student))
}

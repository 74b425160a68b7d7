use axum::{
    Router,
    routing::{get, post, put},
};

use crate::modules::submissions::controller::{
    create_submission, delete_submission, get_assignment_submissions, get_student_submissions,
    get_submission_stats, grade_submission, update_submission,
};
use crate::state::AppState;

pub fn init_submissions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_submission))
        .route("/{id}", put(update_submission).delete(delete_submission))
        .route("/{id}/grade", put(grade_submission))
        .route("/assignment/{id}", get(get_assignment_submissions))
        .route("/student/{id}", get(get_student_submissions))
        .route("/stats/{teacher_id}", get(get_submission_stats))
}

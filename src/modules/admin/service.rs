use tracing::instrument;

use classhub_core::AppError;
use classhub_db::{ClassroomStore, CourseStore, Store, UserStore};
use classhub_models::admin::AdminSummary;

pub struct AdminService;

impl AdminService {
    /// Placement of every student and the load of every teaching teacher.
    #[instrument(skip(store))]
    pub async fn get_summary(store: &dyn Store) -> Result<AdminSummary, AppError> {
        let users = store.list_users(None).await?;
        let courses = store.list_courses().await?;
        let classrooms = store.list_classrooms().await?;

        let summary = AdminSummary::build(&users, &courses, &classrooms);
        tracing::debug!(counts = ?summary.counts, "Built admin summary");
        Ok(summary)
    }
}

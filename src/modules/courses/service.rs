use anyhow::anyhow;
use tracing::instrument;

use classhub_core::AppError;
use classhub_db::{ClassroomStore, CourseStore};
use classhub_models::CourseId;
use classhub_models::courses::{CourseDetail, CourseView, CreateCourseDto, UpdateCourseDto};

use crate::modules::views::{classroom_views, course_view, course_views};
use crate::state::AppState;

pub struct CourseService;

impl CourseService {
    #[instrument(skip(state, dto))]
    pub async fn create_course(
        state: &AppState,
        dto: CreateCourseDto,
    ) -> Result<CourseView, AppError> {
        let course = state.roster.create_course(dto).await?;
        tracing::info!(course_id = %course.id, "Course created");
        course_view(state.store.as_ref(), course).await
    }

    #[instrument(skip(state))]
    pub async fn get_courses(state: &AppState) -> Result<Vec<CourseView>, AppError> {
        let courses = state.store.list_courses().await?;
        course_views(state.store.as_ref(), courses).await
    }

    /// The course and every classroom running it.
    #[instrument(skip(state))]
    pub async fn get_course(state: &AppState, id: CourseId) -> Result<CourseDetail, AppError> {
        let store = state.store.as_ref();
        let course = store
            .find_course(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))?;
        let classrooms = store.list_classrooms_by_course(id).await?;

        Ok(CourseDetail {
            course: course_view(store, course).await?,
            classrooms: classroom_views(store, classrooms, false).await?,
        })
    }

    #[instrument(skip(state, dto))]
    pub async fn update_course(
        state: &AppState,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<CourseView, AppError> {
        let course = state.roster.update_course(id, dto).await?;
        course_view(state.store.as_ref(), course).await
    }

    /// Classrooms using the course keep existing with no course.
    #[instrument(skip(state))]
    pub async fn delete_course(state: &AppState, id: CourseId) -> Result<(), AppError> {
        state.roster.delete_course(id).await?;
        tracing::info!(course_id = %id, "Course deleted");
        Ok(())
    }
}

use anyhow::anyhow;
use tracing::instrument;

use classhub_core::AppError;
use classhub_db::ClassroomStore;
use classhub_models::classrooms::{ClassroomView, CreateClassroomDto, UpdateClassroomDto};
use classhub_models::{ClassroomId, UserId};

use crate::modules::views::{classroom_view, classroom_views};
use crate::state::AppState;

pub struct ClassroomService;

impl ClassroomService {
    #[instrument(skip(state, dto))]
    pub async fn create_classroom(
        state: &AppState,
        dto: CreateClassroomDto,
    ) -> Result<ClassroomView, AppError> {
        let classroom = state.roster.create_classroom(dto).await?;
        tracing::info!(
            classroom_id = %classroom.id,
            students = classroom.student_ids.len(),
            "Classroom created"
        );
        classroom_view(state.store.as_ref(), classroom, false).await
    }

    #[instrument(skip(state))]
    pub async fn get_classrooms(state: &AppState) -> Result<Vec<ClassroomView>, AppError> {
        let classrooms = state.store.list_classrooms().await?;
        classroom_views(state.store.as_ref(), classrooms, false).await
    }

    #[instrument(skip(state))]
    pub async fn get_classroom(
        state: &AppState,
        id: ClassroomId,
    ) -> Result<ClassroomView, AppError> {
        let classroom = state
            .store
            .find_classroom(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))?;
        classroom_view(state.store.as_ref(), classroom, true).await
    }

    #[instrument(skip(state))]
    pub async fn get_student_classrooms(
        state: &AppState,
        student: UserId,
    ) -> Result<Vec<ClassroomView>, AppError> {
        let classrooms = state.store.list_classrooms_by_student(student).await?;
        classroom_views(state.store.as_ref(), classrooms, false).await
    }

    #[instrument(skip(state, dto))]
    pub async fn update_classroom(
        state: &AppState,
        id: ClassroomId,
        dto: UpdateClassroomDto,
    ) -> Result<ClassroomView, AppError> {
        let classroom = state.roster.update_classroom(id, dto).await?;
        classroom_view(state.store.as_ref(), classroom, false).await
    }

    #[instrument(skip(state))]
    pub async fn delete_classroom(state: &AppState, id: ClassroomId) -> Result<(), AppError> {
        state.roster.delete_classroom(id).await?;
        tracing::info!(classroom_id = %id, "Classroom deleted");
        Ok(())
    }

    #[instrument(skip(state))]
    pub async fn add_student(
        state: &AppState,
        id: ClassroomId,
        student: &str,
    ) -> Result<ClassroomView, AppError> {
        let classroom = state.roster.add_student(id, student).await?;
        classroom_view(state.store.as_ref(), classroom, false).await
    }

    #[instrument(skip(state))]
    pub async fn remove_student(
        state: &AppState,
        id: ClassroomId,
        student: &str,
    ) -> Result<ClassroomView, AppError> {
        let classroom = state.roster.remove_student(id, student).await?;
        classroom_view(state.store.as_ref(), classroom, false).await
    }
}

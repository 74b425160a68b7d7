use anyhow::anyhow;
use tracing::instrument;

use classhub_core::AppError;
use classhub_db::{AssignmentChanges, AssignmentStore, ClassroomStore, NewAssignment, Store};
use classhub_models::assignments::{
    Assignment, AssignmentView, CreateAssignmentDto, UpdateAssignmentDto,
};
use classhub_models::{AssignmentId, ClassroomId, UserId};
use classhub_roster::parse_id;

use crate::modules::views::{assignment_view, assignment_views};

pub struct AssignmentService;

impl AssignmentService {
    async fn require_classroom(store: &dyn Store, id: ClassroomId) -> Result<(), AppError> {
        match store.find_classroom(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(anyhow!("Classroom not found"))),
        }
    }

    async fn find(store: &dyn Store, id: AssignmentId) -> Result<Assignment, AppError> {
        store
            .find_assignment(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Assignment not found")))
    }

    #[instrument(skip(store, dto), fields(title = %dto.title))]
    pub async fn create_assignment(
        store: &dyn Store,
        created_by: UserId,
        dto: CreateAssignmentDto,
    ) -> Result<AssignmentView, AppError> {
        let classroom_id = parse_id::<ClassroomId>(&dto.classroom_id)?;
        Self::require_classroom(store, classroom_id).await?;

        let assignment = store
            .insert_assignment(NewAssignment {
                title: dto.title.trim().to_string(),
                description: dto.description,
                due_date: dto.due_date,
                file_url: dto.file_url,
                classroom_id,
                created_by,
            })
            .await?;

        tracing::info!(
            assignment_id = %assignment.id,
            classroom_id = %classroom_id,
            "Assignment created"
        );
        assignment_view(store, assignment).await
    }

    #[instrument(skip(store))]
    pub async fn get_assignments(store: &dyn Store) -> Result<Vec<AssignmentView>, AppError> {
        let assignments = store.list_assignments().await?;
        assignment_views(store, assignments).await
    }

    #[instrument(skip(store))]
    pub async fn get_assignment(
        store: &dyn Store,
        id: AssignmentId,
    ) -> Result<AssignmentView, AppError> {
        let assignment = Self::find(store, id).await?;
        assignment_view(store, assignment).await
    }

    /// Earliest due date first.
    #[instrument(skip(store))]
    pub async fn get_classroom_assignments(
        store: &dyn Store,
        classroom: ClassroomId,
    ) -> Result<Vec<AssignmentView>, AppError> {
        let assignments = store.list_assignments_by_classroom(classroom).await?;
        assignment_views(store, assignments).await
    }

    #[instrument(skip(store, dto))]
    pub async fn update_assignment(
        store: &dyn Store,
        id: AssignmentId,
        dto: UpdateAssignmentDto,
    ) -> Result<AssignmentView, AppError> {
        let changes = AssignmentChanges {
            title: dto.title.map(|t| t.trim().to_string()),
            description: dto.description,
            due_date: dto.due_date,
            file_url: dto.file_url,
        };
        let assignment = store
            .update_assignment(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Assignment not found")))?;
        assignment_view(store, assignment).await
    }

    #[instrument(skip(store))]
    pub async fn delete_assignment(store: &dyn Store, id: AssignmentId) -> Result<(), AppError> {
        if !store.delete_assignment(id).await? {
            return Err(AppError::not_found(anyhow!("Assignment not found")));
        }
        tracing::info!(assignment_id = %id, "Assignment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use classhub_db::{MemoryStore, NewClassroom};

    fn dto(title: &str, classroom: ClassroomId, due_in_days: i64) -> CreateAssignmentDto {
        CreateAssignmentDto {
            title: title.to_string(),
            description: None,
            due_date: Utc::now() + Duration::days(due_in_days),
            file_url: None,
            classroom_id: classroom.to_string(),
        }
    }

    async fn classroom(store: &MemoryStore) -> ClassroomId {
        store
            .insert_classroom(NewClassroom {
                name: "Room".to_string(),
                course_id: None,
                teacher_id: None,
                student_ids: vec![],
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_requires_existing_classroom() {
        let store = MemoryStore::new();
        let essay = dto("Essay", ClassroomId::new(), 1);
        let err = AssignmentService::create_assignment(&store, UserId::new(), essay)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }

    #[tokio::test]
    async fn test_classroom_listing_is_sorted_by_due_date() {
        let store = MemoryStore::new();
        let room = classroom(&store).await;
        let creator = UserId::new();
        for (title, days) in [("Later", 7), ("Sooner", 1)] {
            AssignmentService::create_assignment(&store, creator, dto(title, room, days))
                .await
                .unwrap();
        }

        let listed = AssignmentService::get_classroom_assignments(&store, room).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|v| v.assignment.title.as_str()).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
        assert_eq!(listed[0].classroom.as_ref().unwrap().name, "Room");
    }

    #[tokio::test]
    async fn test_delete_missing_assignment_is_not_found() {
        let store = MemoryStore::new();
        let err = AssignmentService::delete_assignment(&store, AssignmentId::new())
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }
}

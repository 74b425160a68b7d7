use anyhow::anyhow;
use tracing::instrument;

use classhub_core::AppError;
use classhub_db::{AnnouncementChanges, AnnouncementStore, ClassroomStore, NewAnnouncement, Store};
use classhub_models::announcements::{
    Announcement, AnnouncementView, CreateAnnouncementDto, UpdateAnnouncementDto,
};
use classhub_models::{AnnouncementId, ClassroomId, UserId, UserRef};
use classhub_roster::parse_id;

use crate::modules::views::users_by_id;

async fn populate(
    store: &dyn Store,
    announcements: Vec<Announcement>,
) -> Result<Vec<AnnouncementView>, AppError> {
    let creators = users_by_id(store, announcements.iter().map(|a| a.created_by)).await?;
    Ok(announcements
        .into_iter()
        .map(|announcement| AnnouncementView {
            creator: creators.get(&announcement.created_by).map(UserRef::from),
            announcement,
        })
        .collect())
}

async fn populate_one(
    store: &dyn Store,
    announcement: Announcement,
) -> Result<AnnouncementView, AppError> {
    populate(store, vec![announcement])
        .await?
        .pop()
        .ok_or_else(|| AppError::internal_error("Announcement view missing"))
}

pub struct AnnouncementService;

impl AnnouncementService {
    #[instrument(skip(store))]
    pub async fn get_announcements(store: &dyn Store) -> Result<Vec<AnnouncementView>, AppError> {
        let announcements = store.list_announcements().await?;
        populate(store, announcements).await
    }

    #[instrument(skip(store))]
    pub async fn get_classroom_announcements(
        store: &dyn Store,
        classroom: ClassroomId,
    ) -> Result<Vec<AnnouncementView>, AppError> {
        let announcements = store.list_announcements_by_classroom(classroom).await?;
        populate(store, announcements).await
    }

    #[instrument(skip(store, dto), fields(title = %dto.title))]
    pub async fn create_announcement(
        store: &dyn Store,
        created_by: UserId,
        dto: CreateAnnouncementDto,
    ) -> Result<AnnouncementView, AppError> {
        let classroom_id = parse_id::<ClassroomId>(&dto.classroom_id)?;
        if store.find_classroom(classroom_id).await?.is_none() {
            return Err(AppError::not_found(anyhow!("Classroom not found")));
        }

        let announcement = store
            .insert_announcement(NewAnnouncement {
                title: dto.title.trim().to_string(),
                message: dto.message,
                classroom_id,
                created_by,
            })
            .await?;
        populate_one(store, announcement).await
    }

    #[instrument(skip(store, dto))]
    pub async fn update_announcement(
        store: &dyn Store,
        id: AnnouncementId,
        dto: UpdateAnnouncementDto,
    ) -> Result<AnnouncementView, AppError> {
        let announcement = store
            .update_announcement(
                id,
                AnnouncementChanges {
                    title: dto.title.map(|t| t.trim().to_string()),
                    message: dto.message,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Announcement not found")))?;
        populate_one(store, announcement).await
    }

    #[instrument(skip(store))]
    pub async fn delete_announcement(
        store: &dyn Store,
        id: AnnouncementId,
    ) -> Result<(), AppError> {
        if !store.delete_announcement(id).await? {
            return Err(AppError::not_found(anyhow!("Announcement not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_db::{MemoryStore, NewClassroom, NewUser, UserStore};
    use classhub_models::Role;

    #[tokio::test]
    async fn test_create_populates_creator_and_lists_by_classroom() {
        let store = MemoryStore::new();
        let teacher = store
            .insert_user(NewUser {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Teacher,
            })
            .await
            .unwrap();
        let room = store
            .insert_classroom(NewClassroom {
                name: "Room".to_string(),
                course_id: None,
                teacher_id: Some(teacher.id),
                student_ids: vec![],
            })
            .await
            .unwrap();

        let created = AnnouncementService::create_announcement(
            &store,
            teacher.id,
            CreateAnnouncementDto {
                title: "Quiz".to_string(),
                message: "Friday".to_string(),
                classroom_id: room.id.to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.creator.unwrap().name, "Grace");

        let listed = AnnouncementService::get_classroom_announcements(&store, room.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].announcement.title, "Quiz");
    }

    #[tokio::test]
    async fn test_missing_classroom_and_announcement() {
        let store = MemoryStore::new();
        let err = AnnouncementService::create_announcement(
            &store,
            UserId::new(),
            CreateAnnouncementDto {
                title: "Quiz".to_string(),
                message: "Friday".to_string(),
                classroom_id: ClassroomId::new().to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);

        let err = AnnouncementService::delete_announcement(&store, AnnouncementId::new())
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }
}

use anyhow::anyhow;
use tracing::instrument;

use classhub_core::{AppError, hash_password};
use classhub_db::{ClassroomStore, CourseStore, NewUser, Store, UserChanges, UserStore};
use classhub_models::users::{CreateUserDto, UpdateProfileDto, UpdateUserDto, UserDetail};
use classhub_models::{Email, Role, User, UserId};
use classhub_roster::RosterService;

use crate::metrics::track_user_created;
use crate::modules::views::{classroom_views, course_views, courses_by_id};

fn normalize_email(raw: &str) -> Result<String, AppError> {
    Email::new(raw)
        .map(Email::into_inner)
        .map_err(AppError::unprocessable)
}

fn hash_optional(password: Option<String>) -> Result<Option<String>, AppError> {
    password.as_deref().map(hash_password).transpose()
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct UserService;

impl UserService {
    #[instrument(skip(store, dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(store: &dyn Store, dto: CreateUserDto) -> Result<User, AppError> {
        let email = normalize_email(&dto.email)?;
        let password_hash = hash_password(&dto.password)?;

        let user = store
            .insert_user(NewUser {
                name: dto.name.trim().to_string(),
                email,
                password_hash,
                role: dto.role,
            })
            .await?;

        track_user_created(user.role.as_str());
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(store))]
    pub async fn get_users(store: &dyn Store, role: Option<Role>) -> Result<Vec<User>, AppError> {
        Ok(store.list_users(role).await?)
    }

    #[instrument(skip(store))]
    pub async fn get_user(store: &dyn Store, id: UserId) -> Result<User, AppError> {
        store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Teachers come with the courses and classrooms they teach, students
    /// with their classrooms and those classrooms' courses.
    #[instrument(skip(store))]
    pub async fn get_user_detail(store: &dyn Store, id: UserId) -> Result<UserDetail, AppError> {
        let user = Self::get_user(store, id).await?;

        let detail = match user.role {
            Role::Admin => UserDetail {
                user,
                courses: None,
                classrooms: None,
            },
            Role::Teacher => {
                let courses = store.list_courses_by_teacher(id).await?;
                let classrooms = store.list_classrooms_by_teacher(id).await?;
                UserDetail {
                    user,
                    courses: Some(course_views(store, courses).await?),
                    classrooms: Some(classroom_views(store, classrooms, false).await?),
                }
            }
            Role::Student => {
                let classrooms = store.list_classrooms_by_student(id).await?;
                let courses = courses_by_id(store, classrooms.iter().filter_map(|c| c.course_id))
                    .await?
                    .into_values()
                    .collect();
                UserDetail {
                    user,
                    courses: Some(course_views(store, courses).await?),
                    classrooms: Some(classroom_views(store, classrooms, false).await?),
                }
            }
        };

        Ok(detail)
    }

    #[instrument(skip(roster, dto))]
    pub async fn update_user(
        roster: &RosterService,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let changes = UserChanges {
            name: trimmed(dto.name),
            email: dto.email.as_deref().map(normalize_email).transpose()?,
            password_hash: hash_optional(dto.password)?,
            role: dto.role,
        };
        Ok(roster.update_user(id, changes).await?)
    }

    /// Like [`Self::update_user`] without the role.
    #[instrument(skip(roster, dto))]
    pub async fn update_profile(
        roster: &RosterService,
        id: UserId,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        Self::update_user(
            roster,
            id,
            UpdateUserDto {
                name: dto.name,
                email: dto.email,
                password: dto.password,
                role: None,
            },
        )
        .await
    }

    #[instrument(skip(roster))]
    pub async fn delete_user(roster: &RosterService, id: UserId) -> Result<(), AppError> {
        roster.delete_user(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_db::{MemoryStore, NewClassroom, NewCourse};
    use std::sync::Arc;

    fn create_dto(name: &str, email: &str, role: Role) -> CreateUserDto {
        CreateUserDto {
            name: name.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_user_normalizes_and_hashes() {
        let store = MemoryStore::new();
        let dto = create_dto(" Ada ", " Ada@Example.COM ", Role::Teacher);
        let user = UserService::create_user(&store, dto).await.unwrap();

        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password, "password123");
        assert!(classhub_core::verify_password("password123", &user.password).unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        UserService::create_user(&store, create_dto("A", "a@example.com", Role::Student))
            .await
            .unwrap();
        let err = UserService::create_user(&store, create_dto("B", "A@example.com", Role::Student))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn test_student_detail_includes_classroom_courses() {
        let store = Arc::new(MemoryStore::new());
        let dto = create_dto("S", "s@example.com", Role::Student);
        let student = UserService::create_user(store.as_ref(), dto).await.unwrap();
        let course = store
            .insert_course(NewCourse {
                name: "Physics".to_string(),
                description: String::new(),
                teacher_id: None,
            })
            .await
            .unwrap();
        store
            .insert_classroom(NewClassroom {
                name: "P1".to_string(),
                course_id: Some(course.id),
                teacher_id: None,
                student_ids: vec![student.id],
            })
            .await
            .unwrap();

        let detail = UserService::get_user_detail(store.as_ref(), student.id).await.unwrap();
        assert_eq!(detail.classrooms.unwrap()[0].name, "P1");
        assert_eq!(detail.courses.unwrap()[0].name, "Physics");
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_email() {
        let store = Arc::new(MemoryStore::new());
        let roster = RosterService::new(store.clone());
        UserService::create_user(store.as_ref(), create_dto("A", "a@example.com", Role::Student))
            .await
            .unwrap();
        let dto = create_dto("B", "b@example.com", Role::Student);
        let b = UserService::create_user(store.as_ref(), dto).await.unwrap();

        let err = UserService::update_user(
            &roster,
            b.id,
            UpdateUserDto {
                email: Some("a@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let store = MemoryStore::new();
        let err = UserService::get_user(&store, UserId::new()).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }
}

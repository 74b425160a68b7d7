//! Roster-aware mutations.
//!
//! Every write that can affect roster exclusivity or needs a cascade goes
//! through [`RosterService`], which serialises them behind one async lock so
//! validate-then-write never interleaves within a process. Across processes
//! the store's own uniqueness check is the backstop.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

use classhub_db::{
    ClassroomChanges, ClassroomStore, CourseChanges, CourseStore, NewClassroom, NewCourse, Store,
    StoreError, UserChanges, UserStore,
};
use classhub_models::classrooms::{Classroom, CreateClassroomDto, UpdateClassroomDto};
use classhub_models::courses::{Course, CreateCourseDto, UpdateCourseDto};
use classhub_models::{ClassroomId, CourseId, User, UserId};

use crate::cascade::{CascadeRegistry, EntityEvent};
use crate::error::{RosterError, RosterResult};
use crate::validator::{RosterValidator, parse_id};

#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn Store>,
    lock: Arc<Mutex<()>>,
    cascades: Arc<CascadeRegistry>,
}

impl std::fmt::Debug for RosterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterService")
            .field("cascades", &self.cascades)
            .finish_non_exhaustive()
    }
}

fn track_conflict<T>(result: RosterResult<T>) -> RosterResult<T> {
    if let Err(RosterError::AlreadyAssigned(ids)) = &result {
        metrics::counter!("roster_conflicts_total").increment(ids.len() as u64);
    }
    result
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RosterService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_cascades(store, CascadeRegistry::with_defaults())
    }

    pub fn with_cascades(store: Arc<dyn Store>, cascades: CascadeRegistry) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
            cascades: Arc::new(cascades),
        }
    }

    fn validator(&self) -> RosterValidator<'_> {
        RosterValidator::new(self.store.as_ref())
    }

    async fn require_course(&self, raw: &str) -> RosterResult<CourseId> {
        let id = parse_id::<CourseId>(raw)?;
        self.store
            .find_course(id)
            .await?
            .map(|c| c.id)
            .ok_or(RosterError::CourseNotFound)
    }

    /// Course must exist, teacher (if any) must be a teacher, students pass the roster checks.
    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create_classroom(&self, dto: CreateClassroomDto) -> RosterResult<Classroom> {
        let _guard = self.lock.lock().await;
        let result: RosterResult<Classroom> = async {
            let course_id = self.require_course(&dto.course).await?;
            let teacher_id = match dto.teacher.as_deref() {
                Some(raw) => Some(self.validator().validate_teacher(raw).await?),
                None => None,
            };
            let student_ids = self.validator().validate_students(&dto.students, None).await?;
            let classroom = self
                .store
                .insert_classroom(NewClassroom {
                    name: dto.name.trim().to_string(),
                    course_id: Some(course_id),
                    teacher_id,
                    student_ids,
                })
                .await?;
            Ok(classroom)
        }
        .await;

        track_conflict(result)
    }

    #[instrument(skip(self, dto))]
    pub async fn update_classroom(
        &self,
        id: ClassroomId,
        dto: UpdateClassroomDto,
    ) -> RosterResult<Classroom> {
        let _guard = self.lock.lock().await;
        let result: RosterResult<Classroom> = async {
            let existing = self
                .store
                .find_classroom(id)
                .await?
                .ok_or(RosterError::ClassroomNotFound)?;

            let mut changes = ClassroomChanges {
                name: non_empty(dto.name),
                ..Default::default()
            };
            if let Some(raw) = dto.course.as_deref() {
                changes.course = Some(Some(self.require_course(raw).await?));
            }
            changes.teacher = match dto.teacher {
                None => None,
                Some(None) => Some(None),
                Some(Some(raw)) => Some(Some(self.validator().validate_teacher(&raw).await?)),
            };

            if changes.is_empty() && dto.students.is_none() {
                return Ok(existing);
            }
            if let Some(raw) = &dto.students {
                changes.students = Some(self.validator().validate_students(raw, Some(id)).await?);
            }
            self.store
                .update_classroom(id, changes)
                .await?
                .ok_or(RosterError::ClassroomNotFound)
        }
        .await;

        track_conflict(result)
    }

    /// Adds one student; a no-op when the classroom already holds them.
    #[instrument(skip(self))]
    pub async fn add_student(&self, id: ClassroomId, raw_student: &str) -> RosterResult<Classroom> {
        let student = parse_id::<UserId>(raw_student)?;

        let _guard = self.lock.lock().await;
        let result: RosterResult<Classroom> = async {
            let classroom = self
                .store
                .find_classroom(id)
                .await?
                .ok_or(RosterError::ClassroomNotFound)?;
            if classroom.has_student(student) {
                return Ok(classroom);
            }
            self.validator().check_students(&[student], Some(id)).await?;
            self.store
                .add_classroom_student(id, student)
                .await?
                .ok_or(RosterError::ClassroomNotFound)
        }
        .await;

        track_conflict(result)
    }

    /// Removes one student if present. Never fails for an absent student.
    #[instrument(skip(self))]
    pub async fn remove_student(
        &self,
        id: ClassroomId,
        raw_student: &str,
    ) -> RosterResult<Classroom> {
        let student = parse_id::<UserId>(raw_student)?;

        let _guard = self.lock.lock().await;
        self.store
            .remove_classroom_student(id, student)
            .await?
            .ok_or(RosterError::ClassroomNotFound)
    }

    #[instrument(skip(self))]
    pub async fn delete_classroom(&self, id: ClassroomId) -> RosterResult<()> {
        let _guard = self.lock.lock().await;
        if self.store.delete_classroom(id).await? {
            Ok(())
        } else {
            Err(RosterError::ClassroomNotFound)
        }
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create_course(&self, dto: CreateCourseDto) -> RosterResult<Course> {
        let _guard = self.lock.lock().await;
        let teacher_id = match non_empty(dto.teacher) {
            Some(raw) => Some(self.validator().validate_teacher(&raw).await?),
            None => None,
        };
        let course = self
            .store
            .insert_course(NewCourse {
                name: dto.name.trim().to_string(),
                description: dto.description.unwrap_or_default(),
                teacher_id,
            })
            .await?;
        Ok(course)
    }

    #[instrument(skip(self, dto))]
    pub async fn update_course(&self, id: CourseId, dto: UpdateCourseDto) -> RosterResult<Course> {
        let _guard = self.lock.lock().await;
        let teacher = match dto.teacher {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(self.validator().validate_teacher(&raw).await?)),
        };
        let changes = CourseChanges {
            name: non_empty(dto.name),
            description: dto.description,
            teacher,
        };
        self.store
            .update_course(id, changes)
            .await?
            .ok_or(RosterError::CourseNotFound)
    }

    /// Unlinks the course from its classrooms, then deletes it.
    #[instrument(skip(self))]
    pub async fn delete_course(&self, id: CourseId) -> RosterResult<()> {
        let _guard = self.lock.lock().await;
        if self.store.find_course(id).await?.is_none() {
            return Err(RosterError::CourseNotFound);
        }
        self.cascades
            .run(self.store.as_ref(), &EntityEvent::CourseDeleted { course: id })
            .await?;
        self.store.delete_course(id).await?;
        Ok(())
    }

    /// Applies user changes; a role change away from teacher or student runs
    /// the matching cascade first.
    ///
    /// The cascade and the user write are separate store calls. If the write
    /// fails after the cascade committed, the user keeps the old role with
    /// references already cleared. That state is accepted: cascades only
    /// clear references, so roster exclusivity still holds.
    #[instrument(skip(self, changes))]
    pub async fn update_user(&self, id: UserId, changes: UserChanges) -> RosterResult<User> {
        let _guard = self.lock.lock().await;
        let user = self
            .store
            .find_user(id)
            .await?
            .ok_or(RosterError::UserNotFound)?;

        if let Some(email) = &changes.email
            && let Some(other) = self.store.find_user_by_email(email).await?
            && other.id != id
        {
            return Err(StoreError::DuplicateEmail.into());
        }

        if let Some(role) = changes.role
            && role != user.role
        {
            tracing::info!(user_id = %id, from = %user.role, to = %role, "Changing user role");
            self.cascades
                .run(
                    self.store.as_ref(),
                    &EntityEvent::RoleChanged {
                        user: id,
                        from: user.role,
                        to: role,
                    },
                )
                .await?;
        }

        self.store
            .update_user(id, changes)
            .await?
            .ok_or(RosterError::UserNotFound)
    }

    /// Clears every reference to the user, then deletes them. A failed delete
    /// leaves the user in place with references cleared.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> RosterResult<()> {
        let _guard = self.lock.lock().await;
        let user = self
            .store
            .find_user(id)
            .await?
            .ok_or(RosterError::UserNotFound)?;

        self.cascades
            .run(
                self.store.as_ref(),
                &EntityEvent::UserDeleted {
                    user: id,
                    role: user.role,
                },
            )
            .await?;
        self.store.delete_user(id).await?;
        Ok(())
    }
}

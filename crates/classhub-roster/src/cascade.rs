//! Cascade hooks fired on entity events.
//!
//! Hooks run in registration order, inside the roster lock, before the
//! triggering write. They only ever clear references; nothing is deleted.

use async_trait::async_trait;
use std::sync::Arc;

use classhub_db::{ClassroomStore, CourseStore, Store, StoreError};
use classhub_models::{CourseId, Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEvent {
    UserDeleted { user: UserId, role: Role },
    RoleChanged { user: UserId, from: Role, to: Role },
    CourseDeleted { course: CourseId },
}

impl EntityEvent {
    /// The user leaving `role`, if this event removes one.
    pub fn vacated(&self, role: Role) -> Option<UserId> {
        match *self {
            EntityEvent::UserDeleted { user, role: held } if held == role => Some(user),
            EntityEvent::RoleChanged { user, from, to } if from == role && to != role => Some(user),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntityEvent::UserDeleted { .. } => "user_deleted",
            EntityEvent::RoleChanged { .. } => "role_changed",
            EntityEvent::CourseDeleted { .. } => "course_deleted",
        }
    }
}

#[async_trait]
pub trait CascadeHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies_to(&self, event: &EntityEvent) -> bool;

    /// Returns the number of records touched.
    async fn apply(&self, store: &dyn Store, event: &EntityEvent) -> Result<u64, StoreError>;
}

/// Clears course and classroom teacher references when a teacher is deleted or demoted.
pub struct ClearTeacherReferences;

#[async_trait]
impl CascadeHook for ClearTeacherReferences {
    fn name(&self) -> &'static str {
        "clear_teacher_references"
    }

    fn applies_to(&self, event: &EntityEvent) -> bool {
        event.vacated(Role::Teacher).is_some()
    }

    async fn apply(&self, store: &dyn Store, event: &EntityEvent) -> Result<u64, StoreError> {
        let Some(teacher) = event.vacated(Role::Teacher) else {
            return Ok(0);
        };
        let courses = store.clear_course_teacher(teacher).await?;
        let classrooms = store.clear_classroom_teacher(teacher).await?;
        Ok(courses + classrooms)
    }
}

/// Pulls a deleted or demoted student from every roster.
pub struct PullStudentFromRosters;

#[async_trait]
impl CascadeHook for PullStudentFromRosters {
    fn name(&self) -> &'static str {
        "pull_student_from_rosters"
    }

    fn applies_to(&self, event: &EntityEvent) -> bool {
        event.vacated(Role::Student).is_some()
    }

    async fn apply(&self, store: &dyn Store, event: &EntityEvent) -> Result<u64, StoreError> {
        match event.vacated(Role::Student) {
            Some(student) => store.pull_student_from_rosters(student).await,
            None => Ok(0),
        }
    }
}

/// Unlinks a deleted course from the classrooms running it.
pub struct UnlinkCourse;

#[async_trait]
impl CascadeHook for UnlinkCourse {
    fn name(&self) -> &'static str {
        "unlink_course"
    }

    fn applies_to(&self, event: &EntityEvent) -> bool {
        matches!(event, EntityEvent::CourseDeleted { .. })
    }

    async fn apply(&self, store: &dyn Store, event: &EntityEvent) -> Result<u64, StoreError> {
        match event {
            EntityEvent::CourseDeleted { course } => store.clear_classroom_course(*course).await,
            _ => Ok(0),
        }
    }
}

#[derive(Clone, Default)]
pub struct CascadeRegistry {
    hooks: Vec<Arc<dyn CascadeHook>>,
}

impl CascadeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three built-in hooks.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ClearTeacherReferences);
        registry.register(PullStudentFromRosters);
        registry.register(UnlinkCourse);
        registry
    }

    pub fn register(&mut self, hook: impl CascadeHook + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub async fn run(&self, store: &dyn Store, event: &EntityEvent) -> Result<(), StoreError> {
        for hook in self.hooks.iter().filter(|h| h.applies_to(event)) {
            let touched = hook.apply(store, event).await?;
            tracing::info!(
                hook = hook.name(),
                event = event.kind(),
                touched,
                "Cascade applied"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for CascadeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeRegistry")
            .field("hooks", &self.hook_names())
            .finish()
    }
}

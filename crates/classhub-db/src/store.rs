//! Entity store contract.
//!
//! One trait per entity, all async and object-safe so the application holds
//! an `Arc<dyn Store>` and can run against Postgres or the in-memory backend.
//! Each method is a single atomic operation on the backend; multi-step
//! consistency (roster exclusivity, cascades) lives in `classhub-roster`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use classhub_models::announcements::Announcement;
use classhub_models::assignments::Assignment;
use classhub_models::classrooms::Classroom;
use classhub_models::courses::Course;
use classhub_models::submissions::{StoredFile, Submission};
use classhub_models::{
    AnnouncementId, AssignmentId, ClassroomId, CourseId, Role, SubmissionId, User, UserId,
};

use crate::error::StoreResult;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub teacher_id: Option<UserId>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the teacher.
    pub teacher: Option<Option<UserId>>,
}

#[derive(Debug, Clone)]
pub struct NewClassroom {
    pub name: String,
    pub course_id: Option<CourseId>,
    pub teacher_id: Option<UserId>,
    pub student_ids: Vec<UserId>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassroomChanges {
    pub name: Option<String>,
    pub course: Option<Option<CourseId>>,
    pub teacher: Option<Option<UserId>>,
    /// Full replacement of the roster.
    pub students: Option<Vec<UserId>>,
}

impl ClassroomChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.course.is_none()
            && self.teacher.is_none()
            && self.students.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub file_url: Option<String>,
    pub classroom_id: ClassroomId,
    pub created_by: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: AssignmentId,
    pub student_id: UserId,
    pub submission_text: String,
    pub file: Option<StoredFile>,
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub message: String,
    pub classroom_id: ClassroomId,
    pub created_by: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementChanges {
    pub title: Option<String>,
    pub message: Option<String>,
}

/// Drops repeated ids, keeping first occurrences in order.
pub fn dedup_students(ids: Vec<UserId>) -> Vec<UserId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Users among `ids`; missing ids are simply absent from the result.
    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;
    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn insert_course(&self, course: NewCourse) -> StoreResult<Course>;
    async fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>>;
    async fn find_courses(&self, ids: &[CourseId]) -> StoreResult<Vec<Course>>;
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;
    async fn list_courses_by_teacher(&self, teacher: UserId) -> StoreResult<Vec<Course>>;
    async fn update_course(&self, id: CourseId, changes: CourseChanges)
    -> StoreResult<Option<Course>>;
    async fn delete_course(&self, id: CourseId) -> StoreResult<bool>;
    /// Unset `teacher` on every course referencing it; returns rows touched.
    async fn clear_course_teacher(&self, teacher: UserId) -> StoreResult<u64>;
}

#[async_trait]
pub trait ClassroomStore: Send + Sync {
    /// Fails with `StudentsAlreadyAssigned` if a student is on another roster.
    async fn insert_classroom(&self, classroom: NewClassroom) -> StoreResult<Classroom>;
    async fn find_classroom(&self, id: ClassroomId) -> StoreResult<Option<Classroom>>;
    async fn list_classrooms(&self) -> StoreResult<Vec<Classroom>>;
    async fn list_classrooms_by_teacher(&self, teacher: UserId) -> StoreResult<Vec<Classroom>>;
    async fn list_classrooms_by_student(&self, student: UserId) -> StoreResult<Vec<Classroom>>;
    async fn list_classrooms_by_course(&self, course: CourseId) -> StoreResult<Vec<Classroom>>;
    /// Classrooms other than `excluding` whose roster intersects `students`.
    async fn find_classrooms_holding(
        &self,
        students: &[UserId],
        excluding: Option<ClassroomId>,
    ) -> StoreResult<Vec<Classroom>>;
    /// Applies all changes atomically.
    async fn update_classroom(
        &self,
        id: ClassroomId,
        changes: ClassroomChanges,
    ) -> StoreResult<Option<Classroom>>;
    /// Appends a student; a no-op if already on this roster.
    async fn add_classroom_student(
        &self,
        id: ClassroomId,
        student: UserId,
    ) -> StoreResult<Option<Classroom>>;
    /// Removes a student if present.
    async fn remove_classroom_student(
        &self,
        id: ClassroomId,
        student: UserId,
    ) -> StoreResult<Option<Classroom>>;
    async fn delete_classroom(&self, id: ClassroomId) -> StoreResult<bool>;
    async fn clear_classroom_teacher(&self, teacher: UserId) -> StoreResult<u64>;
    async fn clear_classroom_course(&self, course: CourseId) -> StoreResult<u64>;
    /// Remove `student` from every roster.
    async fn pull_student_from_rosters(&self, student: UserId) -> StoreResult<u64>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment>;
    async fn find_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>>;
    async fn find_assignments(&self, ids: &[AssignmentId]) -> StoreResult<Vec<Assignment>>;
    async fn list_assignments(&self) -> StoreResult<Vec<Assignment>>;
    /// Sorted by due date, earliest first.
    async fn list_assignments_by_classroom(
        &self,
        classroom: ClassroomId,
    ) -> StoreResult<Vec<Assignment>>;
    async fn list_assignments_by_creator(&self, creator: UserId) -> StoreResult<Vec<Assignment>>;
    async fn update_assignment(
        &self,
        id: AssignmentId,
        changes: AssignmentChanges,
    ) -> StoreResult<Option<Assignment>>;
    async fn delete_assignment(&self, id: AssignmentId) -> StoreResult<bool>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Fails with `DuplicateSubmission` for a second (assignment, student) pair.
    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<Submission>;
    async fn find_submission(&self, id: SubmissionId) -> StoreResult<Option<Submission>>;
    /// Newest first.
    async fn list_submissions_by_assignment(
        &self,
        assignment: AssignmentId,
    ) -> StoreResult<Vec<Submission>>;
    /// Newest first.
    async fn list_submissions_by_student(&self, student: UserId) -> StoreResult<Vec<Submission>>;
    async fn list_submissions_for_assignments(
        &self,
        assignments: &[AssignmentId],
    ) -> StoreResult<Vec<Submission>>;
    /// Replaces the text, refreshes `submitted_at`, and swaps the file when one is given.
    async fn resubmit(
        &self,
        id: SubmissionId,
        submission_text: String,
        file: Option<StoredFile>,
    ) -> StoreResult<Option<Submission>>;
    async fn grade_submission(
        &self,
        id: SubmissionId,
        grade: String,
        feedback: String,
        graded_by: UserId,
    ) -> StoreResult<Option<Submission>>;
    async fn delete_submission(&self, id: SubmissionId) -> StoreResult<bool>;
}

#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn insert_announcement(&self, announcement: NewAnnouncement) -> StoreResult<Announcement>;
    async fn find_announcement(&self, id: AnnouncementId) -> StoreResult<Option<Announcement>>;
    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>>;
    async fn list_announcements_by_classroom(
        &self,
        classroom: ClassroomId,
    ) -> StoreResult<Vec<Announcement>>;
    async fn update_announcement(
        &self,
        id: AnnouncementId,
        changes: AnnouncementChanges,
    ) -> StoreResult<Option<Announcement>>;
    async fn delete_announcement(&self, id: AnnouncementId) -> StoreResult<bool>;
}

/// Every entity store in one object.
pub trait Store:
    UserStore + CourseStore + ClassroomStore + AssignmentStore + SubmissionStore + AnnouncementStore
{
}

impl<T> Store for T where
    T: UserStore
        + CourseStore
        + ClassroomStore
        + AssignmentStore
        + SubmissionStore
        + AnnouncementStore
{
}

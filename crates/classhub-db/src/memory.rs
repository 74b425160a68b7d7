//! Process-local store.
//!
//! Backs the test suites and `STORE_BACKEND=memory` runs. It enforces the same
//! uniqueness rules as the Postgres schema (email, one roster per student,
//! one submission per assignment and student), so behaviour stays identical
//! across backends.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;

use classhub_models::announcements::Announcement;
use classhub_models::assignments::Assignment;
use classhub_models::classrooms::Classroom;
use classhub_models::courses::Course;
use classhub_models::submissions::{StoredFile, Submission};
use classhub_models::{
    AnnouncementId, AssignmentId, ClassroomId, CourseId, Role, SubmissionId, User, UserId,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{
    AnnouncementChanges, AnnouncementStore, AssignmentChanges, AssignmentStore, ClassroomChanges,
    ClassroomStore, CourseChanges, CourseStore, NewAnnouncement, NewAssignment, NewClassroom,
    NewCourse, NewSubmission, NewUser, SubmissionStore, UserChanges, UserStore, dedup_students,
};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    courses: Vec<Course>,
    classrooms: Vec<Classroom>,
    assignments: Vec<Assignment>,
    submissions: Vec<Submission>,
    announcements: Vec<Announcement>,
}

impl Collections {
    /// Students in `candidates` already held by a classroom other than `target`.
    fn assigned_elsewhere(
        &self,
        candidates: &[UserId],
        target: Option<ClassroomId>,
    ) -> Vec<UserId> {
        let wanted: HashSet<&UserId> = candidates.iter().collect();
        let mut conflicting = Vec::new();
        for classroom in self.classrooms.iter().filter(|c| Some(c.id) != target) {
            for student in &classroom.student_ids {
                if wanted.contains(student) && !conflicting.contains(student) {
                    conflicting.push(*student);
                }
            }
        }
        conflicting
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        data.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        Ok(data
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        Ok(data
            .users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut data = self.inner.write().await;
        if let Some(email) = &changes.email
            && data.users.iter().any(|u| u.id != id && &u.email == email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        let Some(user) = data.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password = hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        let before = data.users.len();
        data.users.retain(|u| u.id != id);
        Ok(data.users.len() != before)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn insert_course(&self, course: NewCourse) -> StoreResult<Course> {
        let now = Utc::now();
        let course = Course {
            id: CourseId::new(),
            name: course.name,
            description: course.description,
            teacher_id: course.teacher_id,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.courses.push(course.clone());
        Ok(course)
    }

    async fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        let data = self.inner.read().await;
        Ok(data.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_courses(&self, ids: &[CourseId]) -> StoreResult<Vec<Course>> {
        let data = self.inner.read().await;
        Ok(data
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(self.inner.read().await.courses.clone())
    }

    async fn list_courses_by_teacher(&self, teacher: UserId) -> StoreResult<Vec<Course>> {
        let data = self.inner.read().await;
        Ok(data
            .courses
            .iter()
            .filter(|c| c.teacher_id == Some(teacher))
            .cloned()
            .collect())
    }

    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> StoreResult<Option<Course>> {
        let mut data = self.inner.write().await;
        let Some(course) = data.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            course.name = name;
        }
        if let Some(description) = changes.description {
            course.description = description;
        }
        if let Some(teacher) = changes.teacher {
            course.teacher_id = teacher;
        }
        course.updated_at = Utc::now();
        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, id: CourseId) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        let before = data.courses.len();
        data.courses.retain(|c| c.id != id);
        Ok(data.courses.len() != before)
    }

    async fn clear_course_teacher(&self, teacher: UserId) -> StoreResult<u64> {
        let mut data = self.inner.write().await;
        let mut touched = 0;
        for course in data.courses.iter_mut().filter(|c| c.teacher_id == Some(teacher)) {
            course.teacher_id = None;
            course.updated_at = Utc::now();
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl ClassroomStore for MemoryStore {
    async fn insert_classroom(&self, classroom: NewClassroom) -> StoreResult<Classroom> {
        let mut data = self.inner.write().await;
        let students = dedup_students(classroom.student_ids);
        let conflicting = data.assigned_elsewhere(&students, None);
        if !conflicting.is_empty() {
            return Err(StoreError::StudentsAlreadyAssigned(conflicting));
        }
        let now = Utc::now();
        let classroom = Classroom {
            id: ClassroomId::new(),
            name: classroom.name,
            course_id: classroom.course_id,
            teacher_id: classroom.teacher_id,
            student_ids: students,
            created_at: now,
            updated_at: now,
        };
        data.classrooms.push(classroom.clone());
        Ok(classroom)
    }

    async fn find_classroom(&self, id: ClassroomId) -> StoreResult<Option<Classroom>> {
        let data = self.inner.read().await;
        Ok(data.classrooms.iter().find(|c| c.id == id).cloned())
    }

    async fn list_classrooms(&self) -> StoreResult<Vec<Classroom>> {
        Ok(self.inner.read().await.classrooms.clone())
    }

    async fn list_classrooms_by_teacher(&self, teacher: UserId) -> StoreResult<Vec<Classroom>> {
        let data = self.inner.read().await;
        Ok(data
            .classrooms
            .iter()
            .filter(|c| c.teacher_id == Some(teacher))
            .cloned()
            .collect())
    }

    async fn list_classrooms_by_student(&self, student: UserId) -> StoreResult<Vec<Classroom>> {
        let data = self.inner.read().await;
        Ok(data
            .classrooms
            .iter()
            .filter(|c| c.has_student(student))
            .cloned()
            .collect())
    }

    async fn list_classrooms_by_course(&self, course: CourseId) -> StoreResult<Vec<Classroom>> {
        let data = self.inner.read().await;
        Ok(data
            .classrooms
            .iter()
            .filter(|c| c.course_id == Some(course))
            .cloned()
            .collect())
    }

    async fn find_classrooms_holding(
        &self,
        students: &[UserId],
        excluding: Option<ClassroomId>,
    ) -> StoreResult<Vec<Classroom>> {
        let data = self.inner.read().await;
        Ok(data
            .classrooms
            .iter()
            .filter(|c| Some(c.id) != excluding)
            .filter(|c| c.student_ids.iter().any(|s| students.contains(s)))
            .cloned()
            .collect())
    }

    async fn update_classroom(
        &self,
        id: ClassroomId,
        changes: ClassroomChanges,
    ) -> StoreResult<Option<Classroom>> {
        let mut data = self.inner.write().await;
        let students = changes.students.map(dedup_students);
        if let Some(students) = &students {
            let conflicting = data.assigned_elsewhere(students, Some(id));
            if !conflicting.is_empty() {
                return Err(StoreError::StudentsAlreadyAssigned(conflicting));
            }
        }
        let Some(classroom) = data.classrooms.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            classroom.name = name;
        }
        if let Some(course) = changes.course {
            classroom.course_id = course;
        }
        if let Some(teacher) = changes.teacher {
            classroom.teacher_id = teacher;
        }
        if let Some(students) = students {
            classroom.student_ids = students;
        }
        classroom.updated_at = Utc::now();
        Ok(Some(classroom.clone()))
    }

    async fn add_classroom_student(
        &self,
        id: ClassroomId,
        student: UserId,
    ) -> StoreResult<Option<Classroom>> {
        let mut data = self.inner.write().await;
        let conflicting = data.assigned_elsewhere(&[student], Some(id));
        let Some(classroom) = data.classrooms.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if !conflicting.is_empty() {
            return Err(StoreError::StudentsAlreadyAssigned(conflicting));
        }
        if !classroom.has_student(student) {
            classroom.student_ids.push(student);
            classroom.updated_at = Utc::now();
        }
        Ok(Some(classroom.clone()))
    }

    async fn remove_classroom_student(
        &self,
        id: ClassroomId,
        student: UserId,
    ) -> StoreResult<Option<Classroom>> {
        let mut data = self.inner.write().await;
        let Some(classroom) = data.classrooms.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if classroom.has_student(student) {
            classroom.student_ids.retain(|s| *s != student);
            classroom.updated_at = Utc::now();
        }
        Ok(Some(classroom.clone()))
    }

    async fn delete_classroom(&self, id: ClassroomId) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        let before = data.classrooms.len();
        data.classrooms.retain(|c| c.id != id);
        Ok(data.classrooms.len() != before)
    }

    async fn clear_classroom_teacher(&self, teacher: UserId) -> StoreResult<u64> {
        let mut data = self.inner.write().await;
        let mut touched = 0;
        for classroom in data.classrooms.iter_mut().filter(|c| c.teacher_id == Some(teacher)) {
            classroom.teacher_id = None;
            classroom.updated_at = Utc::now();
            touched += 1;
        }
        Ok(touched)
    }

    async fn clear_classroom_course(&self, course: CourseId) -> StoreResult<u64> {
        let mut data = self.inner.write().await;
        let mut touched = 0;
        for classroom in data.classrooms.iter_mut().filter(|c| c.course_id == Some(course)) {
            classroom.course_id = None;
            classroom.updated_at = Utc::now();
            touched += 1;
        }
        Ok(touched)
    }

    async fn pull_student_from_rosters(&self, student: UserId) -> StoreResult<u64> {
        let mut data = self.inner.write().await;
        let mut touched = 0;
        for classroom in data.classrooms.iter_mut().filter(|c| c.has_student(student)) {
            classroom.student_ids.retain(|s| *s != student);
            classroom.updated_at = Utc::now();
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment> {
        let now = Utc::now();
        let assignment = Assignment {
            id: AssignmentId::new(),
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            file_url: assignment.file_url,
            classroom_id: assignment.classroom_id,
            created_by: assignment.created_by,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn find_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        let data = self.inner.read().await;
        Ok(data.assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_assignments(&self, ids: &[AssignmentId]) -> StoreResult<Vec<Assignment>> {
        let data = self.inner.read().await;
        Ok(data
            .assignments
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn list_assignments(&self) -> StoreResult<Vec<Assignment>> {
        Ok(self.inner.read().await.assignments.clone())
    }

    async fn list_assignments_by_classroom(
        &self,
        classroom: ClassroomId,
    ) -> StoreResult<Vec<Assignment>> {
        let data = self.inner.read().await;
        let mut assignments: Vec<Assignment> = data
            .assignments
            .iter()
            .filter(|a| a.classroom_id == classroom)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| a.due_date);
        Ok(assignments)
    }

    async fn list_assignments_by_creator(&self, creator: UserId) -> StoreResult<Vec<Assignment>> {
        let data = self.inner.read().await;
        Ok(data
            .assignments
            .iter()
            .filter(|a| a.created_by == creator)
            .cloned()
            .collect())
    }

    async fn update_assignment(
        &self,
        id: AssignmentId,
        changes: AssignmentChanges,
    ) -> StoreResult<Option<Assignment>> {
        let mut data = self.inner.write().await;
        let Some(assignment) = data.assignments.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            assignment.title = title;
        }
        if let Some(description) = changes.description {
            assignment.description = Some(description);
        }
        if let Some(due_date) = changes.due_date {
            assignment.due_date = due_date;
        }
        if let Some(file_url) = changes.file_url {
            assignment.file_url = Some(file_url);
        }
        assignment.updated_at = Utc::now();
        Ok(Some(assignment.clone()))
    }

    async fn delete_assignment(&self, id: AssignmentId) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        let before = data.assignments.len();
        data.assignments.retain(|a| a.id != id);
        Ok(data.assignments.len() != before)
    }
}

fn newest_first(mut submissions: Vec<Submission>) -> Vec<Submission> {
    submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    submissions
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<Submission> {
        let mut data = self.inner.write().await;
        if data.submissions.iter().any(|s| {
            s.assignment_id == submission.assignment_id && s.student_id == submission.student_id
        }) {
            return Err(StoreError::DuplicateSubmission);
        }
        let now = Utc::now();
        let file = submission.file;
        let submission = Submission {
            id: SubmissionId::new(),
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            submission_text: submission.submission_text,
            submission_file: file.as_ref().map(|f| f.key.clone()),
            original_file_name: file.as_ref().map(|f| f.original_name.clone()),
            file_size: file.as_ref().map(|f| f.size),
            submitted_at: now,
            grade: None,
            feedback: String::new(),
            graded_at: None,
            graded_by: None,
            created_at: now,
            updated_at: now,
        };
        data.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn find_submission(&self, id: SubmissionId) -> StoreResult<Option<Submission>> {
        let data = self.inner.read().await;
        Ok(data.submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_submissions_by_assignment(
        &self,
        assignment: AssignmentId,
    ) -> StoreResult<Vec<Submission>> {
        let data = self.inner.read().await;
        Ok(newest_first(
            data.submissions
                .iter()
                .filter(|s| s.assignment_id == assignment)
                .cloned()
                .collect(),
        ))
    }

    async fn list_submissions_by_student(&self, student: UserId) -> StoreResult<Vec<Submission>> {
        let data = self.inner.read().await;
        Ok(newest_first(
            data.submissions
                .iter()
                .filter(|s| s.student_id == student)
                .cloned()
                .collect(),
        ))
    }

    async fn list_submissions_for_assignments(
        &self,
        assignments: &[AssignmentId],
    ) -> StoreResult<Vec<Submission>> {
        let data = self.inner.read().await;
        Ok(data
            .submissions
            .iter()
            .filter(|s| assignments.contains(&s.assignment_id))
            .cloned()
            .collect())
    }

    async fn resubmit(
        &self,
        id: SubmissionId,
        submission_text: String,
        file: Option<StoredFile>,
    ) -> StoreResult<Option<Submission>> {
        let mut data = self.inner.write().await;
        let Some(submission) = data.submissions.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        let now = Utc::now();
        submission.submission_text = submission_text;
        submission.submitted_at = now;
        if let Some(file) = file {
            submission.submission_file = Some(file.key);
            submission.original_file_name = Some(file.original_name);
            submission.file_size = Some(file.size);
        }
        submission.updated_at = now;
        Ok(Some(submission.clone()))
    }

    async fn grade_submission(
        &self,
        id: SubmissionId,
        grade: String,
        feedback: String,
        graded_by: UserId,
    ) -> StoreResult<Option<Submission>> {
        let mut data = self.inner.write().await;
        let Some(submission) = data.submissions.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        let now = Utc::now();
        submission.grade = Some(grade);
        submission.feedback = feedback;
        submission.graded_at = Some(now);
        submission.graded_by = Some(graded_by);
        submission.updated_at = now;
        Ok(Some(submission.clone()))
    }

    async fn delete_submission(&self, id: SubmissionId) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        let before = data.submissions.len();
        data.submissions.retain(|s| s.id != id);
        Ok(data.submissions.len() != before)
    }
}

#[async_trait]
impl AnnouncementStore for MemoryStore {
    async fn insert_announcement(
        &self,
        announcement: NewAnnouncement,
    ) -> StoreResult<Announcement> {
        let now = Utc::now();
        let announcement = Announcement {
            id: AnnouncementId::new(),
            title: announcement.title,
            message: announcement.message,
            classroom_id: announcement.classroom_id,
            created_by: announcement.created_by,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.announcements.push(announcement.clone());
        Ok(announcement)
    }

    async fn find_announcement(&self, id: AnnouncementId) -> StoreResult<Option<Announcement>> {
        let data = self.inner.read().await;
        Ok(data.announcements.iter().find(|a| a.id == id).cloned())
    }

    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>> {
        Ok(self.inner.read().await.announcements.clone())
    }

    async fn list_announcements_by_classroom(
        &self,
        classroom: ClassroomId,
    ) -> StoreResult<Vec<Announcement>> {
        let data = self.inner.read().await;
        Ok(data
            .announcements
            .iter()
            .filter(|a| a.classroom_id == classroom)
            .cloned()
            .collect())
    }

    async fn update_announcement(
        &self,
        id: AnnouncementId,
        changes: AnnouncementChanges,
    ) -> StoreResult<Option<Announcement>> {
        let mut data = self.inner.write().await;
        let Some(announcement) = data.announcements.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            announcement.title = title;
        }
        if let Some(message) = changes.message {
            announcement.message = message;
        }
        announcement.updated_at = Utc::now();
        Ok(Some(announcement.clone()))
    }

    async fn delete_announcement(&self, id: AnnouncementId) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        let before = data.announcements.len();
        data.announcements.retain(|a| a.id != id);
        Ok(data.announcements.len() != before)
    }
}

use chrono::{DateTime, Utc};
use classhub_core::serde::{deserialize_clearable, deserialize_optional_non_empty};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::courses::CourseRef;
use crate::ids::{ClassroomId, CourseId, UserId};
use crate::users::UserRef;

/// A classroom as stored: references only.
///
/// `student_ids` keeps insertion order. A student id appears in at most one
/// classroom's `student_ids` at any time.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub course_id: Option<CourseId>,
    pub teacher_id: Option<UserId>,
    pub student_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Classroom {
    pub fn has_student(&self, student: UserId) -> bool {
        self.student_ids.contains(&student)
    }
}

/// Classroom with course, teacher and students populated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassroomView {
    pub id: ClassroomId,
    pub name: String,
    pub course: Option<CourseRef>,
    pub teacher: Option<UserRef>,
    pub students: Vec<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassroomDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Course id (required)
    pub course: String,
    /// Teacher user id
    #[serde(default, deserialize_with = "deserialize_optional_non_empty")]
    pub teacher: Option<String>,
    /// Student user ids
    #[serde(default)]
    pub students: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassroomDto {
    pub name: Option<String>,
    /// Replaces the course when non-empty.
    #[serde(default, deserialize_with = "deserialize_optional_non_empty")]
    pub course: Option<String>,
    /// Teacher user id; `null` or `""` unassigns the teacher.
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[schema(value_type = Option<String>)]
    pub teacher: Option<Option<String>>,
    /// Full replacement of the roster.
    pub students: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RosterStudentDto {
    #[validate(length(min = 1, message = "student_id is required"))]
    pub student_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassroomEnvelope {
    pub classroom: ClassroomView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassroomsEnvelope {
    pub classrooms: Vec<ClassroomView>,
}

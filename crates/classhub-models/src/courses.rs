use chrono::{DateTime, Utc};
use classhub_core::serde::deserialize_clearable;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::classrooms::ClassroomView;
use crate::ids::{CourseId, UserId};
use crate::users::UserRef;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub description: String,
    pub teacher_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course reference embedded in classroom views.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseRef {
    pub id: CourseId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CourseRef {
    pub fn brief(course: &Course) -> Self {
        Self {
            id: course.id,
            name: course.name.clone(),
            description: None,
        }
    }

    pub fn detailed(course: &Course) -> Self {
        Self {
            description: Some(course.description.clone()),
            ..Self::brief(course)
        }
    }
}

/// A course with its teacher populated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseView {
    pub id: CourseId,
    pub name: String,
    pub description: String,
    pub teacher: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseView {
    pub fn new(course: Course, teacher: Option<UserRef>) -> Self {
        Self {
            id: course.id,
            name: course.name,
            description: course.description,
            teacher,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Teacher user id
    pub teacher: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    /// Teacher user id; `null` or `""` unassigns the teacher.
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[schema(value_type = Option<String>)]
    pub teacher: Option<Option<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseEnvelope {
    pub course: CourseView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoursesEnvelope {
    pub courses: Vec<CourseView>,
}

/// A course together with the classrooms that run it.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    pub course: CourseView,
    pub classrooms: Vec<ClassroomView>,
}

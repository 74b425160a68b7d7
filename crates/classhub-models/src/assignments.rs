use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AssignmentId, ClassroomId, UserId};
use crate::users::UserRef;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: AssignmentId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub file_url: Option<String>,
    pub classroom_id: ClassroomId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassroomRef {
    pub id: ClassroomId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

/// Assignment with its classroom and author populated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub classroom: Option<ClassroomRef>,
    pub creator: Option<UserRef>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssignmentDto {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub file_url: Option<String>,
    pub classroom_id: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAssignmentDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub file_url: Option<String>,
}

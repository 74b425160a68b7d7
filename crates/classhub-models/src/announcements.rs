use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AnnouncementId, ClassroomId, UserId};
use crate::users::UserRef;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub message: String,
    pub classroom_id: ClassroomId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnnouncementView {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub creator: Option<UserRef>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementDto {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    pub classroom_id: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: Option<String>,
}

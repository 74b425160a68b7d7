//! # Classhub Models
//!
//! Entities, request DTOs and populated response views shared by the store,
//! the roster service and the HTTP layer.
//!
//! - [`ids`]: strongly-typed UUID ids per entity
//! - [`users`]: users, roles and the role → capability mapping
//! - [`courses`], [`classrooms`], [`assignments`], [`submissions`], [`announcements`]
//! - [`admin`]: the admin summary report
//! - [`auth`]: login request/response
//! - [`value_types`]: validated primitives such as [`Email`]

pub mod admin;
pub mod announcements;
pub mod assignments;
pub mod auth;
pub mod classrooms;
pub mod courses;
pub mod ids;
pub mod submissions;
pub mod users;
pub mod value_types;

pub use ids::{AnnouncementId, AssignmentId, ClassroomId, CourseId, SubmissionId, UserId};
pub use users::{Role, User, UserRef};
pub use value_types::Email;

use serde::Serialize;
use utoipa::ToSchema;

/// Generic acknowledgement body for deletes and other side-effect-only calls.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(message: impl Into<String>, id: impl ToString) -> Self {
        Self {
            message: message.into(),
            id: Some(id.to_string()),
        }
    }
}

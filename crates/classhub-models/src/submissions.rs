use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::assignments::ClassroomRef;
use crate::ids::{AssignmentId, SubmissionId, UserId};
use crate::users::UserRef;

/// One student's work for one assignment; unique per (assignment, student).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Submission {
    pub id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub student_id: UserId,
    pub submission_text: String,
    /// Storage reference of the uploaded file
    pub submission_file: Option<String>,
    pub original_file_name: Option<String>,
    pub file_size: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<String>,
    pub feedback: String,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored upload attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub original_name: String,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentRef {
    pub id: AssignmentId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<ClassroomRef>,
}

/// Submission with student, assignment and a public file URL populated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionView {
    #[serde(flatten)]
    pub submission: Submission,
    pub file_url: Option<String>,
    pub student: Option<UserRef>,
    pub assignment: Option<AssignmentRef>,
}

/// Multipart form accepted when creating or resubmitting.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SubmissionUploadForm {
    /// Assignment id (create only)
    pub assignment: Option<String>,
    /// Student id (create only; defaults to the caller)
    pub student: Option<String>,
    pub submission_text: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GradeSubmissionDto {
    #[validate(length(min = 1, message = "grade is required"))]
    pub grade: String,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubmissionStats {
    pub total: usize,
    pub graded: usize,
    pub pending: usize,
}

impl SubmissionStats {
    pub fn tally(submissions: &[Submission]) -> Self {
        let graded = submissions.iter().filter(|s| s.grade.is_some()).count();
        Self {
            total: submissions.len(),
            graded,
            pending: submissions.len() - graded,
        }
    }
}

use anyhow::anyhow;
use tracing::instrument;

use classhub_core::{AppError, FileStorage, StorageError};
use classhub_db::{AssignmentStore, NewSubmission, Store, SubmissionStore, UserStore};
use classhub_models::submissions::{
    AssignmentRef, StoredFile, Submission, SubmissionStats, SubmissionView,
};
use classhub_models::{AssignmentId, Role, SubmissionId, UserId, UserRef};

use crate::metrics::{track_submission, track_submission_graded};
use crate::modules::submissions::model::{FileUpload, SubmissionFileValidator};
use crate::modules::views::{classroom_refs, users_by_id};
use crate::state::AppState;

pub struct SubmissionService;

impl SubmissionService {
    async fn store_file(state: &AppState, upload: FileUpload) -> Result<StoredFile, AppError> {
        let extension = SubmissionFileValidator::validate(&upload, state.upload_config.max_bytes)?;
        let key = SubmissionFileValidator::storage_key(&extension);
        let key = state.uploads.save(&key, &upload.bytes).await?;

        Ok(StoredFile {
            key,
            original_name: upload.file_name,
            size: upload.bytes.len() as i64,
        })
    }

    /// Best effort: a file that is already gone is not an error.
    async fn discard_file(uploads: &dyn FileStorage, key: &str) {
        match uploads.delete(key).await {
            Ok(()) | Err(StorageError::NotFound) => {}
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to delete stored upload"),
        }
    }

    async fn views(
        state: &AppState,
        submissions: Vec<Submission>,
        with_classroom: bool,
    ) -> Result<Vec<SubmissionView>, AppError> {
        let store = state.store.as_ref();
        let students = users_by_id(store, submissions.iter().map(|s| s.student_id)).await?;

        let mut assignment_ids: Vec<AssignmentId> =
            submissions.iter().map(|s| s.assignment_id).collect();
        assignment_ids.sort();
        assignment_ids.dedup();
        let assignments = store.find_assignments(&assignment_ids).await?;
        let classrooms = if with_classroom {
            classroom_refs(store, assignments.iter().map(|a| a.classroom_id)).await?
        } else {
            Default::default()
        };

        Ok(submissions
            .into_iter()
            .map(|submission| {
                let assignment = assignments
                    .iter()
                    .find(|a| a.id == submission.assignment_id)
                    .map(|a| AssignmentRef {
                        id: a.id,
                        title: a.title.clone(),
                        description: a.description.clone(),
                        due_date: a.due_date,
                        classroom: classrooms.get(&a.classroom_id).cloned(),
                    });
                SubmissionView {
                    file_url: submission
                        .submission_file
                        .as_deref()
                        .and_then(|key| state.uploads.get_url(key).ok()),
                    student: students.get(&submission.student_id).map(UserRef::from),
                    assignment,
                    submission,
                }
            })
            .collect())
    }

    async fn view(state: &AppState, submission: Submission) -> Result<SubmissionView, AppError> {
        Self::views(state, vec![submission], false)
            .await?
            .pop()
            .ok_or_else(|| AppError::internal_error("Submission view missing"))
    }

    #[instrument(skip(store))]
    pub async fn get_submission(
        store: &dyn Store,
        id: SubmissionId,
    ) -> Result<Submission, AppError> {
        store
            .find_submission(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Submission not found")))
    }

    /// Records a first submission. A stored file is removed again if the
    /// submission cannot be recorded.
    #[instrument(skip(state, text, file), fields(with_file = file.is_some()))]
    pub async fn create_submission(
        state: &AppState,
        assignment: AssignmentId,
        student: UserId,
        text: String,
        file: Option<FileUpload>,
    ) -> Result<SubmissionView, AppError> {
        let store = state.store.as_ref();

        if store.find_assignment(assignment).await?.is_none() {
            return Err(AppError::not_found(anyhow!("Assignment not found")));
        }
        let student_user = store
            .find_user(student)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;
        if student_user.role != Role::Student {
            return Err(
                AppError::bad_request(anyhow!("Only students can submit assignments"))
                    .with_ids([student]),
            );
        }
        if store
            .list_submissions_by_student(student)
            .await?
            .iter()
            .any(|s| s.assignment_id == assignment)
        {
            return Err(classhub_db::StoreError::DuplicateSubmission.into());
        }

        let file_bytes = file.as_ref().map(|f| f.bytes.len());
        let stored = match file {
            Some(upload) => Some(Self::store_file(state, upload).await?),
            None => None,
        };

        let inserted = store
            .insert_submission(NewSubmission {
                assignment_id: assignment,
                student_id: student,
                submission_text: text,
                file: stored.clone(),
            })
            .await;

        let submission = match inserted {
            Ok(submission) => submission,
            Err(e) => {
                if let Some(file) = &stored {
                    Self::discard_file(state.uploads.as_ref(), &file.key).await;
                }
                return Err(e.into());
            }
        };

        track_submission(false, file_bytes);
        tracing::info!(submission_id = %submission.id, "Submission recorded");
        Self::view(state, submission).await
    }

    /// Replaces the text and refreshes the submission time. A new file
    /// replaces the previous one, which is then deleted.
    #[instrument(skip(state, existing, text, file), fields(submission_id = %existing.id))]
    pub async fn resubmit(
        state: &AppState,
        existing: Submission,
        text: String,
        file: Option<FileUpload>,
    ) -> Result<SubmissionView, AppError> {
        let file_bytes = file.as_ref().map(|f| f.bytes.len());
        let stored = match file {
            Some(upload) => Some(Self::store_file(state, upload).await?),
            None => None,
        };

        let updated = match state.store.resubmit(existing.id, text, stored.clone()).await {
            Ok(Some(submission)) => Ok(submission),
            Ok(None) => Err(AppError::not_found(anyhow!("Submission not found"))),
            Err(e) => Err(AppError::from(e)),
        };
        let updated = match updated {
            Ok(submission) => submission,
            Err(err) => {
                if let Some(file) = &stored {
                    Self::discard_file(state.uploads.as_ref(), &file.key).await;
                }
                return Err(err);
            }
        };

        if stored.is_some()
            && let Some(old_key) = existing.submission_file.as_deref()
        {
            Self::discard_file(state.uploads.as_ref(), old_key).await;
        }

        track_submission(true, file_bytes);
        Self::view(state, updated).await
    }

    #[instrument(skip(state, feedback))]
    pub async fn grade_submission(
        state: &AppState,
        id: SubmissionId,
        grade: String,
        feedback: Option<String>,
        graded_by: UserId,
    ) -> Result<SubmissionView, AppError> {
        let submission = state
            .store
            .grade_submission(id, grade, feedback.unwrap_or_default(), graded_by)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Submission not found")))?;

        track_submission_graded();
        Self::view(state, submission).await
    }

    #[instrument(skip(state))]
    pub async fn delete_submission(state: &AppState, id: SubmissionId) -> Result<(), AppError> {
        let submission = Self::get_submission(state.store.as_ref(), id).await?;
        if !state.store.delete_submission(id).await? {
            return Err(AppError::not_found(anyhow!("Submission not found")));
        }
        if let Some(key) = submission.submission_file.as_deref() {
            Self::discard_file(state.uploads.as_ref(), key).await;
        }
        Ok(())
    }

    /// Newest first.
    #[instrument(skip(state))]
    pub async fn get_assignment_submissions(
        state: &AppState,
        assignment: AssignmentId,
    ) -> Result<Vec<SubmissionView>, AppError> {
        let submissions = state.store.list_submissions_by_assignment(assignment).await?;
        Self::views(state, submissions, false).await
    }

    /// Newest first, with each assignment's classroom and course names.
    #[instrument(skip(state))]
    pub async fn get_student_submissions(
        state: &AppState,
        student: UserId,
    ) -> Result<Vec<SubmissionView>, AppError> {
        let submissions = state.store.list_submissions_by_student(student).await?;
        Self::views(state, submissions, true).await
    }

    /// Totals over every assignment the teacher created.
    #[instrument(skip(store))]
    pub async fn get_stats(
        store: &dyn Store,
        teacher: UserId,
    ) -> Result<SubmissionStats, AppError> {
        let assignments: Vec<AssignmentId> = store
            .list_assignments_by_creator(teacher)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        if assignments.is_empty() {
            return Ok(SubmissionStats::tally(&[]));
        }
        let submissions = store.list_submissions_for_assignments(&assignments).await?;
        Ok(SubmissionStats::tally(&submissions))
    }
}

use classhub_core::AppError;
use classhub_models::UserId;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Assignment already submitted. Use update instead.")]
    DuplicateSubmission,

    /// A roster write would place students in a second classroom.
    #[error("Students already belong to another classroom")]
    StudentsAlreadyAssigned(Vec<UserId>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail | StoreError::DuplicateSubmission => AppError::conflict(err),
            StoreError::StudentsAlreadyAssigned(ref ids) => {
                let ids = ids.clone();
                AppError::conflict(err).with_ids(ids)
            }
            StoreError::Database(e) => {
                tracing::error!(error = %e, "Entity store failure");
                AppError::database(anyhow::anyhow!("Internal server error"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_map_to_409_with_ids() {
        let id = UserId::new();
        let err = AppError::from(StoreError::StudentsAlreadyAssigned(vec![id]));
        assert_eq!(err.status.as_u16(), 409);
        assert_eq!(err.ids, vec![id.to_string()]);

        let err = AppError::from(StoreError::DuplicateEmail);
        assert_eq!(err.status.as_u16(), 409);
    }

    #[test]
    fn test_database_errors_are_opaque() {
        let err = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status.as_u16(), 500);
        assert_eq!(err.error.to_string(), "Internal server error");
    }
}

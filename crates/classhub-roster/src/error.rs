use classhub_core::AppError;
use classhub_db::StoreError;
use classhub_models::UserId;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Every id that did not resolve to a user.
    #[error("Students not found")]
    StudentsNotFound(Vec<String>),

    #[error("Only users with role student can be enrolled")]
    NotStudents(Vec<UserId>),

    #[error("Students already belong to another classroom")]
    AlreadyAssigned(Vec<UserId>),

    #[error("Assigned teacher must be a user with role teacher")]
    NotTeacher(String),

    #[error("Classroom not found")]
    ClassroomNotFound,

    #[error("Course not found")]
    CourseNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RosterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StudentsAlreadyAssigned(ids) => RosterError::AlreadyAssigned(ids),
            other => RosterError::Store(other),
        }
    }
}

impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::InvalidId(ref id) => {
                let id = id.clone();
                AppError::bad_request(err).with_ids([id])
            }
            RosterError::StudentsNotFound(ref ids) => {
                let ids = ids.clone();
                AppError::not_found(err).with_ids(ids)
            }
            RosterError::NotStudents(ref ids) => {
                let ids = ids.clone();
                AppError::bad_request(err).with_ids(ids)
            }
            RosterError::AlreadyAssigned(ref ids) => {
                let ids = ids.clone();
                AppError::conflict(err).with_ids(ids)
            }
            RosterError::NotTeacher(ref id) => {
                let id = id.clone();
                AppError::bad_request(err).with_ids([id])
            }
            RosterError::ClassroomNotFound
            | RosterError::CourseNotFound
            | RosterError::UserNotFound => AppError::not_found(err),
            RosterError::Store(e) => e.into(),
        }
    }
}

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{FileUpload, SubmissionFileValidator, SubmissionForm};
pub use router::init_submissions_router;
pub use service::SubmissionService;

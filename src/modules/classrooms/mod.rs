pub mod controller;
pub mod router;
pub mod service;

pub use router::init_classrooms_router;
pub use service::ClassroomService;

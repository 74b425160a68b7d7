pub mod admin;
pub mod announcements;
pub mod assignments;
pub mod auth;
pub mod classrooms;
pub mod courses;
pub mod submissions;
pub mod users;
pub mod views;

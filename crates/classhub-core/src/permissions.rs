//! Capability names carried in access tokens.
//!
//! Roles map to a fixed set of these (see `classhub_models::users::Role`);
//! handlers only ever check capabilities, never roles.

// =============================================================================
// Users
// =============================================================================

pub const USERS_CREATE: &str = "users:create";
pub const USERS_READ: &str = "users:read";
pub const USERS_UPDATE: &str = "users:update";
pub const USERS_DELETE: &str = "users:delete";

// =============================================================================
// Courses & classrooms
// =============================================================================

pub const COURSES_READ: &str = "courses:read";
pub const COURSES_WRITE: &str = "courses:write";

pub const CLASSROOMS_READ: &str = "classrooms:read";
pub const CLASSROOMS_WRITE: &str = "classrooms:write";
/// Add or remove students on an existing roster.
pub const CLASSROOMS_MANAGE_ROSTER: &str = "classrooms:manage_roster";

// =============================================================================
// Coursework
// =============================================================================

pub const ASSIGNMENTS_READ: &str = "assignments:read";
pub const ASSIGNMENTS_WRITE: &str = "assignments:write";

pub const ANNOUNCEMENTS_READ: &str = "announcements:read";
pub const ANNOUNCEMENTS_WRITE: &str = "announcements:write";

pub const SUBMISSIONS_READ: &str = "submissions:read";
pub const SUBMISSIONS_SUBMIT: &str = "submissions:submit";
pub const SUBMISSIONS_GRADE: &str = "submissions:grade";
pub const SUBMISSIONS_DELETE: &str = "submissions:delete";

// =============================================================================
// Admin
// =============================================================================

pub const ADMIN_SUMMARY: &str = "admin:summary";

pub const ALL: &[&str] = &[
    USERS_CREATE,
    USERS_READ,
    USERS_UPDATE,
    USERS_DELETE,
    COURSES_READ,
    COURSES_WRITE,
    CLASSROOMS_READ,
    CLASSROOMS_WRITE,
    CLASSROOMS_MANAGE_ROSTER,
    ASSIGNMENTS_READ,
    ASSIGNMENTS_WRITE,
    ANNOUNCEMENTS_READ,
    ANNOUNCEMENTS_WRITE,
    SUBMISSIONS_READ,
    SUBMISSIONS_SUBMIT,
    SUBMISSIONS_GRADE,
    SUBMISSIONS_DELETE,
    ADMIN_SUMMARY,
];

//! Request extractors for authentication and capability checks.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the token and exposes its claims
//! 3. `Require*` extractors additionally demand one capability (403 otherwise)
//!
//! ```ignore
//! use crate::middleware::auth::RequireClassroomsWrite;
//!
//! async fn create_classroom(
//!     RequireClassroomsWrite(auth_user): RequireClassroomsWrite,
//! ) -> impl IntoResponse {
//!     // only reached with the "classrooms:write" capability
//! }
//! ```

pub mod auth;

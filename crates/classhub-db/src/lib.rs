//! # Classhub DB
//!
//! Entity store traits plus the two backends behind them.
//!
//! - [`store`]: one async trait per entity, combined into [`Store`]
//! - [`postgres`]: [`PgStore`], the production backend
//! - [`memory`]: [`MemoryStore`], a process-local backend for tests and demos
//!
//! ```ignore
//! use classhub_db::{init_db_pool, PgStore};
//!
//! let pool = init_db_pool().await?;
//! let store = PgStore::new(pool);
//! store.migrate().await?;
//! ```

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

use std::env;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use sqlx::PgPool;
pub use store::{
    AnnouncementChanges, AnnouncementStore, AssignmentChanges, AssignmentStore, ClassroomChanges,
    ClassroomStore, CourseChanges, CourseStore, NewAnnouncement, NewAssignment, NewClassroom,
    NewCourse, NewSubmission, NewUser, Store, SubmissionStore, UserChanges, UserStore,
    dedup_students,
};

/// Connects to the database named by `DATABASE_URL`.
pub async fn init_db_pool() -> Result<PgPool, sqlx::Error> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
}

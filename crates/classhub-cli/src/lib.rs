//! # Classhub CLI
//!
//! Administrative tooling: creating admin accounts and seeding demo data.
//!
//! The seeder talks to the entity store traits, so it runs the same way
//! against Postgres and the in-memory backend.
//!
//! ```ignore
//! use classhub_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&store, &roster, SeedConfig::default()).await?;
//! ```

pub mod admin;
pub mod seeder;

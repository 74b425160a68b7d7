//! # Classhub Core
//!
//! Core types, errors, and utilities for the Classhub API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`file_storage`]: Upload storage abstraction and the local filesystem backend
//! - [`password`]: bcrypt password hashing and verification
//! - [`permissions`]: Capability names carried in access tokens
//! - [`serde`]: Custom serde helpers for tri-state request fields
//!
//! # Example
//!
//! ```ignore
//! use classhub_core::errors::AppError;
//! use classhub_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Classroom not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod file_storage;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::{AppError, ErrorResponse};
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use password::{hash_password, verify_password};

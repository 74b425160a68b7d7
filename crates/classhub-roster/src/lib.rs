//! # Classhub Roster
//!
//! Keeps every student on at most one classroom roster.
//!
//! - [`validator`]: the fail-fast roster checks
//! - [`service`]: [`RosterService`], the single writer for roster-affecting mutations
//! - [`cascade`]: hooks that clear references when users or courses go away
//! - [`error`]: [`RosterError`] and its HTTP status mapping

pub mod cascade;
pub mod error;
pub mod service;
pub mod validator;

pub use cascade::{CascadeHook, CascadeRegistry, EntityEvent};
pub use error::{RosterError, RosterResult};
pub use service::RosterService;
pub use validator::{RosterValidator, parse_id};

//! # Classhub Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: JWT signing secret and token lifetime
//! - [`cors`]: allowed browser origins
//! - [`upload`]: upload directory, public URL prefix and size limit
//! - [`server`]: bind address and entity store backend
//!
//! Every `from_env` falls back to a development default when a variable is
//! unset or unparsable.

pub mod cors;
pub mod jwt;
pub mod server;
pub mod upload;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::{ServerConfig, StoreBackend};
pub use upload::UploadConfig;

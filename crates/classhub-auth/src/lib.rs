//! # Classhub Auth
//!
//! Access-token claims and JWT helpers.
//!
//! A token carries the user's id, email, role and the capability list derived
//! from that role, so authorization at the HTTP boundary needs no store lookup.
//!
//! ```ignore
//! use classhub_auth::{create_access_token, verify_token};
//! use classhub_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "t@example.com", "teacher", permissions, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};

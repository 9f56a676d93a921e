//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **password**: Argon2id implementation of the password hashing port
//! - **token**: HS256 JWT implementation of the token codec port
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod password;
pub mod persistence;
pub mod token;

pub use password::Argon2PasswordHasher;
pub use token::JwtTokenCodec;

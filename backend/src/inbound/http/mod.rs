//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod courses;
pub mod error;
pub mod health;
pub mod state;
pub mod users;

pub use error::ApiResult;

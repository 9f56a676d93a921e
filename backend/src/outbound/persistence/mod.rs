//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling. Repositories
//! are thin translators between Diesel row structs and domain types; the
//! row structs and schema definitions stay internal to this module. All
//! database errors are mapped to the typed persistence errors the ports
//! declare.

mod diesel_course_repository;
mod diesel_enrollment_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

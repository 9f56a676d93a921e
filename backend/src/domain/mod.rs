//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities and the services that
//! enforce the platform's rules, independent of HTTP and storage. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic error payload and category.
//! - User, Course, Enrollment — the three aggregates.
//! - AccountService, EnrollmentService, CourseCatalogService — services
//!   implementing the driving ports in [`ports`].
//! - DemoCourseSeeder — idempotent demo catalogue seeding.

pub mod account_service;
pub mod course;
pub mod course_service;
pub mod enrollment;
pub mod enrollment_service;
pub mod error;
pub mod ports;
pub mod seed;
pub mod user;

pub use self::account_service::{AccountService, PASSWORD_MIN};
pub use self::course::{Course, CourseDraft, CourseId, CourseValidationError, CourseView};
pub use self::course_service::CourseCatalogService;
pub use self::enrollment::{
    Enrollment, EnrollmentDraft, EnrollmentId, EnrollmentValidationError,
};
pub use self::enrollment_service::{CancellationPolicy, EnrollmentService};
pub use self::error::{Error, ErrorCode};
pub use self::seed::DemoCourseSeeder;
pub use self::user::{EmailAddress, PersonName, User, UserDraft, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campus::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

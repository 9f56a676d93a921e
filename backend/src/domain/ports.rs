//! Domain ports defining the edges of the hexagon.
//!
//! Driving ports (`Accounts`, `EnrollmentLifecycle`, `CourseCatalog`) are
//! what the HTTP adapter calls into; driven ports (repositories, hasher,
//! token codec) are what the domain services call out to. Each driven port
//! exposes a typed error enum so adapters map their failures into
//! predictable variants instead of stringly-typed results.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use super::course::{Course, CourseId, CourseView};
use super::enrollment::Enrollment;
use super::error::Error;
use super::user::{EmailAddress, User, UserId};

/// Signed bearer token issued at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a signed token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AccessToken> for String {
    fn from(value: AccessToken) -> Self {
        value.0
    }
}

/// Registration input accepted by [`Accounts::register`].
///
/// Fields are raw strings; validation happens inside the service so that
/// every caller gets identical rules.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub birthdate: NaiveDate,
}

/// Credential pair accepted by [`Accounts::login`].
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Administrative course creation input.
#[derive(Debug, Clone)]
pub struct CreateCourseRequest {
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub starts_on: NaiveDate,
}

/// Filters for [`CourseCatalog::list_open_courses`].
#[derive(Debug, Clone, Default)]
pub struct CourseListFilter {
    /// Case-insensitive substring matched against name and description.
    pub name_pattern: Option<String>,
    /// When set, each view carries the user's enrollment flag.
    pub as_of_user: Option<UserId>,
}

/// Driving port for registration and login.
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Register a new user.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;

    /// Verify credentials and issue a signed token.
    async fn login(&self, request: LoginRequest) -> Result<AccessToken, Error>;
}

/// Driving port for the enrollment lifecycle (the write side of the core).
#[async_trait]
pub trait EnrollmentLifecycle: Send + Sync {
    /// Enroll a user in a course, reactivating a canceled enrollment when
    /// one exists.
    async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<Enrollment, Error>;

    /// Soft-cancel the user's active enrollment.
    async fn cancel(&self, user_id: UserId, course_id: CourseId) -> Result<Enrollment, Error>;
}

/// Driving port for catalogue reads and administrative creation.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Create a course.
    async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, Error>;

    /// List courses open for enrollment, soonest first.
    async fn list_open_courses(&self, filter: CourseListFilter) -> Result<Vec<CourseView>, Error>;

    /// List courses the user has any enrollment history with.
    async fn list_enrolled_courses(&self, user_id: UserId) -> Result<Vec<CourseView>, Error>;
}

/// Persistence errors raised by [`UserRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// The email column's unique constraint rejected the insert.
    #[error("email address is already registered")]
    DuplicateEmail,
}

impl UserPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`CourseRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoursePersistenceError {
    /// Repository connection could not be established.
    #[error("course repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("course repository query failed: {message}")]
    Query { message: String },
}

impl CoursePersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence errors raised by [`EnrollmentRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentPersistenceError {
    /// Repository connection could not be established.
    #[error("enrollment repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("enrollment repository query failed: {message}")]
    Query { message: String },
    /// The partial unique index on active rows rejected the write. Raised by
    /// the losing side of a concurrent enroll race.
    #[error("an active enrollment already exists for this user and course")]
    DuplicateActive,
}

impl EnrollmentPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Errors raised by [`PasswordHasher`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Hashing or hash parsing failed.
    #[error("password hashing failed: {message}")]
    Hash { message: String },
}

impl PasswordHashError {
    /// Helper for hashing failures.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }
}

/// Errors raised by [`TokenCodec`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signing a new token failed.
    #[error("token issuance failed: {message}")]
    Issue { message: String },
    /// The presented token is expired, forged, or malformed.
    #[error("token is invalid")]
    Invalid,
}

impl TokenError {
    /// Helper for issuance failures.
    pub fn issue(message: impl Into<String>) -> Self {
        Self::Issue {
            message: message.into(),
        }
    }
}

/// Persistence port for the identity store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by lowercase email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;
}

/// Persistence port for the course catalogue.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert a new course record.
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError>;

    /// Insert unless a course with the same natural key (name, start date)
    /// already exists. Returns `true` when a row was inserted.
    async fn insert_if_absent(&self, course: &Course) -> Result<bool, CoursePersistenceError>;

    /// Fetch a course by identifier.
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CoursePersistenceError>;

    /// Fetch a batch of courses by identifier.
    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CoursePersistenceError>;

    /// List courses starting on or after `today`, optionally filtered by a
    /// case-insensitive substring on name/description, ordered by start date
    /// ascending with id as the tie-break.
    async fn list_open(
        &self,
        today: NaiveDate,
        name_pattern: Option<&str>,
    ) -> Result<Vec<Course>, CoursePersistenceError>;
}

/// Persistence port for the enrollment ledger.
///
/// `activate` and `cancel_active` are the two atomic state transitions; each
/// must be serialisable with respect to concurrent calls for the same
/// (user, course) pair. The Diesel adapter delegates that guarantee to the
/// partial unique index on active rows.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Fetch the active enrollment for the pair, if any.
    async fn find_active(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, EnrollmentPersistenceError>;

    /// Make the pair active: reactivate the latest canceled row (clearing
    /// `canceled_at`, refreshing `enrolled_at`) or insert a new row. A
    /// concurrent activation for the same pair loses with
    /// [`EnrollmentPersistenceError::DuplicateActive`].
    async fn activate(
        &self,
        user_id: UserId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Result<Enrollment, EnrollmentPersistenceError>;

    /// Set `canceled_at` on the active row. Returns `None` when no active
    /// row exists, including when a concurrent cancel got there first.
    async fn cancel_active(
        &self,
        user_id: UserId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Result<Option<Enrollment>, EnrollmentPersistenceError>;

    /// Count active enrollments per course for the given batch.
    async fn count_active_by_course(
        &self,
        course_ids: &[CourseId],
    ) -> Result<HashMap<CourseId, u64>, EnrollmentPersistenceError>;

    /// Fetch the user's most recent enrollment per course, across active and
    /// canceled history.
    async fn latest_per_course_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentPersistenceError>;
}

/// Hashing port wrapping the password-hash primitive.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into an opaque PHC string.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check a plaintext password against a stored PHC string.
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, PasswordHashError>;
}

/// Signing port wrapping the token primitive.
pub trait TokenCodec: Send + Sync {
    /// Issue a signed token whose subject is the user id.
    fn issue(&self, user_id: UserId) -> Result<AccessToken, TokenError>;

    /// Verify a raw token and return its subject.
    fn verify(&self, raw: &str) -> Result<UserId, TokenError>;
}

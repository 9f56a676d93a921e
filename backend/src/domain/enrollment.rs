//! Enrollment ledger model.
//!
//! An enrollment joins a user to a course. Cancellation is soft: the row
//! keeps its identity and receives a cancellation timestamp, so history is
//! preserved and re-enrollment can reactivate the same row.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::course::CourseId;
use super::user::UserId;

/// Validation errors returned by [`Enrollment::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentValidationError {
    CanceledBeforeEnrolled,
}

impl fmt::Display for EnrollmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CanceledBeforeEnrolled => {
                write!(f, "canceled_at must not precede enrolled_at")
            }
        }
    }
}

impl std::error::Error for EnrollmentValidationError {}

/// Stable enrollment identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(Uuid);

impl EnrollmentId {
    /// Generate a new random [`EnrollmentId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EnrollmentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single enroll/cancel record in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    id: EnrollmentId,
    user_id: UserId,
    course_id: CourseId,
    enrolled_at: DateTime<Utc>,
    canceled_at: Option<DateTime<Utc>>,
}

/// Field bundle for [`Enrollment::new`].
#[derive(Debug, Clone)]
pub struct EnrollmentDraft {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub enrolled_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// Construct an enrollment, enforcing timestamp ordering.
    pub fn new(draft: EnrollmentDraft) -> Result<Self, EnrollmentValidationError> {
        if let Some(canceled_at) = draft.canceled_at {
            if canceled_at < draft.enrolled_at {
                return Err(EnrollmentValidationError::CanceledBeforeEnrolled);
            }
        }
        Ok(Self {
            id: draft.id,
            user_id: draft.user_id,
            course_id: draft.course_id,
            enrolled_at: draft.enrolled_at,
            canceled_at: draft.canceled_at,
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> EnrollmentId {
        self.id
    }

    /// Enrolled user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Target course.
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    /// When the enrollment was created or last reactivated.
    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    /// Cancellation timestamp, if the enrollment is canceled.
    pub fn canceled_at(&self) -> Option<DateTime<Utc>> {
        self.canceled_at
    }

    /// An enrollment is active while it has no cancellation timestamp.
    pub fn is_active(&self) -> bool {
        self.canceled_at.is_none()
    }
}

//! Course catalogue model.
//!
//! Courses are created administratively and are immutable afterwards. The
//! visibility rule lives here: a course is open for enrollment while its
//! start date has not passed (a course starting today is still enrollable).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the course constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    InvalidId,
    EmptyName,
}

impl fmt::Display for CourseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "course id must be a valid UUID"),
            Self::EmptyName => write!(f, "course name must not be empty"),
        }
    }
}

impl std::error::Error for CourseValidationError {}

/// Stable course identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
    /// Validate and construct a [`CourseId`] from string input.
    pub fn parse(id: impl AsRef<str>) -> Result<Self, CourseValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| CourseValidationError::InvalidId)
    }

    /// Generate a new random [`CourseId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CourseId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A course available on the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    name: String,
    description: Option<String>,
    cover_url: Option<String>,
    starts_on: NaiveDate,
    created_at: DateTime<Utc>,
}

/// Field bundle for [`Course::new`].
#[derive(Debug, Clone)]
pub struct CourseDraft {
    pub id: CourseId,
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub starts_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Construct a course from validated parts.
    pub fn new(draft: CourseDraft) -> Result<Self, CourseValidationError> {
        if draft.name.trim().is_empty() {
            return Err(CourseValidationError::EmptyName);
        }
        Ok(Self {
            id: draft.id,
            name: draft.name,
            description: draft.description,
            cover_url: draft.cover_url,
            starts_on: draft.starts_on,
            created_at: draft.created_at,
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> CourseId {
        self.id
    }

    /// Course title.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Optional long description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Optional cover image reference.
    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    /// First day of the course.
    pub fn starts_on(&self) -> NaiveDate {
        self.starts_on
    }

    /// Catalogue insertion timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the course is open for enrollment on the given date.
    ///
    /// Date-only comparison: a course starting today is still open. Once the
    /// start date has passed both enroll and cancel are locked.
    pub fn is_open_on(&self, today: NaiveDate) -> bool {
        self.starts_on >= today
    }
}

/// Read model combining a course with per-request enrollment annotations.
///
/// `active_enrollments` is recomputed on every query; it never comes from a
/// cached counter. The optional flags are present only when the listing was
/// produced for a specific user.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseView {
    /// The course being presented.
    pub course: Course,
    /// Count of enrollments with no cancellation timestamp.
    pub active_enrollments: u64,
    /// Whether the requesting user holds an active enrollment.
    pub enrolled: Option<bool>,
    /// Whether the user's latest enrollment for this course is canceled.
    pub was_canceled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn course(starts_on: NaiveDate) -> Course {
        Course::new(CourseDraft {
            id: CourseId::random(),
            name: "Intro to Rust".into(),
            description: None,
            cover_url: None,
            starts_on,
            created_at: Utc::now(),
        })
        .expect("valid course")
    }

    #[rstest]
    #[case(0, true)] // starts today: still enrollable
    #[case(1, true)]
    #[case(-1, false)]
    fn visibility_is_date_only(#[case] offset_days: i64, #[case] open: bool) {
        let today = NaiveDate::from_ymd_opt(2099, 6, 15).expect("valid date");
        let starts_on = today + chrono::Duration::days(offset_days);
        assert_eq!(course(starts_on).is_open_on(today), open);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn course_rejects_blank_name(#[case] name: &str) {
        let err = Course::new(CourseDraft {
            id: CourseId::random(),
            name: name.into(),
            description: None,
            cover_url: None,
            starts_on: NaiveDate::from_ymd_opt(2099, 1, 1).expect("valid date"),
            created_at: Utc::now(),
        })
        .expect_err("blank name");
        assert_eq!(err, CourseValidationError::EmptyName);
    }
}

//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Row-to-domain conversion goes through the
//! validated domain constructors so invalid rows surface as query errors.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Course, CourseDraft, Enrollment, EnrollmentDraft, User, UserDraft, UserId,
};

use super::schema::{courses, enrollments, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the courses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub starts_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new course records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub cover_url: Option<&'a str>,
    pub starts_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the enrollments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrollmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
}

/// Insertable struct for creating new enrollment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub(crate) struct NewEnrollmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert the row into a validated domain user.
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let UserRow {
            id,
            name,
            email,
            password_hash,
            birthdate,
            created_at,
        } = self;
        let name = crate::domain::PersonName::new(name).map_err(|err| err.to_string())?;
        let email = crate::domain::EmailAddress::new(&email).map_err(|err| err.to_string())?;
        User::new(UserDraft {
            id: UserId::from(id),
            name,
            email,
            password_hash,
            birthdate,
            created_at,
        })
        .map_err(|err| err.to_string())
    }
}

impl CourseRow {
    /// Convert the row into a validated domain course.
    pub(crate) fn into_domain(self) -> Result<Course, String> {
        let CourseRow {
            id,
            name,
            description,
            cover_url,
            starts_on,
            created_at,
        } = self;
        Course::new(CourseDraft {
            id: id.into(),
            name,
            description,
            cover_url,
            starts_on,
            created_at,
        })
        .map_err(|err| err.to_string())
    }
}

impl EnrollmentRow {
    /// Convert the row into a validated domain enrollment.
    pub(crate) fn into_domain(self) -> Result<Enrollment, String> {
        let EnrollmentRow {
            id,
            user_id,
            course_id,
            enrolled_at,
            canceled_at,
        } = self;
        Enrollment::new(EnrollmentDraft {
            id: id.into(),
            user_id: user_id.into(),
            course_id: course_id.into(),
            enrolled_at,
            canceled_at,
        })
        .map_err(|err| err.to_string())
    }
}

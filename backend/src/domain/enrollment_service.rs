//! Enrollment lifecycle service: the rules for enroll and cancel.
//!
//! Preconditions are checked before any write, and each write is a single
//! atomic repository operation, so no partial transition is ever observable.
//! The check-then-act window on enroll is closed by the storage layer's
//! partial unique index: a losing racer surfaces as `DuplicateActive` and is
//! reported exactly like a plain duplicate enrollment.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::course::{Course, CourseId};
use super::enrollment::Enrollment;
use super::ports::{
    CoursePersistenceError, CourseRepository, EnrollmentLifecycle, EnrollmentPersistenceError,
    EnrollmentRepository,
};
use super::user::UserId;
use super::Error;

/// Whether cancellation stays allowed once a course has started.
///
/// The sources disagree on this rule, so it is a deployment decision rather
/// than a hard-coded one. The default blocks cancellation, mirroring the
/// enroll-side cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancellationPolicy {
    /// Cancellation is locked once the course starts.
    #[default]
    BlockAfterStart,
    /// Users may drop a course mid-session.
    AllowAfterStart,
}

fn map_course_error(error: CoursePersistenceError) -> Error {
    match error {
        CoursePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CoursePersistenceError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
    }
}

fn map_enrollment_error(error: EnrollmentPersistenceError) -> Error {
    match error {
        EnrollmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("enrollment repository unavailable: {message}"))
        }
        EnrollmentPersistenceError::Query { message } => {
            Error::internal(format!("enrollment repository error: {message}"))
        }
        EnrollmentPersistenceError::DuplicateActive => {
            Error::conflict("already enrolled in this course")
        }
    }
}

/// Lifecycle service implementing the [`EnrollmentLifecycle`] driving port.
#[derive(Clone)]
pub struct EnrollmentService<C, E> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    clock: Arc<dyn Clock>,
    cancellation: CancellationPolicy,
}

impl<C, E> EnrollmentService<C, E> {
    /// Create a new service over the catalogue and ledger repositories.
    pub fn new(
        courses: Arc<C>,
        enrollments: Arc<E>,
        clock: Arc<dyn Clock>,
        cancellation: CancellationPolicy,
    ) -> Self {
        Self {
            courses,
            enrollments,
            clock,
            cancellation,
        }
    }
}

impl<C, E> EnrollmentService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn course_or_not_found(&self, course_id: CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(course_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found("course not found"))
    }

    fn ensure_not_started(&self, course: &Course) -> Result<(), Error> {
        let today = self.clock.utc().date_naive();
        if course.is_open_on(today) {
            Ok(())
        } else {
            Err(Error::conflict("course already started"))
        }
    }
}

#[async_trait]
impl<C, E> EnrollmentLifecycle for EnrollmentService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<Enrollment, Error> {
        let course = self.course_or_not_found(course_id).await?;
        self.ensure_not_started(&course)?;

        if self
            .enrollments
            .find_active(user_id, course_id)
            .await
            .map_err(map_enrollment_error)?
            .is_some()
        {
            return Err(Error::conflict("already enrolled in this course"));
        }

        self.enrollments
            .activate(user_id, course_id, self.clock.utc())
            .await
            .map_err(map_enrollment_error)
    }

    async fn cancel(&self, user_id: UserId, course_id: CourseId) -> Result<Enrollment, Error> {
        self.enrollments
            .find_active(user_id, course_id)
            .await
            .map_err(map_enrollment_error)?
            .ok_or_else(|| Error::not_found("enrollment not found"))?;

        if self.cancellation == CancellationPolicy::BlockAfterStart {
            let course = self.course_or_not_found(course_id).await?;
            self.ensure_not_started(&course)?;
        }

        // A concurrent cancel can still win between the check above and this
        // update; the update matches zero rows in that case.
        self.enrollments
            .cancel_active(user_id, course_id, self.clock.utc())
            .await
            .map_err(map_enrollment_error)?
            .ok_or_else(|| Error::not_found("enrollment not found"))
    }
}

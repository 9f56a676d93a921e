//! Course catalogue service: creation and the two listing queries.
//!
//! Listings assemble [`CourseView`] read models from separate queries: one
//! for the courses themselves and one grouped count of active enrollments.
//! Counts are recomputed per request rather than maintained as counters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::course::{Course, CourseDraft, CourseId, CourseView};
use super::enrollment::Enrollment;
use super::ports::{
    CourseCatalog, CourseListFilter, CoursePersistenceError, CourseRepository,
    CreateCourseRequest, EnrollmentPersistenceError, EnrollmentRepository,
};
use super::user::UserId;
use super::Error;

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
            Error::internal("unexpected duplicate enrollment during a read")
        }
    }
}

/// Catalogue service implementing the [`CourseCatalog`] driving port.
#[derive(Clone)]
pub struct CourseCatalogService<C, E> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<C, E> CourseCatalogService<C, E> {
    /// Create a new service over the catalogue and ledger repositories.
    pub fn new(courses: Arc<C>, enrollments: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            courses,
            enrollments,
            clock,
        }
    }
}

impl<C, E> CourseCatalogService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn counts_for(
        &self,
        courses: &[Course],
    ) -> Result<HashMap<CourseId, u64>, Error> {
        let ids: Vec<CourseId> = courses.iter().map(Course::id).collect();
        self.enrollments
            .count_active_by_course(&ids)
            .await
            .map_err(map_enrollment_error)
    }
}

#[async_trait]
impl<C, E> CourseCatalog for CourseCatalogService<C, E>
where
    C: CourseRepository,
    E: EnrollmentRepository,
{
    async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, Error> {
        let course = Course::new(CourseDraft {
            id: CourseId::random(),
            name: request.name,
            description: request.description,
            cover_url: request.cover_url,
            starts_on: request.starts_on,
            created_at: self.clock.utc(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.courses
            .insert(&course)
            .await
            .map_err(map_course_error)?;
        Ok(course)
    }

    async fn list_open_courses(&self, filter: CourseListFilter) -> Result<Vec<CourseView>, Error> {
        let today = self.clock.utc().date_naive();
        let courses = self
            .courses
            .list_open(today, filter.name_pattern.as_deref())
            .await
            .map_err(map_course_error)?;
        let counts = self.counts_for(&courses).await?;

        let user_history = match filter.as_of_user {
            Some(user_id) => self
                .enrollments
                .latest_per_course_for_user(user_id)
                .await
                .map_err(map_enrollment_error)?
                .into_iter()
                .map(|enrollment| (enrollment.course_id(), enrollment))
                .collect(),
            None => HashMap::new(),
        };

        Ok(courses
            .into_iter()
            .map(|course| {
                let active_enrollments = counts.get(&course.id()).copied().unwrap_or(0);
                let (enrolled, was_canceled) = if filter.as_of_user.is_some() {
                    let latest = user_history.get(&course.id());
                    (
                        Some(latest.is_some_and(Enrollment::is_active)),
                        Some(latest.is_some_and(|e| !e.is_active())),
                    )
                } else {
                    (None, None)
                };
                CourseView {
                    course,
                    active_enrollments,
                    enrolled,
                    was_canceled,
                }
            })
            .collect())
    }

    async fn list_enrolled_courses(&self, user_id: UserId) -> Result<Vec<CourseView>, Error> {
        let history = self
            .enrollments
            .latest_per_course_for_user(user_id)
            .await
            .map_err(map_enrollment_error)?;
        let by_course: HashMap<CourseId, &Enrollment> = history
            .iter()
            .map(|enrollment| (enrollment.course_id(), enrollment))
            .collect();

        let ids: Vec<CourseId> = by_course.keys().copied().collect();
        let mut courses = self
            .courses
            .find_by_ids(&ids)
            .await
            .map_err(map_course_error)?;
        courses.sort_by_key(|course| (course.starts_on(), *course.id().as_uuid()));
        let counts = self.counts_for(&courses).await?;

        Ok(courses
            .into_iter()
            .map(|course| {
                let latest = by_course.get(&course.id()).copied();
                CourseView {
                    active_enrollments: counts.get(&course.id()).copied().unwrap_or(0),
                    enrolled: Some(latest.is_some_and(|e| e.is_active())),
                    was_canceled: Some(latest.is_some_and(|e| !e.is_active())),
                    course,
                }
            })
            .collect())
    }
}

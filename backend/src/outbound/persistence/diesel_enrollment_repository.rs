//! PostgreSQL-backed `EnrollmentRepository` implementation using Diesel ORM.
//!
//! The active-row invariant is enforced by the partial unique index on
//! `(user_id, course_id) WHERE canceled_at IS NULL`. `activate` runs inside a
//! transaction: it first tries to reactivate the most recent canceled row,
//! guarded by `canceled_at IS NOT NULL` so a racing activation matches zero
//! rows, and otherwise inserts a fresh row. Either way the losing side of a
//! race hits the index and surfaces as `DuplicateActive`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{EnrollmentPersistenceError, EnrollmentRepository};
use crate::domain::{CourseId, Enrollment, EnrollmentId, UserId};

use super::error_mapping::{is_unique_violation, map_basic_diesel_error, map_basic_pool_error};
use super::models::{EnrollmentRow, NewEnrollmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::enrollments;

/// Diesel-backed implementation of the enrollment repository port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EnrollmentPersistenceError {
    map_basic_pool_error(error, EnrollmentPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> EnrollmentPersistenceError {
    if is_unique_violation(&error) {
        return EnrollmentPersistenceError::DuplicateActive;
    }
    map_basic_diesel_error(
        error,
        EnrollmentPersistenceError::query,
        EnrollmentPersistenceError::connection,
    )
}

fn row_to_enrollment(row: EnrollmentRow) -> Result<Enrollment, EnrollmentPersistenceError> {
    row.into_domain().map_err(EnrollmentPersistenceError::query)
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn find_active(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .filter(enrollments::course_id.eq(course_id.as_uuid()))
            .filter(enrollments::canceled_at.is_null())
            .select(EnrollmentRow::as_select())
            .first::<EnrollmentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_enrollment).transpose()
    }

    async fn activate(
        &self,
        user_id: UserId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Result<Enrollment, EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_uuid = *user_id.as_uuid();
        let course_uuid = *course_id.as_uuid();

        let row = conn
            .transaction::<EnrollmentRow, diesel::result::Error, _>(|conn| {
                async move {
                    let latest_canceled = enrollments::table
                        .filter(enrollments::user_id.eq(user_uuid))
                        .filter(enrollments::course_id.eq(course_uuid))
                        .filter(enrollments::canceled_at.is_not_null())
                        .order(enrollments::enrolled_at.desc())
                        .limit(1)
                        .select(enrollments::id)
                        .first::<Uuid>(conn)
                        .await
                        .optional()?;

                    if let Some(canceled_id) = latest_canceled {
                        // The is_not_null guard makes a racing reactivation
                        // match zero rows instead of double-activating.
                        let reactivated = diesel::update(
                            enrollments::table
                                .filter(enrollments::id.eq(canceled_id))
                                .filter(enrollments::canceled_at.is_not_null()),
                        )
                        .set((
                            enrollments::canceled_at.eq(None::<DateTime<Utc>>),
                            enrollments::enrolled_at.eq(now),
                        ))
                        .returning(EnrollmentRow::as_returning())
                        .get_result::<EnrollmentRow>(conn)
                        .await
                        .optional()?;

                        if let Some(row) = reactivated {
                            return Ok(row);
                        }
                    }

                    diesel::insert_into(enrollments::table)
                        .values(&NewEnrollmentRow {
                            id: *EnrollmentId::random().as_uuid(),
                            user_id: user_uuid,
                            course_id: course_uuid,
                            enrolled_at: now,
                        })
                        .returning(EnrollmentRow::as_returning())
                        .get_result::<EnrollmentRow>(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row_to_enrollment(row)
    }

    async fn cancel_active(
        &self,
        user_id: UserId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Result<Option<Enrollment>, EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(
            enrollments::table
                .filter(enrollments::user_id.eq(user_id.as_uuid()))
                .filter(enrollments::course_id.eq(course_id.as_uuid()))
                .filter(enrollments::canceled_at.is_null()),
        )
        .set(enrollments::canceled_at.eq(Some(now)))
        .returning(EnrollmentRow::as_returning())
        .get_result::<EnrollmentRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_enrollment).transpose()
    }

    async fn count_active_by_course(
        &self,
        course_ids: &[CourseId],
    ) -> Result<HashMap<CourseId, u64>, EnrollmentPersistenceError> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = course_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<(Uuid, i64)> = enrollments::table
            .filter(enrollments::course_id.eq_any(&uuids))
            .filter(enrollments::canceled_at.is_null())
            .group_by(enrollments::course_id)
            .select((enrollments::course_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(course_id, count)| {
                (CourseId::from(course_id), u64::try_from(count).unwrap_or(0))
            })
            .collect())
    }

    async fn latest_per_course_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .order((enrollments::course_id.asc(), enrollments::enrolled_at.desc()))
            .distinct_on(enrollments::course_id)
            .select(EnrollmentRow::as_select())
            .load::<EnrollmentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_enrollment).collect()
    }
}

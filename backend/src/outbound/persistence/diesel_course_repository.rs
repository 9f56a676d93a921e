//! PostgreSQL-backed `CourseRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CoursePersistenceError, CourseRepository};
use crate::domain::{Course, CourseId};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CourseRow, NewCourseRow};
use super::pool::{DbPool, PoolError};
use super::schema::courses;

/// Diesel-backed implementation of the course repository port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CoursePersistenceError {
    map_basic_pool_error(error, CoursePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CoursePersistenceError {
    map_basic_diesel_error(
        error,
        CoursePersistenceError::query,
        CoursePersistenceError::connection,
    )
}

fn row_to_course(row: CourseRow) -> Result<Course, CoursePersistenceError> {
    row.into_domain().map_err(CoursePersistenceError::query)
}

fn new_row(course: &Course) -> NewCourseRow<'_> {
    NewCourseRow {
        id: *course.id().as_uuid(),
        name: course.name(),
        description: course.description(),
        cover_url: course.cover_url(),
        starts_on: course.starts_on(),
        created_at: course.created_at(),
    }
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(courses::table)
            .values(&new_row(course))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn insert_if_absent(&self, course: &Course) -> Result<bool, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = diesel::insert_into(courses::table)
            .values(&new_row(course))
            .on_conflict((courses::name, courses::starts_on))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = courses::table
            .find(id.as_uuid())
            .select(CourseRow::as_select())
            .first::<CourseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_course).transpose()
    }

    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CoursePersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = courses::table
            .filter(courses::id.eq_any(&uuids))
            .order((courses::starts_on.asc(), courses::id.asc()))
            .select(CourseRow::as_select())
            .load::<CourseRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_course).collect()
    }

    async fn list_open(
        &self,
        today: NaiveDate,
        name_pattern: Option<&str>,
    ) -> Result<Vec<Course>, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = courses::table
            .filter(courses::starts_on.ge(today))
            .into_boxed();

        if let Some(pattern) = name_pattern {
            let needle = format!("%{}%", escape_like(pattern));
            query = query.filter(
                courses::name
                    .ilike(needle.clone())
                    .nullable()
                    .or(courses::description.ilike(needle)),
            );
        }

        let rows = query
            .order((courses::starts_on.asc(), courses::id.asc()))
            .select(CourseRow::as_select())
            .load::<CourseRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_course).collect()
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::escape_like;

    #[rstest]
    #[case("rust", "rust")]
    #[case("100%", "100\\%")]
    #[case("snake_case", "snake\\_case")]
    #[case("back\\slash", "back\\\\slash")]
    fn like_metacharacters_are_escaped(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_like(input), expected);
    }
}

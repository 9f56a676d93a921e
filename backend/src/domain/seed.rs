//! Demo catalogue seeding for empty deployments.
//!
//! Seeding is idempotent: each course is keyed by its (name, start date)
//! natural key and inserted with an on-conflict no-op, so restarting the
//! server never duplicates the catalogue. Start dates are anchored to the
//! first day of the next month so the key stays stable between restarts
//! within the same month.

use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};
use mockable::Clock;
use tracing::info;

use super::course::{Course, CourseDraft, CourseId};
use super::ports::{CoursePersistenceError, CourseRepository};

/// (name, description, months after the anchor) per demo course.
const DEMO_COURSES: &[(&str, &str, u32)] = &[
    (
        "Web Development Fundamentals",
        "HTML, CSS, and the HTTP request cycle from first principles.",
        0,
    ),
    (
        "Relational Databases",
        "Schema design, joins, transactions, and indexing strategies.",
        0,
    ),
    (
        "REST API Design",
        "Resource modelling, status codes, and versioning a public API.",
        1,
    ),
    (
        "Containers in Production",
        "Building, shipping, and operating containerised services.",
        2,
    ),
];

/// First day of the month after `today`.
fn anchor_date(today: NaiveDate) -> NaiveDate {
    let first = today.with_day(1).unwrap_or(today);
    first + Months::new(1)
}

/// Seeds a small demo catalogue when enabled by configuration.
pub struct DemoCourseSeeder<C> {
    courses: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C: CourseRepository> DemoCourseSeeder<C> {
    /// Create a seeder over the catalogue repository.
    pub fn new(courses: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { courses, clock }
    }

    /// Insert any demo courses not already present. Returns the number of
    /// courses actually inserted.
    pub async fn run(&self) -> Result<usize, CoursePersistenceError> {
        let now = self.clock.utc();
        let anchor = anchor_date(now.date_naive());
        let mut inserted = 0;

        for (name, description, month_offset) in DEMO_COURSES {
            let course = Course::new(CourseDraft {
                id: CourseId::random(),
                name: (*name).to_owned(),
                description: Some((*description).to_owned()),
                cover_url: None,
                starts_on: anchor + Months::new(*month_offset),
                created_at: now,
            })
            .map_err(|err| CoursePersistenceError::query(err.to_string()))?;

            if self.courses.insert_if_absent(&course).await? {
                inserted += 1;
            }
        }

        info!(inserted, "demo catalogue seeding finished");
        Ok(inserted)
    }
}

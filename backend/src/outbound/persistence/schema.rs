//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; regenerate with `diesel print-schema` after migration changes.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (at least 3 characters, max 100).
        #[max_length = 100]
        name -> Varchar,
        /// Lowercased email address, unique across the platform.
        #[max_length = 255]
        email -> Varchar,
        /// PHC-format password hash.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Date of birth.
        birthdate -> Date,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Course catalogue.
    courses (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Course title; (name, starts_on) is the seeding natural key.
        #[max_length = 255]
        name -> Varchar,
        /// Optional long description.
        description -> Nullable<Text>,
        /// Optional cover image URL.
        #[max_length = 512]
        cover_url -> Nullable<Varchar>,
        /// First day of the course.
        starts_on -> Date,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Enrollment ledger. At most one row per (user_id, course_id) pair has
    /// `canceled_at IS NULL`, enforced by a partial unique index.
    enrollments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Enrolled user.
        user_id -> Uuid,
        /// Target course.
        course_id -> Uuid,
        /// When the enrollment was created or last reactivated.
        enrolled_at -> Timestamptz,
        /// Cancellation timestamp; NULL while the enrollment is active.
        canceled_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(enrollments -> users (user_id));
diesel::joinable!(enrollments -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(courses, enrollments, users);

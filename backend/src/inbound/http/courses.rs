//! Courses API handlers.
//!
//! ```text
//! GET    /api/v1/courses?filter=rust
//! POST   /api/v1/courses
//! POST   /api/v1/courses/{course_id}/enrollment
//! DELETE /api/v1/courses/{course_id}/enrollment
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{CourseListFilter, CreateCourseRequest};
use crate::domain::{Course, CourseId, CourseView, Error, UserId};
use crate::inbound::http::auth::{CurrentUser, MaybeUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Public course representation.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[schema(example = "2026-09-01")]
    pub starts_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: *course.id().as_uuid(),
            name: course.name().to_owned(),
            description: course.description().map(str::to_owned),
            cover_url: course.cover_url().map(str::to_owned),
            starts_on: course.starts_on(),
            created_at: course.created_at(),
        }
    }
}

/// Course annotated with enrollment data for a listing.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseViewResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    /// Count of active enrollments, recomputed per request.
    pub active_enrollments: u64,
    /// Whether the requesting user is actively enrolled. Absent on
    /// anonymous listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled: Option<bool>,
    /// Whether the user's latest enrollment is canceled. Absent on
    /// anonymous listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub was_canceled: Option<bool>,
}

impl From<CourseView> for CourseViewResponse {
    fn from(view: CourseView) -> Self {
        Self {
            course: view.course.into(),
            active_enrollments: view.active_enrollments,
            enrolled: view.enrolled,
            was_canceled: view.was_canceled,
        }
    }
}

/// Course creation request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[schema(example = "2026-09-01")]
    pub starts_on: NaiveDate,
}

/// Query parameters accepted by the course listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesQuery {
    /// Case-insensitive substring matched against name and description.
    #[serde(default)]
    pub filter: Option<String>,
    /// User whose enrollment flags should annotate each course. Defaults to
    /// the authenticated caller when omitted.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Credential fallback; consumed by the auth extractor, listed here so
    /// it appears in the API documentation.
    #[serde(default)]
    #[allow(dead_code)]
    pub token: Option<String>,
}

/// Confirmation payload for enrollment state changes.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

/// List courses open for enrollment, soonest first.
///
/// Anonymous requests get plain counts; authenticated requests also get
/// per-course `enrolled` / `wasCanceled` flags for the caller.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(ListCoursesQuery),
    responses(
        (status = 200, description = "Open courses", body = [CourseViewResponse]),
        (status = 403, description = "Presented credential is invalid", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    user: MaybeUser,
    query: web::Query<ListCoursesQuery>,
) -> ApiResult<web::Json<Vec<CourseViewResponse>>> {
    let query = query.into_inner();
    let views = state
        .catalog
        .list_open_courses(CourseListFilter {
            name_pattern: query.filter.filter(|f| !f.trim().is_empty()),
            as_of_user: query.user_id.map(UserId::from).or_else(|| user.id()),
        })
        .await?;
    Ok(web::Json(
        views.into_iter().map(CourseViewResponse::from).collect(),
    ))
}

/// Create a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CreateCourseBody,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Credential missing or invalid", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    _current: CurrentUser,
    payload: web::Json<CreateCourseBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let course = state
        .catalog
        .create_course(CreateCourseRequest {
            name: body.name,
            description: body.description,
            cover_url: body.cover_url,
            starts_on: body.starts_on,
        })
        .await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

/// Enroll the authenticated user in a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/enrollment",
    params(("course_id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Enrollment active", body = MessageResponse),
        (status = 400, description = "Already enrolled or course started", body = Error),
        (status = 403, description = "Credential missing or invalid", body = Error),
        (status = 404, description = "Course not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "enroll"
)]
#[post("/courses/{course_id}/enrollment")]
pub async fn enroll(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<MessageResponse>> {
    let course_id = CourseId::from(path.into_inner());
    state.lifecycle.enroll(current.id(), course_id).await?;
    Ok(web::Json(MessageResponse {
        message: "enrollment confirmed".into(),
    }))
}

/// Cancel the authenticated user's active enrollment.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}/enrollment",
    params(("course_id" = Uuid, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Enrollment canceled", body = MessageResponse),
        (status = 400, description = "Course already started", body = Error),
        (status = 403, description = "Credential missing or invalid", body = Error),
        (status = 404, description = "No active enrollment", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["courses"],
    operation_id = "cancelEnrollment"
)]
#[delete("/courses/{course_id}/enrollment")]
pub async fn cancel_enrollment(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<MessageResponse>> {
    let course_id = CourseId::from(path.into_inner());
    state.lifecycle.cancel(current.id(), course_id).await?;
    Ok(web::Json(MessageResponse {
        message: "enrollment canceled".into(),
    }))
}

//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users {"name":"Ana Silva","email":"ana@example.com",...}
//! POST /api/v1/login {"email":"ana@example.com","password":"..."}
//! GET  /api/v1/users/{user_id}/courses
//! ```

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{LoginRequest, RegistrationRequest};
use crate::domain::{Error, User, UserId};
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::courses::CourseViewResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body for `POST /api/v1/users`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name, at least 3 characters.
    pub name: String,
    /// Email address, unique per user (case-insensitive).
    pub email: String,
    /// Plaintext password, at least 6 characters. Never stored.
    pub password: String,
    /// Date of birth.
    #[schema(example = "1990-01-01")]
    pub birthdate: NaiveDate,
}

/// Public user representation. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            birthdate: user.birthdate(),
            created_at: user.created_at(),
        }
    }
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Login response carrying the signed bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request or duplicate email", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let user = state
        .accounts
        .register(RegistrationRequest {
            name: body.name,
            email: body.email,
            password: body.password,
            birthdate: body.birthdate,
        })
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate and issue a bearer token.
///
/// The token is returned in the body and duplicated as an http-only `token`
/// cookie so browser clients need no extra handling.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginBody,
    responses(
        (
            status = 200,
            description = "Login success",
            body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Token cookie"))
        ),
        (status = 400, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let token = state
        .accounts
        .login(LoginRequest {
            email: body.email,
            password: body.password,
        })
        .await?;

    let cookie = Cookie::build("token", token.as_str().to_owned())
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        token: token.into(),
    }))
}

/// List the courses a user has enrollment history with.
///
/// The path id must match the token subject; anything else is a 403 so user
/// enrollment history stays private.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/courses",
    params(("user_id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Enrollment history", body = [CourseViewResponse]),
        (status = 403, description = "Credential missing or for another user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listEnrolledCourses"
)]
#[get("/users/{user_id}/courses")]
pub async fn enrolled_courses(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<CourseViewResponse>>> {
    let requested = UserId::from(path.into_inner());
    if requested != current.id() {
        return Err(Error::forbidden("cannot access another user's courses"));
    }

    let views = state.catalog.list_enrolled_courses(requested).await?;
    Ok(web::Json(
        views.into_iter().map(CourseViewResponse::from).collect(),
    ))
}

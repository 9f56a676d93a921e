//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: all HTTP endpoints from the inbound layer, the shared
//! error schema, and the bearer/cookie token security schemes. The generated
//! specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::courses::{
    CourseResponse, CourseViewResponse, CreateCourseBody, MessageResponse,
};
use crate::inbound::http::users::{LoginBody, LoginResponse, RegisterRequest, UserResponse};

/// Enrich the generated document with the token security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        components.add_security_scheme(
            "TokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "token",
                "Token cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus enrollment API",
        description = "HTTP interface for registration, login, course browsing, and enrollment."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = []), ("TokenCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::enrolled_courses,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::enroll,
        crate::inbound::http::courses::cancel_enrollment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequest,
        UserResponse,
        LoginBody,
        LoginResponse,
        CreateCourseBody,
        CourseResponse,
        CourseViewResponse,
        MessageResponse,
    )),
    tags(
        (name = "users", description = "Registration, login, and enrollment history"),
        (name = "courses", description = "Course catalogue and enrollment lifecycle"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use utoipa::OpenApi;

    use super::*;

    #[rstest]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/v1/users",
            "/api/v1/login",
            "/api/v1/users/{user_id}/courses",
            "/api/v1/courses",
            "/api/v1/courses/{course_id}/enrollment",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }

    #[rstest]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.schemas.contains_key("Error"));
        assert!(components.schemas.contains_key("ErrorCode"));
    }
}

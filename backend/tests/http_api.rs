//! HTTP adapter guardrails.
//!
//! These tests exercise the real Actix handlers, extractors, and error
//! mapping while substituting deterministic driving ports, so the contract
//! of the REST surface is pinned without a database. The token codec is the
//! real HS256 implementation.

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;
use serde_json::{json, Value};

use campus::domain::ports::{
    AccessToken, Accounts, CourseCatalog, CourseListFilter, CreateCourseRequest,
    EnrollmentLifecycle, LoginRequest, RegistrationRequest, TokenCodec,
};
use campus::domain::{
    Course, CourseDraft, CourseId, CourseView, EmailAddress, Enrollment, EnrollmentDraft,
    EnrollmentId, Error, PersonName, User, UserDraft, UserId,
};
use campus::inbound::http::courses::{cancel_enrollment, create_course, enroll, list_courses};
use campus::inbound::http::state::HttpState;
use campus::inbound::http::users::{enrolled_courses, login, register};
use campus::outbound::JwtTokenCodec;

const SECRET: &str = "integration-test-signing-secret-0123456789";
const PASSWORD: &str = "correct-horse";

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0)
        .single()
        .expect("valid instant")
}

fn course(name: &str, offset_days: i64) -> Course {
    Course::new(CourseDraft {
        id: CourseId::random(),
        name: name.into(),
        description: Some("hands-on".into()),
        cover_url: None,
        starts_on: now().date_naive() + Duration::days(offset_days),
        created_at: now(),
    })
    .expect("valid course")
}

fn enrollment(user_id: UserId, course_id: CourseId) -> Enrollment {
    Enrollment::new(EnrollmentDraft {
        id: EnrollmentId::random(),
        user_id,
        course_id,
        enrolled_at: now(),
        canceled_at: None,
    })
    .expect("valid enrollment")
}

/// Accounts stub with one registered identity.
struct StubAccounts {
    user_id: UserId,
    tokens: Arc<JwtTokenCodec>,
}

#[async_trait]
impl Accounts for StubAccounts {
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        if request.email == "taken@example.com" {
            return Err(Error::conflict("email address is already registered"));
        }
        let draft = UserDraft {
            id: self.user_id,
            name: PersonName::new(request.name)
                .map_err(|err| Error::invalid_request(err.to_string()))?,
            email: EmailAddress::new(request.email)
                .map_err(|err| Error::invalid_request(err.to_string()))?,
            password_hash: "$argon2id$stub".into(),
            birthdate: request.birthdate,
            created_at: now(),
        };
        User::new(draft).map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn login(&self, request: LoginRequest) -> Result<AccessToken, Error> {
        if request.password != PASSWORD {
            return Err(Error::invalid_request("invalid email or password"));
        }
        self.tokens
            .issue(self.user_id)
            .map_err(|err| Error::internal(err.to_string()))
    }
}

/// Catalogue stub serving one open course; flags appear only when the
/// listing was requested for a user, matching the real service.
struct StubCatalog {
    open_course: Course,
}

#[async_trait]
impl CourseCatalog for StubCatalog {
    async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, Error> {
        Course::new(CourseDraft {
            id: CourseId::random(),
            name: request.name,
            description: request.description,
            cover_url: request.cover_url,
            starts_on: request.starts_on,
            created_at: now(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn list_open_courses(&self, filter: CourseListFilter) -> Result<Vec<CourseView>, Error> {
        let personalised = filter.as_of_user.is_some();
        Ok(vec![CourseView {
            course: self.open_course.clone(),
            active_enrollments: 3,
            enrolled: personalised.then_some(false),
            was_canceled: personalised.then_some(false),
        }])
    }

    async fn list_enrolled_courses(&self, _user_id: UserId) -> Result<Vec<CourseView>, Error> {
        Ok(vec![CourseView {
            course: self.open_course.clone(),
            active_enrollments: 3,
            enrolled: Some(true),
            was_canceled: Some(false),
        }])
    }
}

/// Lifecycle stub with fixed outcomes per course id.
struct StubLifecycle {
    open_course: CourseId,
    started_course: CourseId,
}

#[async_trait]
impl EnrollmentLifecycle for StubLifecycle {
    async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<Enrollment, Error> {
        if course_id == self.open_course {
            Ok(enrollment(user_id, course_id))
        } else if course_id == self.started_course {
            Err(Error::conflict("course already started"))
        } else {
            Err(Error::not_found("course not found"))
        }
    }

    async fn cancel(&self, user_id: UserId, course_id: CourseId) -> Result<Enrollment, Error> {
        if course_id == self.open_course {
            Ok(enrollment(user_id, course_id))
        } else if course_id == self.started_course {
            Err(Error::conflict("course already started"))
        } else {
            Err(Error::not_found("enrollment not found"))
        }
    }
}

struct Fixture {
    state: HttpState,
    tokens: Arc<JwtTokenCodec>,
    user_id: UserId,
    open_course: CourseId,
    started_course: CourseId,
}

fn fixture() -> Fixture {
    let tokens = Arc::new(JwtTokenCodec::new(SECRET, Arc::new(FixedClock(now()))));
    let user_id = UserId::random();
    let open = course("Intro to Rust", 10);
    let started = course("Systems Archaeology", -10);
    Fixture {
        state: HttpState::new(
            Arc::new(StubAccounts {
                user_id,
                tokens: tokens.clone(),
            }),
            Arc::new(StubCatalog {
                open_course: open.clone(),
            }),
            Arc::new(StubLifecycle {
                open_course: open.id(),
                started_course: started.id(),
            }),
            tokens.clone(),
            false,
        ),
        tokens,
        user_id,
        open_course: open.id(),
        started_course: started.id(),
    }
}

macro_rules! spawn_app {
    ($fixture:expr) => {
        test::init_service(
            App::new().app_data(web::Data::new($fixture.state.clone())).service(
                web::scope("/api/v1")
                    .service(register)
                    .service(login)
                    .service(enrolled_courses)
                    .service(list_courses)
                    .service(create_course)
                    .service(enroll)
                    .service(cancel_enrollment),
            ),
        )
        .await
    };
}

fn bearer(fixture: &Fixture) -> String {
    let token = fixture.tokens.issue(fixture.user_id).expect("token issues");
    format!("Bearer {}", token.as_str())
}

#[rstest]
#[actix_rt::test]
async fn register_returns_the_user_without_credentials() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "name": "Ana Silva",
            "email": "Ana@Example.com",
            "password": PASSWORD,
            "birthdate": "1990-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Ana Silva");
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["birthdate"], "1990-01-01");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[rstest]
#[actix_rt::test]
async fn duplicate_email_registers_as_bad_request() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "name": "Ana Silva",
            "email": "taken@example.com",
            "password": PASSWORD,
            "birthdate": "1990-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[actix_rt::test]
async fn login_issues_a_verifiable_token_and_http_only_cookie() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "ana@example.com", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "token")
        .expect("token cookie set");
    assert_eq!(cookie.http_only(), Some(true));

    let body: Value = test::read_body_json(resp).await;
    let raw = body["token"].as_str().expect("token in body");
    assert_eq!(fixture.tokens.verify(raw).expect("verifies"), fixture.user_id);
}

#[rstest]
#[actix_rt::test]
async fn wrong_password_is_a_bad_request() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "ana@example.com", "password": "guess" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_rt::test]
async fn protected_routes_reject_anonymous_requests() {
    let fixture = fixture();
    let app = spawn_app!(fixture);
    let enroll_uri = format!("/api/v1/courses/{}/enrollment", fixture.open_course);

    for req in [
        test::TestRequest::post().uri(&enroll_uri).to_request(),
        test::TestRequest::delete().uri(&enroll_uri).to_request(),
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .set_json(json!({ "name": "New", "startsOn": "2099-01-01" }))
            .to_request(),
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/courses", fixture.user_id))
            .to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}

#[rstest]
#[actix_rt::test]
async fn a_bad_header_is_not_rescued_by_a_valid_cookie() {
    let fixture = fixture();
    let app = spawn_app!(fixture);
    let valid = fixture.tokens.issue(fixture.user_id).expect("token issues");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/courses/{}/enrollment", fixture.open_course))
        .insert_header((header::AUTHORIZATION, "Bearer forged"))
        .cookie(actix_web::cookie::Cookie::new("token", valid.as_str().to_owned()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_rt::test]
async fn the_query_token_authenticates_as_a_last_resort() {
    let fixture = fixture();
    let app = spawn_app!(fixture);
    let token = fixture.tokens.issue(fixture.user_id).expect("token issues");

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/courses/{}/enrollment?token={}",
            fixture.open_course,
            token.as_str()
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[rstest]
#[actix_rt::test]
async fn enroll_and_cancel_confirm_with_messages() {
    let fixture = fixture();
    let app = spawn_app!(fixture);
    let uri = format!("/api/v1/courses/{}/enrollment", fixture.open_course);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, bearer(&fixture)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "enrollment confirmed");

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, bearer(&fixture)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "enrollment canceled");
}

#[rstest]
#[actix_rt::test]
async fn lifecycle_errors_map_to_statuses() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let missing = CourseId::random();
    let cases = [
        ("POST", missing, StatusCode::NOT_FOUND, "not_found"),
        ("POST", fixture.started_course, StatusCode::BAD_REQUEST, "conflict"),
        ("DELETE", missing, StatusCode::NOT_FOUND, "not_found"),
        ("DELETE", fixture.started_course, StatusCode::BAD_REQUEST, "conflict"),
    ];
    for (method, course_id, status, code) in cases {
        let uri = format!("/api/v1/courses/{course_id}/enrollment");
        let builder = match method {
            "POST" => test::TestRequest::post(),
            _ => test::TestRequest::delete(),
        };
        let resp = test::call_service(
            &app,
            builder
                .uri(&uri)
                .insert_header((header::AUTHORIZATION, bearer(&fixture)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), status);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], code);
    }
}

#[rstest]
#[actix_rt::test]
async fn enrollment_history_is_private_to_its_owner() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/courses", UserId::random()))
            .insert_header((header::AUTHORIZATION, bearer(&fixture)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/courses", fixture.user_id))
            .insert_header((header::AUTHORIZATION, bearer(&fixture)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["enrolled"], true);
}

#[rstest]
#[actix_rt::test]
async fn anonymous_listings_carry_counts_but_no_flags() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/courses").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["activeEnrollments"], 3);
    assert!(body[0].get("enrolled").is_none());
    assert!(body[0].get("wasCanceled").is_none());
}

#[rstest]
#[actix_rt::test]
async fn authenticated_listings_carry_enrollment_flags() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/courses")
            .insert_header((header::AUTHORIZATION, bearer(&fixture)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["enrolled"], false);
    assert_eq!(body[0]["wasCanceled"], false);
}

#[rstest]
#[actix_rt::test]
async fn the_user_id_query_parameter_personalises_a_listing() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/courses?userId={}", fixture.user_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["enrolled"], false);
}

#[rstest]
#[actix_rt::test]
async fn course_creation_requires_a_credential_and_echoes_the_course() {
    let fixture = fixture();
    let app = spawn_app!(fixture);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header((header::AUTHORIZATION, bearer(&fixture)))
            .set_json(json!({
                "name": "Distributed Systems",
                "description": "consensus and friends",
                "startsOn": "2099-03-01"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Distributed Systems");
    assert_eq!(body["startsOn"], "2099-03-01");
}

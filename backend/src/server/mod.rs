//! Server construction and wiring.
//!
//! Builds the dependency graph (pool, repositories, domain services), runs
//! pending migrations, optionally seeds the demo catalogue, and starts the
//! Actix server.

mod config;

pub use config::{BuildMode, ConfigError, ServerConfig};

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use mockable::DefaultClock;
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi as _;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::{
    AccountService, CourseCatalogService, DemoCourseSeeder, EnrollmentService,
};
use crate::inbound::http::courses::{cancel_enrollment, create_course, enroll, list_courses};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{enrolled_courses, login, register};
use crate::outbound::persistence::{
    DbPool, DieselCourseRepository, DieselEnrollmentRepository, DieselUserRepository, PoolConfig,
};
use crate::outbound::{Argon2PasswordHasher, JwtTokenCodec};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run pending migrations against the configured database.
///
/// Uses a dedicated synchronous connection; migrations happen once at
/// startup before the async pool is built.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    info!(count = applied.len(), "migrations applied");
    Ok(())
}

/// Wire the domain services over Diesel-backed repositories.
fn build_http_state(pool: &DbPool, config: &ServerConfig) -> HttpState {
    let clock = Arc::new(DefaultClock);
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let courses = Arc::new(DieselCourseRepository::new(pool.clone()));
    let enrollments = Arc::new(DieselEnrollmentRepository::new(pool.clone()));
    let tokens = Arc::new(JwtTokenCodec::new(&config.jwt_secret, clock.clone()));

    let accounts = AccountService::new(
        users,
        Arc::new(Argon2PasswordHasher),
        tokens.clone(),
        clock.clone(),
    );
    let catalog = CourseCatalogService::new(courses.clone(), enrollments.clone(), clock.clone());
    let lifecycle = EnrollmentService::new(courses, enrollments, clock, config.cancellation);

    HttpState::new(
        Arc::new(accounts),
        Arc::new(catalog),
        Arc::new(lifecycle),
        tokens,
        config.cookie_secure,
    )
}

/// Start the HTTP server and block until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let database_url = config.database_url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))??;

    let pool = DbPool::new(PoolConfig::new(
        &config.database_url,
        config.db_pool_size,
        config.db_connect_timeout,
    ))
    .await
    .map_err(std::io::Error::other)?;

    if config.seed_demo_courses {
        let seeder = DemoCourseSeeder::new(
            Arc::new(DieselCourseRepository::new(pool.clone())),
            Arc::new(DefaultClock),
        );
        seeder.run().await.map_err(std::io::Error::other)?;
    }

    let http_state = web::Data::new(build_http_state(&pool, &config));
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(http_state.clone())
            .app_data(server_health_state.clone())
            .service(ready)
            .service(live)
            .service(
                web::scope("/api/v1")
                    .service(register)
                    .service(login)
                    .service(enrolled_courses)
                    .service(list_courses)
                    .service(create_course)
                    .service(enroll)
                    .service(cancel_enrollment),
            );

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-doc/openapi.json", crate::ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?;

    info!(addr = %config.bind_addr, "server listening");
    health_state.mark_ready();
    server.run().await
}

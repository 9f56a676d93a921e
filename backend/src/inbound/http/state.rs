//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{Accounts, CourseCatalog, EnrollmentLifecycle, TokenCodec};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub catalog: Arc<dyn CourseCatalog>,
    pub lifecycle: Arc<dyn EnrollmentLifecycle>,
    pub tokens: Arc<dyn TokenCodec>,
    /// Whether the login cookie carries the `Secure` attribute. Off in local
    /// development where the server speaks plain HTTP.
    pub cookie_secure: bool,
}

impl HttpState {
    /// Bundle the driving ports and the token codec for handler injection.
    pub fn new(
        accounts: Arc<dyn Accounts>,
        catalog: Arc<dyn CourseCatalog>,
        lifecycle: Arc<dyn EnrollmentLifecycle>,
        tokens: Arc<dyn TokenCodec>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            accounts,
            catalog,
            lifecycle,
            tokens,
            cookie_secure,
        }
    }
}

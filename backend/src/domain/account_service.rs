//! Registration and login services.
//!
//! Password handling is delegated entirely to the hasher port; the service
//! only sees opaque PHC strings. Login failures deliberately collapse to a
//! single message so callers cannot probe which emails are registered.

use std::sync::Arc;

use mockable::Clock;

use super::ports::{
    AccessToken, Accounts, LoginRequest, PasswordHasher, RegistrationRequest, TokenCodec,
    TokenError, UserPersistenceError, UserRepository,
};
use super::user::{EmailAddress, PersonName, User, UserDraft, UserId};
use super::Error;
use async_trait::async_trait;

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => {
            Error::conflict("email address is already registered")
        }
    }
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Issue { message } => Error::internal(format!("token issuance failed: {message}")),
        TokenError::Invalid => Error::forbidden("token is invalid"),
    }
}

/// Account service implementing the [`Accounts`] driving port.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Create a new service over the identity store and credential ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

#[async_trait]
impl Accounts for AccountService {
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        let name = PersonName::new(request.name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let email = EmailAddress::new(&request.email)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if request.password.chars().count() < PASSWORD_MIN {
            return Err(Error::invalid_request(format!(
                "password must have at least {PASSWORD_MIN} characters"
            )));
        }

        // The unique constraint is the real guard; this pre-check just gives
        // the common case a clean error without a failed insert.
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            return Err(Error::conflict("email address is already registered"));
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(|err| Error::internal(err.to_string()))?;

        let user = User::new(UserDraft {
            id: UserId::random(),
            name,
            email,
            password_hash,
            birthdate: request.birthdate,
            created_at: self.clock.utc(),
        })
        .map_err(|err| Error::internal(format!("constructed invalid user: {err}")))?;

        self.users
            .insert(&user)
            .await
            .map_err(map_user_persistence_error)?;

        Ok(user)
    }

    async fn login(&self, request: LoginRequest) -> Result<AccessToken, Error> {
        let email = EmailAddress::new(&request.email)
            .map_err(|_| Error::invalid_request(INVALID_CREDENTIALS))?;

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::invalid_request(INVALID_CREDENTIALS))?;

        let matches = self
            .hasher
            .verify(&request.password, user.password_hash())
            .map_err(|err| Error::internal(err.to_string()))?;
        if !matches {
            return Err(Error::invalid_request(INVALID_CREDENTIALS));
        }

        self.tokens.issue(user.id()).map_err(map_token_error)
    }
}

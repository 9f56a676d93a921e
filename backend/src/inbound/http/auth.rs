//! Request authentication extractor.
//!
//! A credential can arrive three ways; precedence is fixed and documented
//! here once: bearer `Authorization` header, then `token` cookie, then
//! `token` query parameter. The first credential found is the one verified;
//! a bad header is not rescued by a valid cookie. Missing or invalid
//! credentials yield `403 Forbidden`.

use actix_web::http::header;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::Deserialize;

use crate::domain::{Error, UserId};

use super::state::HttpState;

const TOKEN_COOKIE: &str = "token";

/// The authenticated user resolved from the request credential.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(UserId);

impl CurrentUser {
    /// The token's subject.
    pub fn id(&self) -> UserId {
        self.0
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_header(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|raw| raw.trim().to_owned())
}

fn token_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(TOKEN_COOKIE).map(|c| c.value().to_owned())
}

fn token_query(req: &HttpRequest) -> Option<String> {
    web::Query::<TokenQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().token)
}

/// Extract the raw credential in precedence order.
fn raw_credential(req: &HttpRequest) -> Option<String> {
    bearer_header(req)
        .or_else(|| token_cookie(req))
        .or_else(|| token_query(req))
}

fn resolve(req: &HttpRequest) -> Result<CurrentUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not configured"))?;
    let raw = raw_credential(req).ok_or_else(|| Error::forbidden("authentication required"))?;
    let user_id = state
        .tokens
        .verify(&raw)
        .map_err(|_| Error::forbidden("token is invalid"))?;
    Ok(CurrentUser(user_id))
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

/// Optional authentication: anonymous requests pass through as `None`, but a
/// presented credential must still be valid.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(Option<UserId>);

impl MaybeUser {
    /// The token's subject, when a credential was presented.
    pub fn id(&self) -> Option<UserId> {
        self.0
    }
}

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if raw_credential(req).is_none() {
            return ready(Ok(Self(None)));
        }
        ready(resolve(req).map(|user| Self(Some(user.id()))))
    }
}

//! HS256 JWT adapter for the token codec port.
//!
//! Tokens carry the user id as `sub` and expire one hour after issue. Any
//! verification failure (bad signature, expiry, malformed subject) collapses
//! to `TokenError::Invalid` so callers cannot distinguish forged tokens from
//! stale ones.

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::ports::{AccessToken, TokenCodec, TokenError};
use crate::domain::UserId;

/// Token lifetime from issue to expiry.
const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// JWT-backed implementation of the token codec port.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    /// Create a codec signing with the given shared secret.
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, user_id: UserId) -> Result<AccessToken, TokenError> {
        let expires_at = self.clock.utc() + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::issue(err.to_string()))
    }

    fn verify(&self, raw: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(raw, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;
        UserId::parse(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, Utc};
    use rstest::rstest;

    use super::*;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn codec(secret: &str) -> JwtTokenCodec {
        JwtTokenCodec::new(secret, Arc::new(FixedClock(Utc::now())))
    }

    #[rstest]
    fn issued_tokens_verify_back_to_the_subject() {
        let codec = codec("test-secret");
        let user = UserId::random();

        let token = codec.issue(user).expect("issues");
        assert_eq!(codec.verify(token.as_str()).expect("verifies"), user);
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = codec("first-secret")
            .issue(UserId::random())
            .expect("issues");
        let err = codec("second-secret")
            .verify(token.as_str())
            .expect_err("wrong key");
        assert_eq!(err, TokenError::Invalid);
    }

    #[rstest]
    fn expired_tokens_are_rejected() {
        let past = Utc::now() - Duration::hours(2);
        let codec = JwtTokenCodec::new("test-secret", Arc::new(FixedClock(past)));
        let token = codec.issue(UserId::random()).expect("issues");

        let err = codec.verify(token.as_str()).expect_err("expired");
        assert_eq!(err, TokenError::Invalid);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-jwt")]
    #[case("a.b.c")]
    fn malformed_tokens_are_rejected(#[case] raw: &str) {
        let err = codec("test-secret").verify(raw).expect_err("malformed");
        assert_eq!(err, TokenError::Invalid);
    }
}

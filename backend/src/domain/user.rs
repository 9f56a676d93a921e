//! User identity model.
//!
//! Users are created at registration and never deleted. The password hash is
//! an opaque PHC string produced by the hasher port; the domain never
//! inspects it.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    NameTooShort { min: usize },
    InvalidEmail,
    EmptyPasswordHash,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::NameTooShort { min } => {
                write!(f, "name must have at least {min} characters")
            }
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyPasswordHash => write!(f, "password hash must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn parse(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Minimum allowed length for a user name.
pub const NAME_MIN: usize = 3;

/// Registered name of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a [`PersonName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().chars().count() < NAME_MIN {
            return Err(UserValidationError::NameTooShort { min: NAME_MIN });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Syntax check only; deliverability is out of scope.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated, lowercase email address.
///
/// Lowercasing happens at construction so the database unique constraint on
/// the column is effectively case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let email = email.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: PersonName,
    email: EmailAddress,
    password_hash: String,
    birthdate: NaiveDate,
    created_at: DateTime<Utc>,
}

/// Field bundle for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub name: PersonName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Construct a user from validated parts.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        if draft.password_hash.trim().is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self {
            id: draft.id,
            name: draft.name,
            email: draft.email,
            password_hash: draft.password_hash,
            birthdate: draft.birthdate,
            created_at: draft.created_at,
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Registered name.
    pub fn name(&self) -> &PersonName {
        &self.name
    }

    /// Lowercase email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Opaque PHC password hash.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Date of birth.
    pub fn birthdate(&self) -> NaiveDate {
        self.birthdate
    }

    /// Registration timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ana@example.com")]
    #[case("a.b+tag@sub.domain.org")]
    fn email_accepts_valid_addresses(#[case] raw: &str) {
        let email = EmailAddress::new(raw).expect("valid email");
        assert_eq!(email.as_ref(), raw);
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign.example.com")]
    #[case("two@@example.com")]
    #[case("spaces in@example.com")]
    #[case("missing-tld@example")]
    fn email_rejects_invalid_addresses(#[case] raw: &str) {
        let err = EmailAddress::new(raw).expect_err("invalid email");
        assert_eq!(err, UserValidationError::InvalidEmail);
    }

    #[rstest]
    fn email_is_lowercased() {
        let email = EmailAddress::new("Ana.Silva@Example.COM").expect("valid email");
        assert_eq!(email.as_ref(), "ana.silva@example.com");
    }

    #[rstest]
    #[case("")]
    #[case("ab")]
    #[case("  a  ")]
    fn name_rejects_short_input(#[case] raw: &str) {
        let err = PersonName::new(raw).expect_err("short name");
        assert_eq!(err, UserValidationError::NameTooShort { min: NAME_MIN });
    }

    #[rstest]
    fn user_rejects_blank_password_hash() {
        let draft = UserDraft {
            id: UserId::random(),
            name: PersonName::new("Ana Silva").expect("valid name"),
            email: EmailAddress::new("ana@example.com").expect("valid email"),
            password_hash: "   ".into(),
            birthdate: NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
            created_at: Utc::now(),
        };
        let err = User::new(draft).expect_err("blank hash");
        assert_eq!(err, UserValidationError::EmptyPasswordHash);
    }

    #[rstest]
    fn user_id_parse_rejects_garbage() {
        assert_eq!(
            UserId::parse("not-a-uuid").expect_err("invalid id"),
            UserValidationError::InvalidId
        );
    }
}

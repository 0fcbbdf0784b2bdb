use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of an authenticated user. Hosts use either numeric
/// primary keys or opaque strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Str(String),
}

impl UserId {
    /// Mirrors a truthiness check: `0` and `""` do not identify anyone.
    pub fn is_blank(&self) -> bool {
        match self {
            UserId::Int(n) => *n == 0,
            UserId::Str(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Int(n) => write!(f, "{n}"),
            UserId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        UserId::Int(n)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::Str(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId::Str(s)
    }
}

/// An authenticated user as the host application knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    /// Primary name accessor.
    #[serde(default)]
    pub username: Option<String>,
    /// Secondary name accessor, used when `username` is unavailable
    /// (for hosts whose login field is not called username).
    #[serde(default)]
    pub login: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<UserId>, date_joined: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            email: None,
            username: None,
            login: None,
            date_joined,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        self.username.as_deref().or(self.login.as_deref())
    }
}

/// Who is looking at the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Visitor {
    Authenticated(User),
    Anonymous,
}

impl Visitor {
    pub fn user(&self) -> Option<&User> {
        match self {
            Visitor::Authenticated(u) => Some(u),
            Visitor::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Visitor::Authenticated(_))
    }
}

/// The per-request slice of host state the resolver needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    /// `None` when no auth layer attached a user at all.
    pub visitor: Option<Visitor>,
    pub session_key: Option<String>,
}

impl RequestContext {
    pub fn authenticated(user: User) -> Self {
        Self {
            visitor: Some(Visitor::Authenticated(user)),
            session_key: None,
        }
    }

    pub fn anonymous(session_key: Option<String>) -> Self {
        Self {
            visitor: Some(Visitor::Anonymous),
            session_key,
        }
    }

    pub fn with_session(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    pub fn user(&self) -> Option<&User> {
        self.visitor.as_ref().and_then(Visitor::user)
    }
}

/// What a template render hands over; the request may be missing entirely
/// (e.g. error pages rendered outside a request cycle).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    pub request: Option<RequestContext>,
}

impl TemplateContext {
    pub fn new(request: RequestContext) -> Self {
        Self {
            request: Some(request),
        }
    }

    pub fn without_request() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn joined() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn display_name_falls_back_to_login() {
        let u = User::new(1, joined()).with_login("jdoe@example.com");
        assert_eq!(u.display_name(), Some("jdoe@example.com"));
        let u = u.with_username("jdoe");
        assert_eq!(u.display_name(), Some("jdoe"));
    }

    #[test]
    fn user_id_accepts_numbers_and_strings() {
        let a: UserId = serde_json::from_str("42").unwrap();
        let b: UserId = serde_json::from_str("\"u-42\"").unwrap();
        assert_eq!(a, UserId::Int(42));
        assert_eq!(b.to_string(), "u-42");
        assert!(UserId::Int(0).is_blank());
        assert!(!UserId::from("x").is_blank());
    }

    #[test]
    fn user_deserializes_with_optional_fields() {
        let u: User = serde_json::from_str(
            r#"{"id": 7, "date_joined": "2020-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(u.id, UserId::Int(7));
        assert_eq!(u.date_joined, joined());
        assert!(u.email.is_none());
    }
}

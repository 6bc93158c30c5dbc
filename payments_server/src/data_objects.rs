use chrono::{DateTime, Utc};
use log::error;
use payments_engine::db_types::Account;
use serde::{Deserialize, Serialize};

/// The uniform wrapper for every JSON response body.
///
/// All three keys are always present. On failure `data` is `null`, `links` is empty and `errors` says what went
/// wrong. On success `errors` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub errors: Vec<String>,
    pub links: Vec<Link>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self { data: Some(data), errors: vec![], links: vec![] }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self { data: None, errors, links: vec![] }
    }

    pub fn with_self_link<S: Into<String>>(mut self, href: S) -> Self {
        self.links.push(Link::self_link(href));
        self
    }
}

impl<T: Serialize> Envelope<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("💻️ Could not serialize response envelope. {e}");
            r#"{"data":null,"errors":["Internal server error"],"links":[]}"#.to_string()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn self_link<S: Into<String>>(href: S) -> Self {
        Self { rel: "self".to_string(), href: href.into() }
    }
}

/// The request body for both registration and login.
///
/// Missing fields decode as empty strings, so that they are reported by the field checks rather than as a
/// malformed document. The handlers treat a `null` body the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// What a client gets back after registering or logging in. The password field is always blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuthenticatedAccount {
    pub fn new(account: Account, token: String) -> Self {
        Self {
            id: account.id,
            email: account.email,
            password: String::new(),
            token,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

const MAX_USERNAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 8;

/// User entity - an account that can author posts.
///
/// `email` and `password_hash` never leave the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamp.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }
}

/// Signup input after structural validation, password still in plain text.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Validate signup fields before any persistence access.
    pub fn parse(username: &str, email: &str, password: &str) -> Result<Self, DomainError> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "Username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        if email.is_empty() {
            return Err(DomainError::validation("Email is required"));
        }
        if email.len() > MAX_EMAIL_LEN || !looks_like_email(email) {
            return Err(DomainError::validation("Invalid email address"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{Error, FieldViolation};
use crate::user::password::{hash_password, verify_password};
use crate::user::validate::validate_fields;

/// User record in the database. `email` is the login identifier;
/// `username` is the unique display handle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>, // Argon2 hash, not exposed in JSON
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: OffsetDateTime, // set once at creation
}

/// Fields accepted at account creation beyond email and password.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    /// Build an unsaved record with default flags and a fresh id.
    /// Records reach callers only through the manager.
    pub(crate) fn new(email: String, fields: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username: fields.username,
            first_name: fields.first_name,
            last_name: fields.last_name,
            password_hash: None,
            is_staff: false,
            is_active: true,
            is_superuser: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Replace the stored credential with a salted one-way hash.
    pub fn set_password(&mut self, plain: &str) -> Result<(), Error> {
        self.password_hash = Some(hash_password(plain)?);
        Ok(())
    }

    /// True iff `candidate` matches the stored credential. False when no
    /// password has ever been set.
    pub fn check_password(&self, candidate: &str) -> bool {
        match &self.password_hash {
            Some(hash) => verify_password(candidate, hash),
            None => false,
        }
    }

    pub fn has_usable_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Run the field-format rules over this record.
    pub fn validate(&self) -> Vec<FieldViolation> {
        validate_fields(&[
            ("username", &self.username),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
        ])
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

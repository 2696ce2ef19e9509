use thiserror::Error;

/// A single field that failed its format constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A required creation argument was missing or empty.
    #[error("{0}")]
    InvalidArgument(String),

    /// One or more fields failed their format constraint.
    #[error("validation failed: {}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// `email` or `username` is already taken by another account.
    #[error("{field} is already taken")]
    UniquenessViolation { field: &'static str },

    // argon2 errors do not implement std::error::Error, so the message
    // is carried as a string.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_each_offending_field() {
        let err = Error::Validation(vec![
            FieldViolation {
                field: "username",
                message: "Only alphanumeric characters are allowed.".into(),
            },
            FieldViolation {
                field: "first_name",
                message: "Only letters are allowed.".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("username"));
        assert!(msg.contains("first_name"));
    }

    #[test]
    fn uniqueness_error_names_the_field() {
        let err = Error::UniquenessViolation { field: "email" };
        assert_eq!(err.to_string(), "email is already taken");
    }
}

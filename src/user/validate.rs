use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldViolation;

lazy_static! {
    static ref ALPHANUMERIC: Regex = Regex::new(r"^[0-9a-zA-Z]*$").unwrap();
    static ref LETTERS_ONLY: Regex = Regex::new(r"^[a-zA-Z ]*$").unwrap();
    static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

struct FieldRule {
    pattern: &'static Regex,
    message: &'static str,
    max_len: usize,
}

fn rule_for(field: &str) -> Option<FieldRule> {
    match field {
        "username" => Some(FieldRule {
            pattern: &ALPHANUMERIC,
            message: "Only alphanumeric characters are allowed.",
            max_len: 100,
        }),
        "first_name" | "last_name" => Some(FieldRule {
            pattern: &LETTERS_ONLY,
            message: "Only letters are allowed.",
            max_len: 128,
        }),
        "email" => Some(FieldRule {
            pattern: &EMAIL,
            message: "Enter a valid email address.",
            max_len: 254,
        }),
        _ => None,
    }
}

/// Check each `(field, value)` pair against the rule table, collecting
/// every violation instead of stopping at the first.
pub fn validate_fields(fields: &[(&'static str, &str)]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for &(field, value) in fields {
        let Some(rule) = rule_for(field) else {
            continue;
        };
        if value.chars().count() > rule.max_len {
            violations.push(FieldViolation {
                field,
                message: format!("Longer than {} characters.", rule.max_len),
            });
            continue;
        }
        if !rule.pattern.is_match(value) {
            violations.push(FieldViolation {
                field,
                message: rule.message.to_string(),
            });
        }
    }
    violations
}

/// Canonicalize an email address: lower-case the domain portion, leave
/// the local part untouched. Splits on the last `@`; an input without
/// one passes through unchanged.
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

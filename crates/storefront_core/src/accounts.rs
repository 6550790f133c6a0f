//! crates/storefront_core/src/accounts.rs
//!
//! Signup form policy. Uniqueness of the username is left to the account
//! store, which reports a taken name as a `Conflict`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
const EMAIL_MAX_LEN: usize = 254;
const MAX_SIMILARITY: f64 = 0.7;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("static username pattern"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwertyuiop", "qwerty123", "iloveyou", "sunshine", "princess", "football", "baseball",
    "welcome1", "superman", "trustno1", "letmein1", "abc12345", "passw0rd", "starwars",
    "whatever", "dragon123", "azertyuiop", "motdepasse",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// A signup that passed every form rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Per-field error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignupErrors {
    pub username: Vec<String>,
    pub email: Vec<String>,
    pub password1: Vec<String>,
    pub password2: Vec<String>,
}

impl SignupErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
            && self.email.is_empty()
            && self.password1.is_empty()
            && self.password2.is_empty()
    }

    pub fn username_taken() -> Self {
        Self {
            username: vec!["A user with that username already exists.".to_string()],
            ..Self::default()
        }
    }
}

impl SignupForm {
    pub fn validate(&self) -> Result<ValidSignup, SignupErrors> {
        let username = self.username.trim();
        let email = self.email.trim();
        let mut errors = SignupErrors::default();

        if username.is_empty() {
            errors.username.push("This field is required.".to_string());
        } else {
            if username.chars().count() > USERNAME_MAX_LEN {
                errors.username.push(format!(
                    "Ensure this value has at most {} characters.",
                    USERNAME_MAX_LEN
                ));
            }
            if !USERNAME_RE.is_match(username) {
                errors.username.push(
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                        .to_string(),
                );
            }
        }

        if email.is_empty() {
            errors.email.push("This field is required.".to_string());
        } else if email.len() > EMAIL_MAX_LEN || !EMAIL_RE.is_match(email) {
            errors.email.push("Enter a valid email address.".to_string());
        }

        if self.password1.is_empty() {
            errors.password1.push("This field is required.".to_string());
        }
        if self.password2.is_empty() {
            errors.password2.push("This field is required.".to_string());
        } else if !self.password1.is_empty() {
            if self.password1 != self.password2 {
                errors
                    .password2
                    .push("The two password fields didn't match.".to_string());
            } else {
                errors
                    .password2
                    .extend(password_problems(&self.password2, username, email));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidSignup {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password1.clone(),
        })
    }
}

/// Strength rules applied to an otherwise acceptable password.
fn password_problems(password: &str, username: &str, email: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let lowered = password.to_lowercase();

    let local_part = email.split('@').next().unwrap_or_default();
    let similar_to = [("username", username), ("email address", local_part)]
        .into_iter()
        .filter(|(_, attr)| !attr.is_empty())
        .find(|(_, attr)| {
            strsim::normalized_levenshtein(&lowered, &attr.to_lowercase()) >= MAX_SIMILARITY
        });
    if let Some((label, _)) = similar_to {
        problems.push(format!("The password is too similar to the {}.", label));
    }

    if password.chars().count() < PASSWORD_MIN_LEN {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LEN
        ));
    }
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password1: &str, password2: &str) -> SignupForm {
        SignupForm {
            username: username.to_string(),
            email: email.to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn accepts_a_reasonable_signup() {
        let valid = form(" reader_1 ", "reader@example.com", "c0rrect-h0rse", "c0rrect-h0rse")
            .validate()
            .unwrap();
        assert_eq!(valid.username, "reader_1");
        assert_eq!(valid.email, "reader@example.com");
        assert_eq!(valid.password, "c0rrect-h0rse");
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = SignupForm::default().validate().unwrap_err();
        assert_eq!(errors.username.len(), 1);
        assert_eq!(errors.email.len(), 1);
        assert_eq!(errors.password1.len(), 1);
        assert_eq!(errors.password2.len(), 1);
    }

    #[test]
    fn rejects_bad_username_characters_and_email() {
        let errors = form("no spaces!", "not-an-email", "c0rrect-h0rse", "c0rrect-h0rse")
            .validate()
            .unwrap_err();
        assert_eq!(errors.username.len(), 1);
        assert_eq!(errors.email, vec!["Enter a valid email address.".to_string()]);
    }

    #[test]
    fn rejects_mismatched_passwords() {
        let errors = form("reader", "r@example.com", "c0rrect-h0rse", "c0rrect-h0rsE")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.password2,
            vec!["The two password fields didn't match.".to_string()]
        );
    }

    #[test]
    fn rejects_weak_passwords() {
        let errors = form("reader", "r@example.com", "1234567", "1234567")
            .validate()
            .unwrap_err();
        assert!(errors.password2.iter().any(|e| e.contains("too short")));
        assert!(errors.password2.iter().any(|e| e.contains("entirely numeric")));

        let errors = form("reader", "r@example.com", "Password", "Password")
            .validate()
            .unwrap_err();
        assert!(errors.password2.iter().any(|e| e.contains("too common")));

        let errors = form("bookworm42", "r@example.com", "bookworm43", "bookworm43")
            .validate()
            .unwrap_err();
        assert!(errors.password2.iter().any(|e| e.contains("too similar")));
    }

    #[test]
    fn username_length_is_bounded() {
        let long = "a".repeat(USERNAME_MAX_LEN + 1);
        let errors = form(&long, "r@example.com", "c0rrect-h0rse", "c0rrect-h0rse")
            .validate()
            .unwrap_err();
        assert_eq!(errors.username.len(), 1);
    }
}

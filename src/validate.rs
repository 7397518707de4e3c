use crate::error::ValidationError;
use crate::network::{User, UserId};

/// How thoroughly user fields are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStrategy {
    /// Only rejects empty fields.
    #[default]
    Quick,
    /// Capitalised alphabetic names and a `local@domain.tld` email.
    Strict,
}

pub fn validate_user(user: &User, strategy: ValidationStrategy) -> Result<(), ValidationError> {
    let mut messages = Vec::new();
    match strategy {
        ValidationStrategy::Quick => {
            check_present("First name", &user.first_name, &mut messages);
            check_present("Last name", &user.last_name, &mut messages);
            check_present("Email", &user.email, &mut messages);
        }
        ValidationStrategy::Strict => {
            check_name("First name", &user.first_name, &mut messages);
            check_name("Last name", &user.last_name, &mut messages);
            check_email(&user.email, &mut messages);
        }
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { messages })
    }
}

pub fn validate_friendship(a: UserId, b: UserId) -> Result<(), ValidationError> {
    if a == b {
        return Err(ValidationError {
            messages: vec!["A user cannot befriend themselves.".to_string()],
        });
    }
    Ok(())
}

fn check_present(field: &str, value: &str, messages: &mut Vec<String>) -> bool {
    if value.trim().is_empty() {
        messages.push(format!("{} cannot be empty.", field));
        return false;
    }
    true
}

fn check_name(field: &str, value: &str, messages: &mut Vec<String>) {
    if !check_present(field, value, messages) {
        return;
    }
    let mut chars = value.chars();
    let first = chars.next();
    if value.chars().count() < 2 {
        messages.push(format!("{} must have at least 2 letters.", field));
    } else if !first.is_some_and(|c| c.is_ascii_uppercase()) {
        messages.push(format!("{} must start with an uppercase letter.", field));
    } else if !chars.all(|c| c.is_ascii_lowercase()) {
        messages.push(format!("{} must contain only letters after the first.", field));
    }
}

fn check_email(value: &str, messages: &mut Vec<String>) {
    if !check_present("Email", value, messages) {
        return;
    }
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.contains('@') => {
            let labels: Vec<&str> = domain.split('.').collect();
            if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
                messages.push("Email domain is not valid.".to_string());
            }
        }
        _ => messages.push("Email format is not valid.".to_string()),
    }
}

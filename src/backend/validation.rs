use crate::backend::model::Account;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Username,
    Password,
    FullName,
    Email,
    BirthDate,
    CellPhone,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Username,
        Field::Password,
        Field::FullName,
        Field::Email,
        Field::BirthDate,
        Field::CellPhone,
    ];

    /// Key used by the accounts API for this field.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Password => "password",
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::BirthDate => "birthDate",
            Field::CellPhone => "cellPhone",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }
}

/// One message per editable field; an empty string means the field is valid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors {
    messages: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn get(&self, field: Field) -> &str {
        self.messages.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        let message = message.into();
        if message.is_empty() {
            self.messages.remove(&field);
        } else {
            self.messages.insert(field, message);
        }
    }

    pub fn clear(&mut self, field: Field) {
        self.messages.remove(&field);
    }

    #[cfg(test)]
    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Merges errors reported by the server, keyed by wire name. Unknown keys are dropped.
    pub fn merge_wire(&mut self, errors: &BTreeMap<String, String>) {
        for (name, message) in errors {
            match Field::from_wire_name(name) {
                Some(field) => self.set(field, message.clone()),
                None => tracing::debug!("Ignoring server error for unknown field {}", name),
            }
        }
    }
}

/// Writes `value` into the draft and sets or clears the field's error.
pub fn validate_field(draft: &mut Account, errors: &mut ValidationErrors, value: &str, field: Field) {
    let today = Utc::now().date_naive();
    match check(field, value, today) {
        Some(message) => errors.set(field, message),
        None => errors.clear(field),
    }

    let optional = |v: &str| if v.is_empty() { None } else { Some(v.to_string()) };
    match field {
        Field::Username => draft.username = value.to_string(),
        Field::Password => draft.password = value.to_string(),
        Field::FullName => draft.full_name = value.to_string(),
        Field::Email => draft.email = value.to_string(),
        Field::BirthDate => draft.birth_date = optional(value),
        Field::CellPhone => draft.cell_phone = optional(value),
    }
}

fn check(field: Field, value: &str, today: NaiveDate) -> Option<&'static str> {
    match field {
        Field::Username => {
            let len = value.chars().count();
            let allowed = value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
            (!(3..=20).contains(&len) || !allowed)
                .then_some("Username must be 3-20 letters, digits, dots or underscores")
        }
        Field::Password => {
            if value.is_empty() {
                return None;
            }
            let long_enough = value.chars().count() >= 8;
            let has_letter = value.chars().any(|c| c.is_alphabetic());
            let has_digit = value.chars().any(|c| c.is_ascii_digit());
            (!(long_enough && has_letter && has_digit))
                .then_some("Password must have at least 8 characters, a letter and a digit")
        }
        Field::FullName => {
            if value.trim().is_empty() {
                Some("Name is required")
            } else if value.chars().count() > 50 {
                Some("Name must be at most 50 characters")
            } else {
                None
            }
        }
        Field::Email => (!is_email(value)).then_some("Invalid email address"),
        Field::BirthDate => {
            if value.is_empty() {
                return None;
            }
            match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(date) if date > today => Some("Birth date cannot be in the future"),
                Ok(_) => None,
                Err(_) => Some("Invalid date"),
            }
        }
        Field::CellPhone => {
            if value.is_empty() {
                return None;
            }
            let body = value.strip_prefix('+').unwrap_or(value);
            let allowed = body
                .chars()
                .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
            let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
            (!allowed || !(6..=15).contains(&digits)).then_some("Invalid phone number")
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(field: Field, value: &str) -> (Account, ValidationErrors) {
        let mut draft = Account::default();
        let mut errors = ValidationErrors::default();
        validate_field(&mut draft, &mut errors, value, field);
        (draft, errors)
    }

    #[test]
    fn test_draft_always_takes_value() {
        let (draft, errors) = run(Field::Email, "not-an-email");
        assert_eq!(draft.email, "not-an-email");
        assert_eq!(errors.get(Field::Email), "Invalid email address");
    }

    #[test]
    fn test_error_cleared_when_field_becomes_valid() {
        let mut draft = Account::default();
        let mut errors = ValidationErrors::default();
        validate_field(&mut draft, &mut errors, "", Field::FullName);
        assert!(errors.has_errors());
        validate_field(&mut draft, &mut errors, "Mario Rossi", Field::FullName);
        assert_eq!(errors.get(Field::FullName), "");
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_email_rules() {
        assert!(is_email("mario@example.com"));
        assert!(!is_email("mario@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ma rio@example.com"));
        assert!(!is_email("a@b@c.com"));
        assert!(!is_email("mario@example."));
    }

    #[test]
    fn test_password_blank_means_unchanged() {
        let (_, errors) = run(Field::Password, "");
        assert_eq!(errors.get(Field::Password), "");
        let (_, errors) = run(Field::Password, "short1");
        assert!(!errors.get(Field::Password).is_empty());
        let (draft, errors) = run(Field::Password, "longenough1");
        assert_eq!(errors.get(Field::Password), "");
        assert_eq!(draft.password, "longenough1");
    }

    #[test]
    fn test_birth_date_rules() {
        let (draft, errors) = run(Field::BirthDate, "1990-05-17");
        assert_eq!(errors.get(Field::BirthDate), "");
        assert_eq!(draft.birth_date.as_deref(), Some("1990-05-17"));

        let (_, errors) = run(Field::BirthDate, "3000-01-01");
        assert_eq!(errors.get(Field::BirthDate), "Birth date cannot be in the future");

        let (_, errors) = run(Field::BirthDate, "17/05/1990");
        assert_eq!(errors.get(Field::BirthDate), "Invalid date");

        let (draft, errors) = run(Field::BirthDate, "");
        assert!(!errors.has_errors());
        assert_eq!(draft.birth_date, None);
    }

    #[test]
    fn test_cell_phone_rules() {
        for ok in ["123 456 789", "+39 333-123-4567", "123456"] {
            let (_, errors) = run(Field::CellPhone, ok);
            assert_eq!(errors.get(Field::CellPhone), "", "{ok}");
        }
        for bad in ["12345", "phone", "+39 (333) 1234567", "1234567890123456"] {
            let (_, errors) = run(Field::CellPhone, bad);
            assert_eq!(errors.get(Field::CellPhone), "Invalid phone number", "{bad}");
        }
    }

    #[test]
    fn test_username_rules() {
        let (_, errors) = run(Field::Username, "mario_rossi.90");
        assert!(!errors.has_errors());
        let (_, errors) = run(Field::Username, "mr");
        assert!(errors.has_errors());
        let (_, errors) = run(Field::Username, "mario rossi");
        assert!(errors.has_errors());
    }

    #[test]
    fn test_merge_server_errors() {
        let mut errors = ValidationErrors::default();
        let mut server = BTreeMap::new();
        server.insert("email".to_string(), "Email already in use".to_string());
        server.insert("nickname".to_string(), "whatever".to_string());
        errors.merge_wire(&server);
        assert_eq!(errors.get(Field::Email), "Email already in use");
        assert_eq!(Field::ALL.iter().filter(|f| !errors.get(**f).is_empty()).count(), 1);
    }
}

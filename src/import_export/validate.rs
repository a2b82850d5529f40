use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{CandidateContact, ContactDraft};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .expect("valid regex")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Schema check shared by direct create/update flows and by every
/// imported row or block. Returns a single error per record; the
/// message concatenates all violated constraints.
pub fn validate(candidate: &CandidateContact) -> Result<ContactDraft, String> {
    let mut reasons = Vec::new();

    if candidate.first_name.is_empty() {
        reasons.push("First name is required");
    }
    if !candidate.email.is_empty() && !is_valid_email(&candidate.email) {
        reasons.push("Invalid email address");
    }

    if !reasons.is_empty() {
        return Err(reasons.join("; "));
    }

    Ok(ContactDraft {
        first_name: candidate.first_name.clone(),
        last_name: optional(&candidate.last_name),
        email: optional(&candidate.email),
        phone: optional(&candidate.phone),
        address: optional(&candidate.address),
        city: optional(&candidate.city),
        state: optional(&candidate.state),
        zip_code: optional(&candidate.zip_code),
        country: optional(&candidate.country),
        notes: optional(&candidate.notes),
    })
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(first_name: &str, email: &str) -> CandidateContact {
        CandidateContact {
            first_name: first_name.to_string(),
            email: email.to_string(),
            ..CandidateContact::default()
        }
    }

    #[test]
    fn test_first_name_required() {
        let err = validate(&candidate("", "")).unwrap_err();
        assert_eq!(err, "First name is required");
    }

    #[test]
    fn test_empty_email_accepted() {
        let draft = validate(&candidate("Alice", "")).unwrap();
        assert_eq!(draft.first_name, "Alice");
        assert_eq!(draft.email, None);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let err = validate(&candidate("Alice", "not-an-email")).unwrap_err();
        assert_eq!(err, "Invalid email address");
    }

    #[test]
    fn test_all_violations_reported_together() {
        let err = validate(&candidate("", "bad@")).unwrap_err();
        assert_eq!(err, "First name is required; Invalid email address");
    }

    #[test]
    fn test_empty_optionals_collapse_to_none() {
        let mut input = candidate("Alice", "alice@example.com");
        input.city = "Lisbon".to_string();
        let draft = validate(&input).unwrap();
        assert_eq!(draft.email.as_deref(), Some("alice@example.com"));
        assert_eq!(draft.city.as_deref(), Some("Lisbon"));
        assert_eq!(draft.last_name, None);
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user example.com"));
    }
}

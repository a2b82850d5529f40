mod error;
mod handlers;
mod migration;
mod service;
mod types;

pub use error::*;
pub use handlers::*;
pub use migration::*;
pub use service::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import_export::validate;

    #[test]
    fn test_contact_request_validates_like_an_import_row() {
        let request = ContactRequest {
            first_name: String::new(),
            email: "nope".to_string(),
            ..ContactRequest::default()
        };
        let err = validate::validate(&request.into_candidate()).unwrap_err();
        assert_eq!(err, "First name is required; Invalid email address");
    }

    #[test]
    fn test_contact_request_empty_fields_become_null() {
        let request = ContactRequest {
            first_name: "Alice".to_string(),
            city: "Lisbon".to_string(),
            ..ContactRequest::default()
        };
        let draft = validate::validate(&request.into_candidate()).unwrap();
        assert_eq!(draft.first_name, "Alice");
        assert_eq!(draft.city.as_deref(), Some("Lisbon"));
        assert_eq!(draft.email, None);
        assert_eq!(draft.notes, None);
    }
}

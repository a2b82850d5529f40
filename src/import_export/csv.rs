use std::collections::HashMap;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use super::fields;
use super::types::{CandidateContact, ParseResult};
use super::validate;
use crate::contacts::Contact;

/// Fixed export column order. Decode does not rely on this; columns are
/// located through the header row.
pub const CSV_COLUMNS: [&str; 10] = [
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Address",
    "City",
    "State",
    "Zip Code",
    "Country",
    "Notes",
];

/// Encode the contact list as delimited text. Every field is quoted so
/// embedded delimiters and line breaks stay intact.
pub fn generate_csv(contacts: &[Contact]) -> Result<String, csv::Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_COLUMNS)?;
    for contact in contacts {
        writer.write_record([
            contact.first_name.as_str(),
            contact.last_name.as_deref().unwrap_or(""),
            contact.email.as_deref().unwrap_or(""),
            contact.phone.as_deref().unwrap_or(""),
            contact.address.as_deref().unwrap_or(""),
            contact.city.as_deref().unwrap_or(""),
            contact.state.as_deref().unwrap_or(""),
            contact.zip_code.as_deref().unwrap_or(""),
            contact.country.as_deref().unwrap_or(""),
            contact.notes.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode delimited text into validated drafts. Column positions come
/// from the header row run through the field mapper; each data row is
/// validated independently, so a bad row costs one error entry and
/// nothing else.
pub fn parse_csv(content: &str) -> ParseResult {
    let mut contacts = Vec::new();
    let mut errors = Vec::new();
    let mut total_rows = 0usize;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(fields::canonical_header).collect(),
        Err(e) => {
            errors.push(format!("Failed to parse CSV: {e}"));
            return ParseResult {
                contacts,
                errors,
                total_rows: 0,
                success_count: 0,
            };
        }
    };

    for (index, record) in reader.records().enumerate() {
        // Data rows are reported counting the header line, so the first
        // data row is row 2.
        let row_number = index + 2;
        total_rows += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let message = match e.kind() {
                    csv::ErrorKind::UnequalLengths { .. } => {
                        "column count does not match the header".to_string()
                    }
                    _ => e.to_string(),
                };
                errors.push(format!("Row {row_number}: {message}"));
                continue;
            }
        };

        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        let candidate = CandidateContact {
            first_name: fields::first_populated(&row, fields::FIRST_NAME_KEYS),
            last_name: fields::first_populated(&row, fields::LAST_NAME_KEYS),
            email: fields::first_populated(&row, fields::EMAIL_KEYS),
            phone: fields::first_populated(&row, fields::PHONE_KEYS),
            address: fields::first_populated(&row, fields::ADDRESS_KEYS),
            city: fields::first_populated(&row, fields::CITY_KEYS),
            state: fields::first_populated(&row, fields::STATE_KEYS),
            zip_code: fields::first_populated(&row, fields::ZIP_CODE_KEYS),
            country: fields::first_populated(&row, fields::COUNTRY_KEYS),
            notes: fields::first_populated(&row, fields::NOTES_KEYS),
        };

        match validate::validate(&candidate) {
            Ok(draft) => contacts.push(draft),
            Err(reason) => errors.push(format!("Row {row_number}: {reason}")),
        }
    }

    let success_count = contacts.len();
    ParseResult {
        contacts,
        errors,
        total_rows,
        success_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn contact(first_name: &str) -> Contact {
        Contact {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: None,
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_generate_quotes_every_field() {
        let mut c = contact("Alice");
        c.email = Some("alice@example.com".to_string());
        let output = generate_csv(&[c]).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"First Name\",\"Last Name\",\"Email\",\"Phone\",\"Address\",\"City\",\"State\",\"Zip Code\",\"Country\",\"Notes\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"Alice\",\"\",\"alice@example.com\",\"\",\"\",\"\",\"\",\"\",\"\",\"\""
        );
    }

    #[test]
    fn test_parse_minimal_header_subset() {
        let result = parse_csv("First Name,Email\nAlice,alice@example.com\n");
        assert_eq!(result.errors, Vec::<String>::new());
        assert_eq!(result.total_rows, 1);
        assert_eq!(result.success_count, 1);
        let draft = &result.contacts[0];
        assert_eq!(draft.first_name, "Alice");
        assert_eq!(draft.email.as_deref(), Some("alice@example.com"));
        assert_eq!(draft.last_name, None);
    }

    #[test]
    fn test_parse_missing_first_name_cites_row() {
        let result = parse_csv("First Name,Email\n,missing@example.com\n");
        assert_eq!(result.success_count, 0);
        assert_eq!(result.total_rows, 1);
        assert_eq!(result.errors, vec!["Row 2: First name is required"]);
    }

    #[test]
    fn test_parse_column_mismatch_recovers() {
        let input = "First Name,Email\nAlice,alice@example.com,extra\nBob,bob@example.com\n";
        let result = parse_csv(input);
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.contacts[0].first_name, "Bob");
        assert_eq!(
            result.errors,
            vec!["Row 2: column count does not match the header"]
        );
    }

    #[test]
    fn test_parse_name_column_fallback() {
        let result = parse_csv("Name,Phone\nAda Lovelace,555-0100\n");
        assert_eq!(result.success_count, 1);
        // The raw name column feeds firstName only; it is a fallback,
        // not a full-name decomposition.
        assert_eq!(result.contacts[0].first_name, "Ada Lovelace");
        assert_eq!(result.contacts[0].phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_parse_unknown_headers_ignored() {
        let result = parse_csv("First Name,Favorite Color\nAlice,teal\n");
        assert_eq!(result.success_count, 1);
        let draft = &result.contacts[0];
        assert_eq!(draft.first_name, "Alice");
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn test_parse_quoted_fields_with_embedded_delimiters() {
        let input = "First Name,Notes\n\"Alice\",\"likes cheese, wine\r\nand hiking\"\n";
        let result = parse_csv(input);
        assert_eq!(result.success_count, 1);
        assert_eq!(
            result.contacts[0].notes.as_deref(),
            Some("likes cheese, wine\r\nand hiking")
        );
    }

    #[test]
    fn test_parse_alias_headers() {
        let input = "FIRSTNAME,E-Mail,Postal Code\nAlice,alice@example.com,1000-001\n";
        let result = parse_csv(input);
        assert_eq!(result.success_count, 1);
        let draft = &result.contacts[0];
        assert_eq!(draft.email.as_deref(), Some("alice@example.com"));
        assert_eq!(draft.zip_code.as_deref(), Some("1000-001"));
    }
}

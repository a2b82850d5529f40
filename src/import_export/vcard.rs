use once_cell::sync::Lazy;
use regex::Regex;

use super::fields;
use super::types::{CandidateContact, ParseResult};
use super::validate;
use crate::contacts::Contact;

static BEGIN_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)BEGIN:VCARD").expect("valid regex"));

/// Encode the contact list as vCard 3.0 blocks joined by a blank line.
pub fn generate_vcard(contacts: &[Contact]) -> String {
    let blocks: Vec<String> = contacts.iter().map(encode_block).collect();
    blocks.join("\r\n\r\n")
}

fn encode_block(contact: &Contact) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("BEGIN:VCARD".to_string());
    lines.push("VERSION:3.0".to_string());

    let last_name = contact.last_name.as_deref().unwrap_or("");
    let full_name = format!("{} {last_name}", contact.first_name);
    lines.push(format!("FN:{}", full_name.trim()));
    lines.push(format!("N:{last_name};{};;;", contact.first_name));

    if let Some(email) = populated(&contact.email) {
        lines.push(format!("EMAIL;TYPE=INTERNET:{email}"));
    }
    if let Some(phone) = populated(&contact.phone) {
        lines.push(format!("TEL;TYPE=CELL:{phone}"));
    }

    let address = contact.address.as_deref().unwrap_or("");
    let city = contact.city.as_deref().unwrap_or("");
    let state = contact.state.as_deref().unwrap_or("");
    let zip_code = contact.zip_code.as_deref().unwrap_or("");
    let country = contact.country.as_deref().unwrap_or("");
    let has_address = [address, city, state, zip_code, country]
        .iter()
        .any(|part| !part.is_empty());
    if has_address {
        // pobox and extended address are never populated; their empty
        // positions keep the composite delimiter count intact.
        lines.push(format!(
            "ADR;TYPE=HOME:;;{address};{city};{state};{zip_code};{country}"
        ));
    }

    if let Some(notes) = populated(&contact.notes) {
        lines.push(format!("NOTE:{}", escape_text(notes)));
    }

    lines.push(format!("REV:{}", contact.updated_at.format("%Y%m%dT%H%M%SZ")));
    lines.push("END:VCARD".to_string());
    lines.join("\r\n")
}

fn populated(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Literal newlines and commas travel as the two-character escapes `\n`
/// and `\,` inside property text.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(',') => out.push(','),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// One recognized property line, classified by the name before the
/// first colon. Parameter suffixes such as `EMAIL;TYPE=INTERNET` are
/// tolerated; the match on the name itself is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    FullName,
    StructuredName,
    Email,
    Phone,
    Address,
    Note,
}

fn classify(line: &str) -> Option<(Property, &str)> {
    let (prefix, value) = line.split_once(':')?;
    let name = prefix.split(';').next().unwrap_or(prefix);
    let kind = match name {
        "FN" => Property::FullName,
        "N" => Property::StructuredName,
        "EMAIL" => Property::Email,
        "TEL" => Property::Phone,
        "ADR" => Property::Address,
        "NOTE" => Property::Note,
        _ => return None,
    };
    Some((kind, value.trim()))
}

/// Decode vCard text into validated drafts. Each block is scanned and
/// validated on its own; a bad block costs one error entry and never
/// aborts the rest.
pub fn parse_vcard(content: &str) -> ParseResult {
    let mut contacts = Vec::new();
    let mut errors = Vec::new();

    let blocks = split_blocks(content);
    let total_rows = blocks.len();

    for (index, block) in blocks.iter().enumerate() {
        let block_number = index + 1;
        let candidate = scan_block(block);
        match validate::validate(&candidate) {
            Ok(draft) => contacts.push(draft),
            Err(reason) => errors.push(format!("vCard {block_number}: {reason}")),
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

/// Split on the begin marker regardless of case, dropping fragments that
/// are empty after trimming and re-prepending the marker so every block
/// scans uniformly.
fn split_blocks(content: &str) -> Vec<String> {
    BEGIN_MARKER
        .split(content)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(|fragment| format!("BEGIN:VCARD{fragment}"))
        .collect()
}

fn scan_block(block: &str) -> CandidateContact {
    let mut candidate = CandidateContact::default();
    let mut full_name: Option<String> = None;
    let mut structured_name: Option<String> = None;

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((kind, value)) = classify(line) else {
            continue;
        };
        match kind {
            // Later occurrences win; the name properties are applied
            // after the scan so the structured name always overrides
            // the full name, whatever the line order.
            Property::FullName => full_name = Some(value.to_string()),
            Property::StructuredName => structured_name = Some(value.to_string()),
            Property::Email => {
                if candidate.email.is_empty() {
                    candidate.email = value.to_string();
                }
            }
            Property::Phone => {
                if candidate.phone.is_empty() {
                    candidate.phone = value.to_string();
                }
            }
            Property::Address => fields::apply_address(&mut candidate, value),
            Property::Note => candidate.notes = unescape_text(value),
        }
    }

    if let Some(value) = full_name {
        fields::apply_full_name(&mut candidate, &value);
    }
    if let Some(value) = structured_name {
        fields::apply_structured_name(&mut candidate, &value);
    }

    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn contact(first_name: &str, last_name: Option<&str>) -> Contact {
        Contact {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.map(str::to_string),
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_encode_minimal_block() {
        let output = generate_vcard(&[contact("Bob", Some("Smith"))]);
        let lines: Vec<&str> = output.split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "BEGIN:VCARD",
                "VERSION:3.0",
                "FN:Bob Smith",
                "N:Smith;Bob;;;",
                "REV:20240301T093000Z",
                "END:VCARD",
            ]
        );
    }

    #[test]
    fn test_encode_address_preserves_empty_positions() {
        let mut c = contact("Ana", None);
        c.city = Some("Porto".to_string());
        let output = generate_vcard(&[c]);
        assert!(output.contains("ADR;TYPE=HOME:;;;Porto;;;"));
    }

    #[test]
    fn test_encode_skips_address_when_all_parts_empty() {
        let output = generate_vcard(&[contact("Ana", None)]);
        assert!(!output.contains("ADR"));
    }

    #[test]
    fn test_encode_escapes_note_text() {
        let mut c = contact("Ana", None);
        c.notes = Some("line one\nline two, with comma".to_string());
        let output = generate_vcard(&[c]);
        assert!(output.contains("NOTE:line one\\nline two\\, with comma"));
    }

    #[test]
    fn test_blocks_joined_with_blank_line() {
        let output = generate_vcard(&[contact("Ana", None), contact("Bob", None)]);
        assert!(output.contains("END:VCARD\r\n\r\nBEGIN:VCARD"));
    }

    #[test]
    fn test_parse_full_name_only() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Bob Smith\r\nEND:VCARD";
        let result = parse_vcard(input);
        assert_eq!(result.success_count, 1);
        let draft = &result.contacts[0];
        assert_eq!(draft.first_name, "Bob");
        assert_eq!(draft.last_name.as_deref(), Some("Smith"));
    }

    #[test]
    fn test_parse_structured_name_wins_regardless_of_order() {
        let input = "BEGIN:VCARD\nN:Smithe;Robert;;;\nFN:Bob Smith\nEND:VCARD";
        let result = parse_vcard(input);
        let draft = &result.contacts[0];
        assert_eq!(draft.first_name, "Robert");
        assert_eq!(draft.last_name.as_deref(), Some("Smithe"));
    }

    #[test]
    fn test_parse_first_email_and_phone_win() {
        let input = "BEGIN:VCARD\nFN:Ana\nEMAIL:first@example.com\nEMAIL:second@example.com\nTEL:111\nTEL:222\nEND:VCARD";
        let result = parse_vcard(input);
        let draft = &result.contacts[0];
        assert_eq!(draft.email.as_deref(), Some("first@example.com"));
        assert_eq!(draft.phone.as_deref(), Some("111"));
    }

    #[test]
    fn test_parse_parameter_suffixes_tolerated() {
        let input = "BEGIN:VCARD\nFN:Ana\nEMAIL;TYPE=INTERNET:ana@example.com\nTEL;TYPE=CELL:555-0100\nADR;TYPE=HOME:;;Rua A;Lisboa;;1000;Portugal\nEND:VCARD";
        let result = parse_vcard(input);
        let draft = &result.contacts[0];
        assert_eq!(draft.email.as_deref(), Some("ana@example.com"));
        assert_eq!(draft.phone.as_deref(), Some("555-0100"));
        assert_eq!(draft.address.as_deref(), Some("Rua A"));
        assert_eq!(draft.city.as_deref(), Some("Lisboa"));
        assert_eq!(draft.zip_code.as_deref(), Some("1000"));
        assert_eq!(draft.country.as_deref(), Some("Portugal"));
    }

    #[test]
    fn test_parse_lowercase_property_names_ignored() {
        let input = "BEGIN:VCARD\nfn:Ana\nEND:VCARD";
        let result = parse_vcard(input);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.errors, vec!["vCard 1: First name is required"]);
    }

    #[test]
    fn test_parse_case_insensitive_begin_marker() {
        let input = "begin:vcard\nFN:Ana\nEND:VCARD\n\nBegin:VCard\nFN:Bob\nEND:VCARD";
        let result = parse_vcard(input);
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.success_count, 2);
    }

    #[test]
    fn test_parse_bad_block_does_not_abort_the_rest() {
        let input = "BEGIN:VCARD\nEMAIL:no-name@example.com\nEND:VCARD\n\nBEGIN:VCARD\nFN:Bob\nEND:VCARD";
        let result = parse_vcard(input);
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.errors, vec!["vCard 1: First name is required"]);
        assert_eq!(result.contacts[0].first_name, "Bob");
    }

    #[test]
    fn test_note_round_trip() {
        let mut c = contact("Ana", None);
        c.notes = Some("first line\nsecond, part".to_string());
        let encoded = generate_vcard(&[c]);
        let result = parse_vcard(&encoded);
        assert_eq!(
            result.contacts[0].notes.as_deref(),
            Some("first line\nsecond, part")
        );
    }
}

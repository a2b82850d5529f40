use std::collections::HashMap;

use super::types::CandidateContact;

/// Alias table applied to tabular headers after trimming and
/// lower-casing. Headers with no alias pass through lower-cased and are
/// ignored downstream unless a precedence list names them.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("first name", "firstName"),
    ("firstname", "firstName"),
    ("last name", "lastName"),
    ("lastname", "lastName"),
    ("e-mail", "email"),
    ("email address", "email"),
    ("phone number", "phone"),
    ("telephone", "phone"),
    ("street address", "address"),
    ("zip code", "zipCode"),
    ("zip", "zipCode"),
    ("postal", "zipCode"),
    ("postal code", "zipCode"),
];

pub fn canonical_header(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(normalized)
}

/// Ordered fallback keys per attribute; the first populated column wins.
pub const FIRST_NAME_KEYS: &[&str] = &["firstName", "first_name", "name"];
pub const LAST_NAME_KEYS: &[&str] = &["lastName", "last_name"];
pub const EMAIL_KEYS: &[&str] = &["email"];
pub const PHONE_KEYS: &[&str] = &["phone"];
pub const ADDRESS_KEYS: &[&str] = &["address"];
pub const CITY_KEYS: &[&str] = &["city"];
pub const STATE_KEYS: &[&str] = &["state"];
pub const ZIP_CODE_KEYS: &[&str] = &["zipCode", "zip"];
pub const COUNTRY_KEYS: &[&str] = &["country"];
pub const NOTES_KEYS: &[&str] = &["notes"];

pub fn first_populated(row: &HashMap<String, String>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Full-name decomposition: the first whitespace token is the given
/// name; any remaining tokens become the family name, re-joined with
/// single spaces.
pub fn apply_full_name(candidate: &mut CandidateContact, value: &str) {
    let mut tokens = value.split_whitespace();
    if let Some(first) = tokens.next() {
        candidate.first_name = first.to_string();
        let rest = tokens.collect::<Vec<_>>().join(" ");
        if !rest.is_empty() {
            candidate.last_name = rest;
        }
    }
}

/// Structured-name decomposition, `family;given;additional;prefix;suffix`.
/// Non-empty given/family positions overwrite whatever the full-name
/// property produced; empty positions leave it untouched.
pub fn apply_structured_name(candidate: &mut CandidateContact, value: &str) {
    let parts: Vec<&str> = value.split(';').collect();
    if let Some(given) = parts.get(1).map(|p| p.trim()).filter(|p| !p.is_empty()) {
        candidate.first_name = given.to_string();
    }
    if let Some(family) = parts.first().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        candidate.last_name = family.to_string();
    }
}

/// Address decomposition, `pobox;extended;street;city;state;postal;country`.
/// Positions 2 through 6 map onto the flat address attributes, each
/// applied only when non-empty.
pub fn apply_address(candidate: &mut CandidateContact, value: &str) {
    let parts: Vec<&str> = value.split(';').collect();
    let position = |index: usize| {
        parts
            .get(index)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    };
    if let Some(street) = position(2) {
        candidate.address = street;
    }
    if let Some(city) = position(3) {
        candidate.city = city;
    }
    if let Some(state) = position(4) {
        candidate.state = state;
    }
    if let Some(postal) = position(5) {
        candidate.zip_code = postal;
    }
    if let Some(country) = position(6) {
        candidate.country = country;
    }
}

//! Field validation for student forms.
//!
//! Rules (checked in this order, first failure wins):
//! - name: required after trimming, at most 100 characters
//! - email: required, `local@domain.tld` shape
//! - roll number: required, letters/digits/hyphens only, at most 50 characters
//!
//! The server remains the authority. These checks only keep obviously bad input
//! from making a round trip.

use crate::model::{Field, StudentDraft, StudentPatch};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

pub const NAME_MAX_LEN: usize = 100;
pub const ROLL_NUMBER_MAX_LEN: usize = 50;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static ROLL_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("valid roll number regex"));

/// Per-field error messages. A field absent from the map passed.
pub type FieldErrors = BTreeMap<Field, String>;

pub fn validate_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some("Name is required".to_string());
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Some(format!("Name must be {} characters or less", NAME_MAX_LEN));
    }
    None
}

/// # Examples
/// ```
/// use rollbook::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_none());
/// assert!(validate_email("ada@example").is_some());
/// assert!(validate_email("ada lovelace@example.com").is_some());
/// ```
pub fn validate_email(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Email is required".to_string());
    }
    if !EMAIL_RE.is_match(value) {
        return Some("Please enter a valid email address".to_string());
    }
    None
}

pub fn validate_roll_number(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some("Roll number is required".to_string());
    }
    if !ROLL_NUMBER_RE.is_match(value) {
        return Some(
            "Roll number must be alphanumeric (letters, numbers, hyphens only)".to_string(),
        );
    }
    if value.chars().count() > ROLL_NUMBER_MAX_LEN {
        return Some(format!(
            "Roll number must be {} characters or less",
            ROLL_NUMBER_MAX_LEN
        ));
    }
    None
}

pub fn validate_field(field: Field, value: &str) -> Option<String> {
    match field {
        Field::Name => validate_name(value),
        Field::Email => validate_email(value),
        Field::RollNumber => validate_roll_number(value),
    }
}

pub fn validate_draft(draft: &StudentDraft) -> FieldErrors {
    Field::ALL
        .into_iter()
        .filter_map(|field| validate_field(field, draft.value(field)).map(|msg| (field, msg)))
        .collect()
}

/// Validates only the fields a patch actually sets.
pub fn validate_patch(patch: &StudentPatch) -> FieldErrors {
    Field::ALL
        .into_iter()
        .filter_map(|field| {
            patch
                .value(field)
                .and_then(|value| validate_field(field, value))
                .map(|msg| (field, msg))
        })
        .collect()
}

//! Validation helpers for uploads and invitation addresses

use regex::Regex;
use validator::ValidateEmail;

lazy_static::lazy_static! {
    /// `type/subtype` with optional parameters, per RFC 6838 restricted names
    pub static ref MIME_TYPE_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]{0,126}/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]{0,126}(\s*;.*)?$"
    )
    .unwrap();
}

/// Check the shape of a caller-supplied content type; the value is stored as given.
pub fn is_valid_mime_type(mime_type: &str) -> bool {
    MIME_TYPE_REGEX.is_match(mime_type)
}

/// Canonical form of an invitation address: the uniqueness key is built from this
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Last path component of an uploaded file name.
///
/// Some clients send the full local path; only the base name is kept.
pub fn sanitize_file_name(file_name: &str) -> Option<String> {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." || base.chars().any(char::is_control) {
        return None;
    }

    Some(base.to_string())
}

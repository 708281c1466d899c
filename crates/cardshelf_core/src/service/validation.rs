//! Input normalization shared by orchestrator operations.

use crate::service::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Upper bound for folder names and card titles, in characters.
pub const MAX_LABEL_CHARS: usize = 200;

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex")
});

/// Trims a name/title and enforces non-empty and length bounds.
pub fn normalize_label(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if trimmed.chars().count() > MAX_LABEL_CHARS {
        return Err(ValidationError::TooLong {
            field,
            max_chars: MAX_LABEL_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Color for a create call. Blank means no color.
pub fn normalize_color(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if !COLOR_RE.is_match(value) {
        return Err(ValidationError::InvalidColor(value.to_string()));
    }
    Ok(Some(value.to_ascii_lowercase()))
}

/// Color for an update call: `None` keeps, blank clears.
pub fn normalize_color_change(
    value: Option<&str>,
) -> Result<Option<Option<String>>, ValidationError> {
    value.map(|value| normalize_color(Some(value))).transpose()
}

pub fn check_order(order: i64) -> Result<i64, ValidationError> {
    if order < 0 {
        return Err(ValidationError::NegativeOrder(order));
    }
    Ok(order)
}

pub fn check_section_count(count: i64) -> Result<i64, ValidationError> {
    if count < 0 {
        return Err(ValidationError::NegativeSectionCount(count));
    }
    Ok(count)
}

/// Parses a transport-level string id.
pub fn parse_id(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidId {
        field,
        value: value.to_string(),
    })
}

/// Like [`parse_id`] for nullable ids; `None` and blank both mean root.
pub fn parse_optional_id(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<Uuid>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_id(field, value).map(Some),
    }
}

pub fn parse_ids(field: &'static str, values: &[String]) -> Result<Vec<Uuid>, ValidationError> {
    values.iter().map(|value| parse_id(field, value)).collect()
}

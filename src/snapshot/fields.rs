// Typed access to string-valued record fields

use std::str::FromStr;

use crate::error::{CollectError, CollectResult};
use crate::routeros::Record;

/// Raw string value of a field. Absent fields read as empty; nothing is trimmed.
pub fn string_field(record: &Record, field: &str) -> String {
    record.get(field).cloned().unwrap_or_default()
}

/// Parse an integer field, failing with the field name and raw value
pub fn int_field<T: FromStr>(record: &Record, field: &str) -> CollectResult<T> {
    let raw = record.get(field).map(String::as_str).unwrap_or("");
    raw.parse().map_err(|_| CollectError::MalformedField {
        field: field.to_string(),
        raw_value: raw.to_string(),
    })
}

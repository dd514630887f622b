//! Format detection for string values and Extended JSON wrappers

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Detected string format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// ISO 8601 date (YYYY-MM-DD)
    Date,
    /// ISO 8601 date-time (YYYY-MM-DDTHH:MM:SS)
    DateTime,
    /// 24 hex digits, the textual form of a store-native identifier
    ObjectId,
    /// No specific format detected
    None,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Date => write!(f, "date"),
            Format::DateTime => write!(f, "date-time"),
            Format::ObjectId => write!(f, "object-id"),
            Format::None => write!(f, "none"),
        }
    }
}

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

static OBJECT_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());

/// Detect the format of a string value
///
/// Checks are ordered from most specific to least specific.
pub fn detect_format(value: &str) -> Format {
    let value = value.trim();
    if value.is_empty() {
        return Format::None;
    }

    if OBJECT_ID_REGEX.is_match(value) {
        return Format::ObjectId;
    }

    // DateTime before Date (more specific)
    if DATETIME_REGEX.is_match(value) {
        return Format::DateTime;
    }

    if DATE_REGEX.is_match(value) {
        return Format::Date;
    }

    Format::None
}

/// Typed Extended JSON wrapper (`{"$oid": ..}`, `{"$date": ..}`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    ObjectId,
    /// `$uuid`, or `$binary` with subtype 4
    Uuid,
    DbRef,
    Date,
    /// `$timestamp`
    Timestamp,
    Number,
    /// `$binary` with any other subtype
    Binary,
    /// `$regularExpression`, `$symbol`, and `$code`
    Text,
    /// `$minKey` and `$maxKey`
    Bound,
}

impl Wrapper {
    /// Whether the wrapped value identifies a document
    pub fn is_identifier(&self) -> bool {
        matches!(self, Wrapper::ObjectId | Wrapper::Uuid)
    }
}

const UUID_SUBTYPE: &str = "4";

/// Recognize an Extended JSON wrapper object
///
/// Canonical and legacy (`$binary`+`$type`, `$regex`+`$options`) forms are
/// both accepted. Returns `None` for ordinary embedded documents.
pub fn detect_wrapper(obj: &Map<String, Value>) -> Option<Wrapper> {
    if obj.contains_key("$ref") && obj.contains_key("$id") {
        return Some(Wrapper::DbRef);
    }
    if obj.len() == 2 {
        if obj.contains_key("$binary") {
            return obj.get("$type").map(binary_wrapper);
        }
        if obj.contains_key("$regex") && obj.contains_key("$options") {
            return Some(Wrapper::Text);
        }
        if obj.contains_key("$code") && obj.contains_key("$scope") {
            return Some(Wrapper::Text);
        }
        return None;
    }
    if obj.len() != 1 {
        return None;
    }
    let (key, value) = obj.iter().next()?;
    match key.as_str() {
        "$oid" if value.is_string() => Some(Wrapper::ObjectId),
        "$uuid" if value.is_string() => Some(Wrapper::Uuid),
        "$date" => Some(Wrapper::Date),
        "$timestamp" => Some(Wrapper::Timestamp),
        "$numberInt" | "$numberLong" | "$numberDouble" | "$numberDecimal" => {
            Some(Wrapper::Number)
        }
        "$binary" => match value.get("subType") {
            Some(subtype) => Some(binary_wrapper(subtype)),
            None => Some(Wrapper::Binary),
        },
        "$regularExpression" | "$symbol" | "$code" => Some(Wrapper::Text),
        "$minKey" | "$maxKey" => Some(Wrapper::Bound),
        _ => None,
    }
}

/// Binary subtypes are hex strings such as `"04"`
fn binary_wrapper(subtype: &Value) -> Wrapper {
    match subtype.as_str().map(|s| s.trim_start_matches('0')) {
        Some(UUID_SUBTYPE) => Wrapper::Uuid,
        _ => Wrapper::Binary,
    }
}

/// Extract the identifier carried by a reference-like value
///
/// Arrays contribute their first element. Returns the value as it should be
/// matched against a document's `_id`.
pub fn reference_value(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first().and_then(reference_value),
        Value::Object(obj) => match detect_wrapper(obj)? {
            Wrapper::DbRef => obj.get("$id"),
            wrapper if wrapper.is_identifier() => Some(value),
            _ => None,
        },
        Value::String(s) if detect_format(s) == Format::ObjectId => Some(value),
        _ => None,
    }
}

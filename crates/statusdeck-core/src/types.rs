//! Shared data types and serde helpers

use chrono::{DateTime as ChronoDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

/// Database DateTime type used across all statusdeck crates
pub type DBDateTime = ChronoDateTime<Utc>;

/// Standard UTC DateTime type for API responses
///
/// Serializes as RFC 3339 with a `Z` suffix, e.g. `2025-10-12T12:15:47.609192Z`.
/// When used in a `ToSchema` struct add the schema attribute:
/// ```rust,ignore
/// #[schema(value_type = String, format = DateTime)]
/// pub created_at: UtcDateTime,
/// ```
pub type UtcDateTime = ChronoDateTime<Utc>;

/// Deserialize a field that is present in the payload, even if `null`.
///
/// Combined with `#[serde(default)]` on an `Option<Option<T>>` field this tells
/// an absent key (`None`) apart from an explicit `null` (`Some(None)`):
///
/// ```rust
/// use serde::Deserialize;
/// use statusdeck_core::deserialize_present;
///
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default, deserialize_with = "deserialize_present")]
///     description: Option<Option<String>>,
/// }
///
/// let absent: Patch = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.description, None);
///
/// let cleared: Patch = serde_json::from_str(r#"{"description":null}"#).unwrap();
/// assert_eq!(cleared.description, Some(None));
/// ```
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Formats a timestamp the way `UtcDateTime` fields serialize (`...Z`).
pub fn format_timestamp(at: &UtcDateTime) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// The current time, formatted like serialized `UtcDateTime` fields.
pub fn timestamp_now() -> String {
    format_timestamp(&Utc::now())
}

/// Returns the trimmed value when it is present and not blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_present")]
        description: Option<Option<String>>,
        #[serde(default)]
        order: Option<i32>,
    }

    #[test]
    fn test_timestamps_match_serialized_datetimes() {
        let at = Utc::now();
        let serialized = serde_json::to_value(at).unwrap();
        assert_eq!(serialized, serde_json::Value::String(format_timestamp(&at)));
        assert!(timestamp_now().ends_with('Z'));
    }

    #[test]
    fn test_absent_field_is_none() {
        let patch: Patch = serde_json::from_str(r#"{"order":3}"#).unwrap();
        assert_eq!(patch.description, None);
        assert_eq!(patch.order, Some(3));
    }

    #[test]
    fn test_null_field_is_some_none() {
        let patch: Patch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
    }

    #[test]
    fn test_value_field_is_some_some() {
        let patch: Patch = serde_json::from_str(r#"{"description":"Main API"}"#).unwrap();
        assert_eq!(patch.description, Some(Some("Main API".to_string())));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  api ")), Some("api"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}

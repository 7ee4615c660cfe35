//! Canonical payload construction.
//!
//! The payload is the exact byte string that gets signed and verified. Its
//! construction is deliberately simple and deterministic: the six fields in
//! fixed order, joined with the ASCII pipe character.
//!
//! Free-text fields are NOT escaped. A `content` value containing `|` makes
//! the payload ambiguous between field splits; the signature still binds the
//! exact payload string, but the payload no longer uniquely determines the
//! field tuple. This matches the deployed format and must not be changed
//! without re-signing every stored record.

use chrono::{DateTime, SecondsFormat, Utc};

/// Separator between payload fields
pub const FIELD_SEPARATOR: char = '|';

/// Render a creation timestamp the way it appears in the payload:
/// UTC ISO-8601 with zero fractional-second precision, e.g.
/// `2024-01-01T12:00:00Z`.
pub fn render_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build the canonical payload for a fact.
///
/// Field order is fixed: external id, content, source type tag, source id,
/// recording agent, creation timestamp. Identical inputs always produce
/// identical output.
pub fn canonical_payload(
    external_id: &str,
    content: &str,
    source_type: &str,
    source_id: &str,
    recorded_by: &str,
    created_at: DateTime<Utc>,
) -> String {
    let mut payload = String::with_capacity(
        external_id.len() + content.len() + source_type.len() + source_id.len()
            + recorded_by.len()
            + 25,
    );
    payload.push_str(external_id);
    payload.push(FIELD_SEPARATOR);
    payload.push_str(content);
    payload.push(FIELD_SEPARATOR);
    payload.push_str(source_type);
    payload.push(FIELD_SEPARATOR);
    payload.push_str(source_id);
    payload.push(FIELD_SEPARATOR);
    payload.push_str(recorded_by);
    payload.push(FIELD_SEPARATOR);
    payload.push_str(&render_timestamp(created_at));
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_payload_shape() {
        let payload = canonical_payload(
            "mv-123e4567-e89b-12d3-a456-426614174000",
            "Paris is the capital of France",
            "document",
            "doc:42",
            "ingest-1",
            ts(),
        );
        assert_eq!(
            payload,
            "mv-123e4567-e89b-12d3-a456-426614174000|Paris is the capital of France|document|doc:42|ingest-1|2024-01-01T12:00:00Z"
        );
    }

    #[test]
    fn test_timestamp_rendering_is_second_precision_utc() {
        assert_eq!(render_timestamp(ts()), "2024-01-01T12:00:00Z");

        let with_nanos = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap();
        assert_eq!(render_timestamp(with_nanos), "2024-06-30T23:59:59Z");
    }

    #[test]
    fn test_payload_is_deterministic() {
        let a = canonical_payload("mv-x", "c", "user_input", "s", "r", ts());
        let b = canonical_payload("mv-x", "c", "user_input", "s", "r", ts());
        assert_eq!(a, b);
    }

    #[test]
    fn test_pipe_in_content_is_not_escaped() {
        // Documented ambiguity: the separator is not escaped. These two
        // distinct tuples produce the same payload string.
        let a = canonical_payload("mv-x", "a|b", "document", "s", "r", ts());
        let b = canonical_payload("mv-x", "a", "b|document", "s", "r", ts());
        assert_eq!(a, b);
    }
}

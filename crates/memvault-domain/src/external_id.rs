//! External id module - the public `mv-<uuid>` identifier form

use thiserror::Error;

use crate::fact::FactId;

/// Fixed textual prefix of every external id
pub const EXTERNAL_ID_PREFIX: &str = "mv-";

/// Error produced when an external id cannot be parsed.
///
/// A malformed identifier is a client formatting mistake (bad request), not
/// a lookup miss; callers must not conflate this with "not found".
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid factId format")]
pub struct ExternalIdError;

/// Render the public external id for a fact
pub fn render_external_id(id: FactId) -> String {
    format!("{}{}", EXTERNAL_ID_PREFIX, id)
}

/// Parse an external id back to a [`FactId`].
///
/// The `mv-` prefix is stripped when present; a bare canonical UUID is also
/// accepted. Anything else is malformed.
pub fn parse_external_id(raw: &str) -> Result<FactId, ExternalIdError> {
    let raw = raw.strip_prefix(EXTERNAL_ID_PREFIX).unwrap_or(raw);
    FactId::parse(raw).map_err(|_| ExternalIdError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_and_parse_roundtrip() {
        let id = FactId::new();
        let external = render_external_id(id);

        assert!(external.starts_with("mv-"));
        assert_eq!(external.len(), 3 + 36);
        assert_eq!(parse_external_id(&external), Ok(id));
    }

    #[test]
    fn test_bare_uuid_accepted() {
        let id = FactId::new();
        assert_eq!(parse_external_id(&id.to_string()), Ok(id));
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert!(parse_external_id("mv-not-a-uuid").is_err());
        assert!(parse_external_id("mv-").is_err());
        assert!(parse_external_id("").is_err());
        assert!(parse_external_id("mv-123e4567").is_err());
    }
}

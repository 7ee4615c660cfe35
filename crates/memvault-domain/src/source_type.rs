//! Source type module - closed provenance tag set

use serde::{Deserialize, Serialize};

/// Provenance source tag for a fact.
///
/// This is a closed set: raw input that does not match one of the four tag
/// values is rejected at the boundary rather than mapped to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Entered directly by a human
    UserInput,

    /// Extracted from a document
    Document,

    /// Returned by an external API
    ApiResponse,

    /// Inferred by an agent (high risk; flagged when recorded)
    AgentInference,
}

impl SourceType {
    /// The lowercase tag value, as rendered in the canonical payload
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::UserInput => "user_input",
            SourceType::Document => "document",
            SourceType::ApiResponse => "api_response",
            SourceType::AgentInference => "agent_inference",
        }
    }

    /// Parse a raw tag value; unrecognized input yields `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user_input" => Some(SourceType::UserInput),
            "document" => Some(SourceType::Document),
            "api_response" => Some(SourceType::ApiResponse),
            "agent_inference" => Some(SourceType::AgentInference),
            _ => None,
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid source_type: {}", s))
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values_roundtrip() {
        for tag in [
            SourceType::UserInput,
            SourceType::Document,
            SourceType::ApiResponse,
            SourceType::AgentInference,
        ] {
            assert_eq!(SourceType::parse(tag.as_str()), Some(tag));
        }
    }

    #[test]
    fn test_parse_is_case_and_whitespace_tolerant() {
        assert_eq!(SourceType::parse(" Document "), Some(SourceType::Document));
        assert_eq!(SourceType::parse("USER_INPUT"), Some(SourceType::UserInput));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert_eq!(SourceType::parse("webhook"), None);
        assert_eq!(SourceType::parse(""), None);
        // No defaulting for near-misses either
        assert_eq!(SourceType::parse("documents"), None);
    }

    #[test]
    fn test_serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&SourceType::AgentInference).unwrap();
        assert_eq!(json, "\"agent_inference\"");

        let parsed: SourceType = serde_json::from_str("\"api_response\"").unwrap();
        assert_eq!(parsed, SourceType::ApiResponse);
    }
}

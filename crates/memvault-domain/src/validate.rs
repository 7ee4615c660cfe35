//! Validation policy applied at the write boundary.
//!
//! All checks run before any side effect; a failing field aborts the
//! operation with the offending field named.

use thiserror::Error;

use crate::source_type::SourceType;

/// Length bounds for free-text fields, provisioned from configuration
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// Maximum content length in characters
    pub max_content_length: usize,

    /// Maximum source_id length in characters
    pub max_source_id_length: usize,

    /// Maximum recorded_by length in characters
    pub max_recorded_by_length: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_content_length: 1000,
            max_source_id_length: 200,
            max_recorded_by_length: 100,
        }
    }
}

/// A field value that is malformed or out of policy
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending field
    pub field: &'static str,

    /// Human-readable description
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A validated, trimmed fact draft ready for signing and insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactDraft {
    /// The claim text
    pub content: String,
    /// Provenance source tag
    pub source_type: SourceType,
    /// Provenance source identifier
    pub source_id: String,
    /// The recording agent
    pub recorded_by: String,
}

impl FactDraft {
    /// Validate raw inbound fields into a draft.
    ///
    /// Inputs are trimmed before any other check. The source type arrives as
    /// its raw tag value so that an unrecognized tag surfaces as a
    /// validation failure on `source_type`, never as a parse-level reject.
    pub fn validate(
        content: &str,
        source_type: &str,
        source_id: &str,
        recorded_by: &str,
        limits: &ValidationLimits,
    ) -> Result<Self, ValidationError> {
        let content = content.trim();
        let source_id = source_id.trim();
        let recorded_by = recorded_by.trim();

        if content.is_empty() {
            return Err(ValidationError::new("content", "content must be provided"));
        }
        if content.chars().count() > limits.max_content_length {
            return Err(ValidationError::new(
                "content",
                format!(
                    "content exceeds max length of {}",
                    limits.max_content_length
                ),
            ));
        }

        let source_type = SourceType::parse(source_type).ok_or_else(|| {
            ValidationError::new("source_type", format!("Invalid source_type: {}", source_type))
        })?;

        if source_id.is_empty() {
            return Err(ValidationError::new(
                "source_id",
                "source_id must be provided",
            ));
        }
        if source_id.chars().count() > limits.max_source_id_length {
            return Err(ValidationError::new(
                "source_id",
                format!(
                    "source_id exceeds max length of {}",
                    limits.max_source_id_length
                ),
            ));
        }
        if !source_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
        {
            return Err(ValidationError::new(
                "source_id",
                "source_id contains invalid characters",
            ));
        }

        if recorded_by.is_empty() {
            return Err(ValidationError::new(
                "recorded_by",
                "recorded_by must be provided",
            ));
        }
        if recorded_by.chars().count() > limits.max_recorded_by_length {
            return Err(ValidationError::new(
                "recorded_by",
                format!(
                    "recorded_by exceeds max length of {}",
                    limits.max_recorded_by_length
                ),
            ));
        }

        Ok(Self {
            content: content.to_string(),
            source_type,
            source_id: source_id.to_string(),
            recorded_by: recorded_by.to_string(),
        })
    }
}

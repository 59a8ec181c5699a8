//! Error handling for the RingMap core

use thiserror::Error;

/// Errors raised while building a map. Layout overflow is never an error; dropped labels and
/// oversized legends are only logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Feature range {start}..{stop} is outside the sequence (1..{length})")]
    FeatureRange { start: i64, stop: i64, length: u32 },

    #[error("Invalid slot {slot}: must be between 1 and {max}")]
    InvalidSlot { slot: i64, max: usize },

    #[error("The feature type \"{feature_type}\" was not recognized")]
    UnknownFeatureType { feature_type: String },

    #[error("Invalid sequence length {length}: must be between 1 and {max}")]
    SequenceLength { length: i64, max: u32 },

    #[error("Invalid {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl MapError {
    pub fn feature_range(start: i64, stop: i64, length: u32) -> Self {
        Self::FeatureRange { start, stop, length }
    }

    pub fn invalid_slot(slot: i64, max: usize) -> Self {
        Self::InvalidSlot { slot, max }
    }

    pub fn unknown_feature_type<S: Into<String>>(feature_type: S) -> Self {
        Self::UnknownFeatureType { feature_type: feature_type.into() }
    }

    pub fn sequence_length(length: i64, max: u32) -> Self {
        Self::SequenceLength { length, max }
    }

    pub fn invalid_value<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::InvalidValue { field: field.into(), message: message.into() }
    }

    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Parse { line, message: message.into() }
    }

    /// True for errors that only invalidate a single feature, not the whole map.
    pub fn is_feature_error(&self) -> bool {
        matches!(
            self,
            Self::FeatureRange { .. } | Self::InvalidSlot { .. } | Self::UnknownFeatureType { .. }
        )
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { message: err.to_string() }
    }
}

/// Result type for map construction
pub type MapResult<T> = Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MapError::feature_range(0, 20, 5000);
        assert_eq!(err.to_string(), "Feature range 0..20 is outside the sequence (1..5000)");
        assert!(err.is_feature_error());

        let err = MapError::invalid_slot(7, 6);
        assert!(err.to_string().contains("between 1 and 6"));
    }

    #[test]
    fn test_structural_errors_are_not_feature_errors() {
        assert!(!MapError::sequence_length(0, 200_000_000).is_feature_error());
        assert!(!MapError::parse(3, "bad line").is_feature_error());
    }
}

//! Error types for the oxrecur codecs.

use thiserror::Error;

/// Errors that can occur while transcoding recurrence and free-busy data.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed recurrence pattern: {0}")]
    MalformedPatternString(String),

    #[error("Unknown RRULE key '{0}'")]
    UnknownRRuleKey(String),

    #[error("RRULE field {key} is not a number: '{value}'")]
    InvalidNumericField { key: String, value: String },

    #[error("Unsupported RRULE frequency '{0}'")]
    UnsupportedFrequency(String),

    #[error("Invalid RRULE value for {key}: '{value}'")]
    InvalidRRuleValue { key: String, value: String },

    #[error("Pattern does not recur")]
    NotRecurring,

    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("VFREEBUSY parse error: {0}")]
    FreeBusyParse(String),

    #[error("VFREEBUSY generation error: {0}")]
    FreeBusyGenerate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CodecError::MalformedPatternString(msg.into())
    }

    pub(crate) fn invalid_value(key: &str, value: &str) -> Self {
        CodecError::InvalidRRuleValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result type alias for oxrecur operations.
pub type CodecResult<T> = Result<T, CodecError>;

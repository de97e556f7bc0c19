use std::fmt;

/// Failure to coerce a captured value into a destination type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The value does not parse as the destination type.
    Invalid {
        value: String,
        target: &'static str,
    },
    /// The value parses but does not fit the destination type.
    OutOfRange {
        value: String,
        target: &'static str,
    },
    /// No conversion exists between the two kinds of value.
    Unsupported {
        from: &'static str,
        target: &'static str,
    },
    /// Raised by a registered converter.
    Custom {
        target: &'static str,
        message: String,
    },
}

impl ConvertError {
    pub fn invalid(value: impl fmt::Display, target: &'static str) -> Self {
        ConvertError::Invalid {
            value: value.to_string(),
            target,
        }
    }

    pub fn out_of_range(value: impl fmt::Display, target: &'static str) -> Self {
        ConvertError::OutOfRange {
            value: value.to_string(),
            target,
        }
    }

    pub fn unsupported(from: &'static str, target: &'static str) -> Self {
        ConvertError::Unsupported { from, target }
    }

    pub fn custom(target: &'static str, message: impl Into<String>) -> Self {
        ConvertError::Custom {
            target,
            message: message.into(),
        }
    }

    /// Destination type named by the error.
    pub fn target(&self) -> &'static str {
        match self {
            ConvertError::Invalid { target, .. }
            | ConvertError::OutOfRange { target, .. }
            | ConvertError::Unsupported { target, .. }
            | ConvertError::Custom { target, .. } => target,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Invalid { value, target } => {
                write!(f, "cannot convert '{}' to {}", value, target)
            }
            ConvertError::OutOfRange { value, target } => {
                write!(f, "value '{}' is out of range for {}", value, target)
            }
            ConvertError::Unsupported { from, target } => {
                write!(f, "no conversion from {} to {}", from, target)
            }
            ConvertError::Custom { target, message } => {
                write!(f, "cannot convert to {}: {}", target, message)
            }
        }
    }
}

impl std::error::Error for ConvertError {}

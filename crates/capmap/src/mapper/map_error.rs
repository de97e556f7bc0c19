use std::fmt;

use crate::convert::ConvertError;
use crate::target::ConstructError;

/// Error raised by a transform function; carried through unchanged.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// A fatal failure of a mapping call.
///
/// Fields written before the failure stay written.
#[derive(Debug)]
pub enum MapError {
    /// A value could not be coerced to the field or element type.
    Convert {
        group: String,
        field: String,
        source: ConvertError,
    },
    /// An intermediate object along the group's path could not be built.
    Construct {
        group: String,
        field: String,
        source: ConstructError,
    },
    /// A transform function failed.
    Transform(TransformError),
}

impl MapError {
    /// Group whose capture failed, if known.
    pub fn group(&self) -> Option<&str> {
        match self {
            MapError::Convert { group, .. } | MapError::Construct { group, .. } => Some(group),
            MapError::Transform(_) => None,
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Convert {
                group,
                field,
                source,
            } => write!(f, "group '{}', field '{}': {}", group, field, source),
            MapError::Construct {
                group,
                field,
                source,
            } => write!(f, "group '{}', field '{}': {}", group, field, source),
            MapError::Transform(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Convert { source, .. } => Some(source),
            MapError::Construct { source, .. } => Some(source),
            MapError::Transform(e) => e.source(),
        }
    }
}

impl From<TransformError> for MapError {
    fn from(e: TransformError) -> Self {
        MapError::Transform(e)
    }
}

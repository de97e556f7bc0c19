// capmap
// Hydrate Rust structs from the named capture groups of a pattern match

#[cfg(test)]
mod test;

extern crate self as capmap;

pub mod convert;
pub mod mapper;
pub mod match_result;
pub mod target;
pub mod value;

#[cfg(feature = "serde")]
pub mod serde;

pub use capmap_derive::Captures;
pub use convert::{ConvertError, Converters, FromCapture};
pub use mapper::{
    ApplyContext, ConstructPolicy, DEFAULT_SEPARATOR, MapError, MapOptions, Mapper, TransformError,
    TransformTable, map_match_to_object,
};
pub use match_result::{Group, MatchResult, WHOLE_MATCH};
pub use target::{CaptureTarget, ConstructError, FieldSlot, FieldTable};
pub use value::CaptureValue;

//! Accessor traits that let the mapper reach into a target object.
//!
//! [`CaptureTarget`] is the per-type field table: it resolves a field name to
//! either a nested object ([`descend`](CaptureTarget::descend)) or a terminal
//! write ([`apply`](CaptureTarget::apply)). `None` from either method means
//! "no writable field of that name", which the mapper silently ignores.
//!
//! [`FieldSlot`] describes how one field *type* behaves: scalars are assigned,
//! collections append, `Option` is created on demand, nested objects are
//! descended into.
//!
//! Implementations come from `#[derive(Captures)]`, from a [`FieldTable`], or
//! by hand.

mod field_table;
mod slots;

use std::any::type_name;
use std::fmt;

pub use field_table::FieldTable;

use crate::convert::{ConvertError, Converters};
use crate::mapper::{ApplyContext, MapError};
use crate::value::CaptureValue;

/// A type whose fields can be populated from capture groups.
pub trait CaptureTarget {
    fn type_name(&self) -> &'static str;

    /// Names of the writable fields, as they appear in group names.
    fn field_names(&self) -> &'static [&'static str];

    /// Get the nested object behind `field`, constructing it if it is unset.
    ///
    /// Returns `None` when there is no writable field named `field` or the
    /// field does not hold an object.
    fn descend(&mut self, field: &str) -> Option<Result<&mut dyn CaptureTarget, ConstructError>>;

    /// Write the capture described by `cx` into `field`.
    ///
    /// Returns `None` when there is no writable field named `field`.
    fn apply(&mut self, field: &str, cx: &ApplyContext<'_>) -> Option<Result<(), MapError>>;
}

/// Behaviour of a single field type.
pub trait FieldSlot {
    /// Whether the type is an object that owns fields of its own.
    fn nests() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// Whether every write appends, so `Nil` is an element rather than a reset.
    fn appends() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// A fresh instance for an unset `Option<Self>`, or `None` when the type
    /// has no default value.
    fn empty() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    /// Build a value from a single capture for an unset `Option<Self>`.
    fn build(value: CaptureValue, converters: &Converters) -> Result<Self, ConvertError>
    where
        Self: Sized,
    {
        let Some(mut slot) = Self::empty() else {
            return Err(ConvertError::unsupported(value.type_name(), type_name::<Self>()));
        };
        slot.assign(value, converters)?;
        Ok(slot)
    }

    /// Nested object held by this slot, if the slot holds one.
    fn descend(&mut self) -> Option<Result<&mut dyn CaptureTarget, ConstructError>> {
        None
    }

    /// Assign a scalar or append a collection element.
    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError>;
}

/// An intermediate object could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructError {
    pub type_name: &'static str,
    pub message: String,
}

impl ConstructError {
    pub fn new(type_name: &'static str, message: impl Into<String>) -> Self {
        ConstructError {
            type_name,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot construct {}: {}", self.type_name, self.message)
    }
}

impl std::error::Error for ConstructError {}

/// Descend into an `Option<C>` field, building `C` with `factory` when unset.
///
/// Used by `#[capture(factory = "...")]` fields whose type has no `Default`.
pub fn descend_with<'a, C, E, F>(
    slot: &'a mut Option<C>,
    factory: F,
) -> Option<Result<&'a mut dyn CaptureTarget, ConstructError>>
where
    C: CaptureTarget,
    E: fmt::Display,
    F: FnOnce() -> Result<C, E>,
{
    if slot.is_none() {
        match factory() {
            Ok(value) => *slot = Some(value),
            Err(e) => return Some(Err(ConstructError::new(type_name::<C>(), e.to_string()))),
        }
    }
    slot.as_mut().map(|value| Ok(value as &mut dyn CaptureTarget))
}

/// Implement [`FieldSlot`] for types that convert through
/// [`FromCapture`](crate::FromCapture) and are assigned as a whole.
///
/// ```ignore
/// impl FromCapture for Celsius { /* ... */ }
/// capmap::scalar_slot!(Celsius);
/// ```
#[macro_export]
macro_rules! scalar_slot {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::target::FieldSlot for $ty {
                fn build(
                    value: $crate::CaptureValue,
                    converters: &$crate::Converters,
                ) -> ::std::result::Result<Self, $crate::ConvertError> {
                    converters.convert::<$ty>(value)
                }

                fn assign(
                    &mut self,
                    value: $crate::CaptureValue,
                    converters: &$crate::Converters,
                ) -> ::std::result::Result<(), $crate::ConvertError> {
                    *self = converters.convert::<$ty>(value)?;
                    Ok(())
                }
            }
        )*
    };
}

use std::any::{Any, TypeId, type_name};
use std::fmt;

use ahash::AHashMap;

use super::{ConvertError, FromCapture};
use crate::value::CaptureValue;

type ConvertFn =
    dyn Fn(CaptureValue) -> Result<Box<dyn Any + Send>, ConvertError> + Send + Sync;

/// Conversion registry keyed by destination type.
///
/// A converter registered for `T` replaces `T`'s [`FromCapture`] impl for every
/// non-nil value headed to a `T` field or a collection of `T`.
///
/// ```ignore
/// let mut converters = Converters::new();
/// converters.register(|v: CaptureValue| {
///     let s = String::from_capture(v)?;
///     Ok(s.replace(',', "").parse::<u64>().map_err(|_| ConvertError::invalid(&s, "u64"))?)
/// });
/// ```
#[derive(Default)]
pub struct Converters {
    by_type: AHashMap<TypeId, Box<ConvertFn>>,
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for destination type `T`, replacing any earlier one.
    pub fn register<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any + Send,
        F: Fn(CaptureValue) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        self.by_type.insert(
            TypeId::of::<T>(),
            Box::new(move |value| f(value).map(|v| Box::new(v) as Box<dyn Any + Send>)),
        );
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Convert `value` to `T`.
    ///
    /// Order: a `CaptureValue::Other` already holding a `T`, then a registered
    /// converter (skipped for `Nil`), then `T::from_capture_with`. For
    /// `Option<T>` the last step goes back through the registry for `T`.
    pub fn convert<T: FromCapture + Any>(&self, value: CaptureValue) -> Result<T, ConvertError> {
        let value = match value.downcast::<T>() {
            Ok(v) => return Ok(v),
            Err(value) => value,
        };

        if !value.is_nil() {
            if let Some(f) = self.by_type.get(&TypeId::of::<T>()) {
                return f(value)?.downcast::<T>().map(|v| *v).map_err(|_| {
                    ConvertError::custom(type_name::<T>(), "converter produced a different type")
                });
            }
        }

        T::from_capture_with(value, self)
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converters")
            .field("registered", &self.by_type.len())
            .finish()
    }
}

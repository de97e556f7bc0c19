//! Hand-registered field tables for types that cannot derive `Captures`.
//!
//! [`FieldTable`] collects field lenses at runtime, once, and then answers
//! `descend` / `apply` lookups for any value of the type. Pair it with
//! [`table_target!`](crate::table_target) to get a [`CaptureTarget`] impl.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::LazyLock;
//! use capmap::{FieldTable, table_target};
//!
//! static ENDPOINT: LazyLock<FieldTable<Endpoint>> = LazyLock::new(|| {
//!     FieldTable::<Endpoint>::new()
//!         .set_type_name("Endpoint")
//!         .field("Host", |e| &mut e.host)
//!         .field("Port", |e| &mut e.port)
//! });
//! table_target!(Endpoint, ENDPOINT);
//! ```

use std::any::type_name;
use std::fmt;

use ahash::AHashMap;

use super::{CaptureTarget, ConstructError, FieldSlot, descend_with};
use crate::mapper::{ApplyContext, MapError};

trait TableEntry<T>: Send + Sync {
    fn descend<'a>(
        &self,
        target: &'a mut T,
    ) -> Option<Result<&'a mut dyn CaptureTarget, ConstructError>>;

    fn apply(&self, target: &mut T, cx: &ApplyContext<'_>) -> Result<(), MapError>;
}

struct SlotEntry<T, S> {
    lens: fn(&mut T) -> &mut S,
}

impl<T, S: FieldSlot + 'static> TableEntry<T> for SlotEntry<T, S> {
    fn descend<'a>(
        &self,
        target: &'a mut T,
    ) -> Option<Result<&'a mut dyn CaptureTarget, ConstructError>> {
        (self.lens)(target).descend()
    }

    fn apply(&self, target: &mut T, cx: &ApplyContext<'_>) -> Result<(), MapError> {
        cx.write((self.lens)(target))
    }
}

struct FactoryEntry<T, C, E> {
    lens: fn(&mut T) -> &mut Option<C>,
    factory: fn() -> Result<C, E>,
}

impl<T, C, E> TableEntry<T> for FactoryEntry<T, C, E>
where
    C: CaptureTarget + 'static,
    E: fmt::Display + 'static,
{
    fn descend<'a>(
        &self,
        target: &'a mut T,
    ) -> Option<Result<&'a mut dyn CaptureTarget, ConstructError>> {
        descend_with((self.lens)(target), self.factory)
    }

    fn apply(&self, target: &mut T, cx: &ApplyContext<'_>) -> Result<(), MapError> {
        cx.place((self.lens)(target), type_name::<C>())
    }
}

/// Field lenses for `T`, registered one by one.
pub struct FieldTable<T: 'static> {
    type_name: &'static str,
    names: Vec<&'static str>,
    entries: AHashMap<&'static str, Box<dyn TableEntry<T>>>,
}

impl<T: 'static> FieldTable<T> {
    /// Start an empty table. The default type name is `std::any::type_name::<T>()`.
    pub fn new() -> Self {
        FieldTable {
            type_name: type_name::<T>(),
            names: Vec::new(),
            entries: AHashMap::new(),
        }
    }

    /// Override the type name shown in error messages.
    pub fn set_type_name(mut self, name: &'static str) -> Self {
        self.type_name = name;
        self
    }

    /// Register a writable field. Its behaviour follows the slot type `S`:
    /// scalars are assigned, collections append, `Option` of an object nests.
    pub fn field<S: FieldSlot + 'static>(
        mut self,
        name: &'static str,
        lens: fn(&mut T) -> &mut S,
    ) -> Self {
        self.insert(name, Box::new(SlotEntry { lens }));
        self
    }

    /// Register a nested object field whose type has no `Default`.
    ///
    /// `factory` runs when the field is `None` and a path descends through it;
    /// an `Err` is reported as a construction failure.
    pub fn nested_with<C, E>(
        mut self,
        name: &'static str,
        lens: fn(&mut T) -> &mut Option<C>,
        factory: fn() -> Result<C, E>,
    ) -> Self
    where
        C: CaptureTarget + 'static,
        E: fmt::Display + 'static,
    {
        self.insert(name, Box::new(FactoryEntry { lens, factory }));
        self
    }

    fn insert(&mut self, name: &'static str, entry: Box<dyn TableEntry<T>>) {
        if self.entries.insert(name, entry).is_none() {
            self.names.push(name);
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn field_names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn descend<'a>(
        &self,
        target: &'a mut T,
        field: &str,
    ) -> Option<Result<&'a mut dyn CaptureTarget, ConstructError>> {
        self.entries.get(field)?.descend(target)
    }

    pub fn apply(
        &self,
        target: &mut T,
        field: &str,
        cx: &ApplyContext<'_>,
    ) -> Option<Result<(), MapError>> {
        self.entries.get(field).map(|entry| entry.apply(target, cx))
    }
}

impl<T: 'static> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implement [`CaptureTarget`] and [`FieldSlot`] for a type by delegating to a
/// `static` [`FieldTable`].
///
/// The type must implement `Default` so an unset `Option<_>` of it can be
/// created on demand; pass `no_default` as a third argument otherwise.
#[macro_export]
macro_rules! table_target {
    ($ty:ty, $table:path) => {
        $crate::table_target!(@impl $ty, $table, ::std::option::Option::Some(
            <$ty as ::std::default::Default>::default()
        ));
    };
    ($ty:ty, $table:path, no_default) => {
        $crate::table_target!(@impl $ty, $table, ::std::option::Option::None);
    };
    (@impl $ty:ty, $table:path, $empty:expr) => {
        impl $crate::CaptureTarget for $ty {
            fn type_name(&self) -> &'static str {
                $table.type_name()
            }

            fn field_names(&self) -> &'static [&'static str] {
                $table.field_names()
            }

            fn descend(
                &mut self,
                field: &str,
            ) -> ::std::option::Option<
                ::std::result::Result<&mut dyn $crate::CaptureTarget, $crate::ConstructError>,
            > {
                $table.descend(self, field)
            }

            fn apply(
                &mut self,
                field: &str,
                cx: &$crate::ApplyContext<'_>,
            ) -> ::std::option::Option<::std::result::Result<(), $crate::MapError>> {
                $table.apply(self, field, cx)
            }
        }

        impl $crate::target::FieldSlot for $ty {
            fn nests() -> bool {
                true
            }

            fn empty() -> ::std::option::Option<Self> {
                $empty
            }

            fn build(
                value: $crate::CaptureValue,
                _converters: &$crate::Converters,
            ) -> ::std::result::Result<Self, $crate::ConvertError> {
                value.downcast::<Self>().map_err(|value| {
                    $crate::ConvertError::unsupported(value.type_name(), $table.type_name())
                })
            }

            fn descend(
                &mut self,
            ) -> ::std::option::Option<
                ::std::result::Result<&mut dyn $crate::CaptureTarget, $crate::ConstructError>,
            > {
                ::std::option::Option::Some(::std::result::Result::Ok(
                    self as &mut dyn $crate::CaptureTarget,
                ))
            }

            fn assign(
                &mut self,
                value: $crate::CaptureValue,
                converters: &$crate::Converters,
            ) -> ::std::result::Result<(), $crate::ConvertError> {
                *self = <Self as $crate::target::FieldSlot>::build(value, converters)?;
                ::std::result::Result::Ok(())
            }
        }
    };
}

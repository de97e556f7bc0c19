// FieldSlot impls for std, chrono and smol_str types.

use std::any::{Any, type_name};
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use smol_str::SmolStr;

use super::{CaptureTarget, ConstructError, FieldSlot};
use crate::convert::{ConvertError, Converters, FromCapture};
use crate::value::CaptureValue;

// ==================== Scalars ====================

crate::scalar_slot!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, SmolStr,
);

crate::scalar_slot!(
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    DateTime<FixedOffset>,
    DateTime<Utc>,
    TimeDelta,
);

// ==================== Nullable wrapper ====================

impl<T: FieldSlot> FieldSlot for Option<T> {
    fn nests() -> bool {
        T::nests()
    }

    fn empty() -> Option<Self> {
        Some(None)
    }

    fn descend(&mut self) -> Option<Result<&mut dyn CaptureTarget, ConstructError>> {
        if !T::nests() {
            return None;
        }
        if self.is_none() {
            match T::empty() {
                Some(value) => *self = Some(value),
                None => {
                    return Some(Err(ConstructError::new(
                        type_name::<T>(),
                        "type has no default value",
                    )));
                }
            }
        }
        self.as_mut()?.descend()
    }

    fn appends() -> bool {
        T::appends()
    }

    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError> {
        if value.is_nil() && !T::appends() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(inner) => inner.assign(value, converters),
            None => {
                *self = Some(T::build(value, converters)?);
                Ok(())
            }
        }
    }
}

impl<T: FieldSlot> FieldSlot for Box<T> {
    fn nests() -> bool {
        T::nests()
    }

    fn appends() -> bool {
        T::appends()
    }

    fn empty() -> Option<Self> {
        T::empty().map(Box::new)
    }

    fn build(value: CaptureValue, converters: &Converters) -> Result<Self, ConvertError> {
        T::build(value, converters).map(Box::new)
    }

    fn descend(&mut self) -> Option<Result<&mut dyn CaptureTarget, ConstructError>> {
        (**self).descend()
    }

    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError> {
        (**self).assign(value, converters)
    }
}

// ==================== Collections ====================

impl<T: FromCapture + Any> FieldSlot for Vec<T> {
    fn appends() -> bool {
        true
    }

    fn empty() -> Option<Self> {
        Some(Vec::new())
    }

    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError> {
        self.push(converters.convert::<T>(value)?);
        Ok(())
    }
}

impl<T: FromCapture + Any> FieldSlot for VecDeque<T> {
    fn appends() -> bool {
        true
    }

    fn empty() -> Option<Self> {
        Some(VecDeque::new())
    }

    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError> {
        self.push_back(converters.convert::<T>(value)?);
        Ok(())
    }
}

impl<T: FromCapture + Any> FieldSlot for LinkedList<T> {
    fn appends() -> bool {
        true
    }

    fn empty() -> Option<Self> {
        Some(LinkedList::new())
    }

    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError> {
        self.push_back(converters.convert::<T>(value)?);
        Ok(())
    }
}

impl<T: FromCapture + Any + Ord> FieldSlot for BTreeSet<T> {
    fn appends() -> bool {
        true
    }

    fn empty() -> Option<Self> {
        Some(BTreeSet::new())
    }

    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError> {
        self.insert(converters.convert::<T>(value)?);
        Ok(())
    }
}

impl<T, S> FieldSlot for HashSet<T, S>
where
    T: FromCapture + Any + Eq + Hash,
    S: BuildHasher + Default,
{
    fn appends() -> bool {
        true
    }

    fn empty() -> Option<Self> {
        Some(HashSet::default())
    }

    fn assign(&mut self, value: CaptureValue, converters: &Converters) -> Result<(), ConvertError> {
        self.insert(converters.convert::<T>(value)?);
        Ok(())
    }
}

//! `CaptureValue`: the intermediate value handed to the conversion layer.
//!
//! Raw captures always enter as [`CaptureValue::Str`]. A transform may replace
//! the string with any other variant, including [`CaptureValue::Nil`] to
//! request a null assignment, or [`CaptureValue::Other`] to hand over a value
//! that is already of the destination type.

use std::any::Any;
use std::fmt;

/// A capture after the optional transform step, before type conversion.
pub enum CaptureValue {
    Nil,
    Str(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    /// Pre-built value; used as-is when its type is exactly the destination type.
    Other(Box<dyn Any + Send>),
}

impl CaptureValue {
    /// Wrap an arbitrary value so it bypasses conversion.
    pub fn other<T: Any + Send>(value: T) -> Self {
        CaptureValue::Other(Box::new(value))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, CaptureValue::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CaptureValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Type name used in conversion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CaptureValue::Nil => "nil",
            CaptureValue::Str(_) => "string",
            CaptureValue::Integer(_) => "integer",
            CaptureValue::Number(_) => "number",
            CaptureValue::Boolean(_) => "boolean",
            CaptureValue::Other(_) => "value",
        }
    }

    /// Take the boxed value out if it is exactly `T`, otherwise give `self` back.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self {
            CaptureValue::Other(boxed) => match boxed.downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(boxed) => Err(CaptureValue::Other(boxed)),
            },
            other => Err(other),
        }
    }
}

impl fmt::Debug for CaptureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureValue::Nil => write!(f, "Nil"),
            CaptureValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            CaptureValue::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            CaptureValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            CaptureValue::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            CaptureValue::Other(_) => write!(f, "Other(..)"),
        }
    }
}

impl fmt::Display for CaptureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureValue::Nil => write!(f, "nil"),
            CaptureValue::Str(s) => write!(f, "{}", s),
            CaptureValue::Integer(i) => write!(f, "{}", i),
            CaptureValue::Number(n) => write!(f, "{}", n),
            CaptureValue::Boolean(b) => write!(f, "{}", b),
            CaptureValue::Other(_) => write!(f, "<value>"),
        }
    }
}

// ==================== From impls ====================

impl From<String> for CaptureValue {
    fn from(s: String) -> Self {
        CaptureValue::Str(s)
    }
}

impl From<&str> for CaptureValue {
    fn from(s: &str) -> Self {
        CaptureValue::Str(s.to_owned())
    }
}

impl From<bool> for CaptureValue {
    fn from(b: bool) -> Self {
        CaptureValue::Boolean(b)
    }
}

impl From<f64> for CaptureValue {
    fn from(n: f64) -> Self {
        CaptureValue::Number(n)
    }
}

impl From<f32> for CaptureValue {
    fn from(n: f32) -> Self {
        CaptureValue::Number(n as f64)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CaptureValue {
                fn from(i: $ty) -> Self {
                    CaptureValue::Integer(i as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<CaptureValue>> From<Option<T>> for CaptureValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => CaptureValue::Nil,
        }
    }
}

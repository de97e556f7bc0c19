//! `FromCapture`: conversion from a [`CaptureValue`] into a field type.
//!
//! Every scalar field and every collection element goes through this trait,
//! usually via [`Converters::convert`], which first gives registered
//! converters a chance to handle the destination type.
//!
//! # Built-in impls
//! - `bool`, `char`, `i8`..`i128`, `u8`..`u128`, `isize`, `usize`, `f32`, `f64`
//! - `String`, `SmolStr`
//! - `Option<T>` where `T: FromCapture` (`Nil` becomes `None`)
//! - `chrono` dates, times, timestamps and `TimeDelta` (see `temporal`)
//!
//! A `Nil` value converts to the type's default for non-nullable scalars.
//!
//! # User extensibility
//! ```ignore
//! impl FromCapture for Celsius {
//!     fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
//!         f64::from_capture(value).map(Celsius)
//!     }
//! }
//! capmap::scalar_slot!(Celsius);
//! ```

mod convert_error;
mod registry;
mod temporal;

use std::any::Any;
use std::num::IntErrorKind;
use std::str::FromStr;

pub use convert_error::ConvertError;
pub use registry::Converters;
use smol_str::SmolStr;

use crate::value::CaptureValue;

/// Convert a [`CaptureValue`] into a Rust type.
pub trait FromCapture: Sized {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError>;

    /// Convert with a registry in scope. Wrapper types override this so
    /// converters registered for the wrapped type still apply.
    fn from_capture_with(
        value: CaptureValue,
        _converters: &Converters,
    ) -> Result<Self, ConvertError> {
        Self::from_capture(value)
    }
}

// ==================== Integer types ====================

fn parse_integer<T>(s: &str, target: &'static str) -> Result<T, ConvertError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    let trimmed = s.trim();
    trimmed.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ConvertError::out_of_range(trimmed, target)
        }
        // "-1" for an unsigned type
        IntErrorKind::InvalidDigit if trimmed.parse::<i128>().is_ok() => {
            ConvertError::out_of_range(trimmed, target)
        }
        _ => ConvertError::invalid(s, target),
    })
}

/// Only integral, finite floats convert to integers.
fn float_to_integer(n: f64, target: &'static str) -> Result<i128, ConvertError> {
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(ConvertError::invalid(n, target));
    }
    if n < i128::MIN as f64 || n > i128::MAX as f64 {
        return Err(ConvertError::out_of_range(n, target));
    }
    Ok(n as i128)
}

macro_rules! impl_from_capture_int {
    ($($ty:ty),*) => {
        $(
            impl FromCapture for $ty {
                fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
                    const TARGET: &str = stringify!($ty);
                    match value {
                        CaptureValue::Nil => Ok(0),
                        CaptureValue::Str(s) => parse_integer::<$ty>(&s, TARGET),
                        CaptureValue::Integer(i) => <$ty>::try_from(i)
                            .map_err(|_| ConvertError::out_of_range(i, TARGET)),
                        CaptureValue::Number(n) => {
                            let i = float_to_integer(n, TARGET)?;
                            <$ty>::try_from(i).map_err(|_| ConvertError::out_of_range(n, TARGET))
                        }
                        CaptureValue::Boolean(b) => Ok(b as $ty),
                        other => Err(ConvertError::unsupported(other.type_name(), TARGET)),
                    }
                }
            }
        )*
    };
}

impl_from_capture_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

// ==================== Float types ====================

macro_rules! impl_from_capture_float {
    ($($ty:ty),*) => {
        $(
            impl FromCapture for $ty {
                fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
                    const TARGET: &str = stringify!($ty);
                    match value {
                        CaptureValue::Nil => Ok(0.0),
                        CaptureValue::Str(s) => s
                            .trim()
                            .parse::<$ty>()
                            .map_err(|_| ConvertError::invalid(&s, TARGET)),
                        CaptureValue::Integer(i) => Ok(i as $ty),
                        CaptureValue::Number(n) => Ok(n as $ty),
                        CaptureValue::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
                        other => Err(ConvertError::unsupported(other.type_name(), TARGET)),
                    }
                }
            }
        )*
    };
}

impl_from_capture_float!(f32, f64);

// ==================== Boolean ====================

impl FromCapture for bool {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        match value {
            CaptureValue::Nil => Ok(false),
            CaptureValue::Str(s) => {
                let t = s.trim();
                if t.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if t.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(ConvertError::invalid(&s, "bool"))
                }
            }
            CaptureValue::Integer(i) => Ok(i != 0),
            CaptureValue::Number(n) => Ok(n != 0.0),
            CaptureValue::Boolean(b) => Ok(b),
            other => Err(ConvertError::unsupported(other.type_name(), "bool")),
        }
    }
}

// ==================== Character ====================

impl FromCapture for char {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        match value {
            CaptureValue::Nil => Ok('\0'),
            CaptureValue::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConvertError::invalid(&s, "char")),
                }
            }
            CaptureValue::Integer(i) => u32::try_from(i)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| ConvertError::out_of_range(i, "char")),
            other => Err(ConvertError::unsupported(other.type_name(), "char")),
        }
    }
}

// ==================== Strings ====================

impl FromCapture for String {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        match value {
            CaptureValue::Nil => Ok(String::new()),
            CaptureValue::Str(s) => Ok(s),
            CaptureValue::Integer(i) => Ok(itoa::Buffer::new().format(i).to_owned()),
            CaptureValue::Number(n) => Ok(n.to_string()),
            CaptureValue::Boolean(b) => Ok(b.to_string()),
            other => Err(ConvertError::unsupported(other.type_name(), "String")),
        }
    }
}

impl FromCapture for SmolStr {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        match value {
            CaptureValue::Str(s) => Ok(SmolStr::new(s)),
            other => String::from_capture(other)
                .map(SmolStr::from)
                .map_err(|_| ConvertError::unsupported("value", "SmolStr")),
        }
    }
}

// ==================== Option ====================

impl<T: FromCapture + Any> FromCapture for Option<T> {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        if value.is_nil() {
            return Ok(None);
        }
        match value.downcast::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(value) => T::from_capture(value).map(Some),
        }
    }

    fn from_capture_with(
        value: CaptureValue,
        converters: &Converters,
    ) -> Result<Self, ConvertError> {
        if value.is_nil() {
            return Ok(None);
        }
        converters.convert::<T>(value).map(Some)
    }
}

//! The mapping engine.
//!
//! For every named group of a [`MatchResult`] (ordinal 0 is skipped) and every
//! capture of that group, the group name is split on `__` into a field path.
//! Leading segments walk into nested objects, creating them when unset; the
//! last segment is the terminal field, which is assigned (scalars) or
//! appended to (collections).
//!
//! Group names that do not lead to a writable field are ignored. Conversion
//! and transform failures abort the call.

mod apply_context;
mod map_error;
mod map_options;
mod path_resolver;
mod transform_table;

pub use apply_context::ApplyContext;
pub use map_error::{MapError, TransformError};
pub use map_options::{ConstructPolicy, DEFAULT_SEPARATOR, MapOptions};
pub use transform_table::{Transform, TransformTable};

use std::any::Any;

use crate::convert::{ConvertError, Converters, FromCapture};
use crate::match_result::MatchResult;
use crate::target::CaptureTarget;
use crate::value::CaptureValue;
use path_resolver::PathResolver;

/// Map `m` onto `target`, or onto `T::default()` when no target is given.
///
/// Returns the populated target. On error, fields written before the failing
/// capture keep their values but the target is dropped with the error; use
/// [`Mapper::map_into`] to keep a partially populated target.
pub fn map_match_to_object<T: CaptureTarget + Default>(
    m: &MatchResult,
    transforms: Option<&TransformTable>,
    target: Option<T>,
) -> Result<T, MapError> {
    let mut target = target.unwrap_or_default();
    let converters = Converters::default();
    let options = MapOptions::default();
    let resolver = PathResolver {
        options: &options,
        transforms,
        converters: &converters,
    };
    map_with(&resolver, m, &mut target)?;
    Ok(target)
}

fn map_with(
    resolver: &PathResolver<'_>,
    m: &MatchResult,
    target: &mut dyn CaptureTarget,
) -> Result<(), MapError> {
    for group in m.named_groups() {
        let name = group.name();
        for raw in group.captures() {
            resolver.resolve(target, name, name, raw)?;
        }
    }
    Ok(())
}

/// A configured mapping engine: transforms, converters and options.
///
/// A `Mapper` holds no per-call state and can be shared between threads.
///
/// ```ignore
/// let mapper = Mapper::new()
///     .transform("Age", |s| Ok(CaptureValue::Integer(s.parse::<i64>()? * 2)))
///     .converter(|v| Ok(Cents(parse_money(&String::from_capture(v)?)?)));
/// let person: Person = mapper.map(&m)?;
/// ```
#[derive(Debug, Default)]
pub struct Mapper {
    transforms: TransformTable,
    converters: Converters,
    options: MapOptions,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform for the full group name `group`.
    pub fn transform<F>(mut self, group: &str, f: F) -> Self
    where
        F: Fn(&str) -> Result<CaptureValue, TransformError> + Send + Sync + 'static,
    {
        self.transforms.insert(group, f);
        self
    }

    /// Register a converter for destination type `T`.
    pub fn converter<T, F>(mut self, f: F) -> Self
    where
        T: FromCapture + Any + Send,
        F: Fn(CaptureValue) -> Result<T, ConvertError> + Send + Sync + 'static,
    {
        self.converters.register(f);
        self
    }

    pub fn options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_transforms(mut self, transforms: TransformTable) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn with_converters(mut self, converters: Converters) -> Self {
        self.converters = converters;
        self
    }

    pub fn transforms(&self) -> &TransformTable {
        &self.transforms
    }

    pub fn converters(&self) -> &Converters {
        &self.converters
    }

    pub fn map_options(&self) -> &MapOptions {
        &self.options
    }

    /// Map onto a fresh `T::default()`.
    pub fn map<T: CaptureTarget + Default>(&self, m: &MatchResult) -> Result<T, MapError> {
        self.map_onto(m, T::default())
    }

    /// Map onto `target` and return it.
    pub fn map_onto<T: CaptureTarget>(
        &self,
        m: &MatchResult,
        mut target: T,
    ) -> Result<T, MapError> {
        self.map_into(m, &mut target)?;
        Ok(target)
    }

    /// Map onto a borrowed target. On error the target keeps every field
    /// written before the failing capture.
    pub fn map_into(
        &self,
        m: &MatchResult,
        target: &mut dyn CaptureTarget,
    ) -> Result<(), MapError> {
        let resolver = self.resolver();
        map_with(&resolver, m, target)
    }

    fn resolver(&self) -> PathResolver<'_> {
        PathResolver {
            options: &self.options,
            transforms: (!self.transforms.is_empty()).then_some(&self.transforms),
            converters: &self.converters,
        }
    }
}

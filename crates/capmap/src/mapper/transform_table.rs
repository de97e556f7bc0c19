use std::fmt;

use ahash::AHashMap;
use smol_str::SmolStr;

use super::TransformError;
use crate::value::CaptureValue;

/// Preprocessing step applied to a raw capture before conversion.
pub type Transform = dyn Fn(&str) -> Result<CaptureValue, TransformError> + Send + Sync;

/// Transforms keyed by full group name, exactly as written in the pattern.
///
/// ```ignore
/// let transforms = TransformTable::new()
///     .with("Age", |s| Ok(CaptureValue::Integer(s.parse::<i64>()? * 2)))
///     .with("Order__Note", |s| Ok(if s.is_empty() { CaptureValue::Nil } else { s.into() }));
/// ```
#[derive(Default)]
pub struct TransformTable {
    by_group: AHashMap<SmolStr, Box<Transform>>,
}

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` for `group`, replacing any earlier transform.
    pub fn insert<F>(&mut self, group: impl Into<SmolStr>, f: F) -> &mut Self
    where
        F: Fn(&str) -> Result<CaptureValue, TransformError> + Send + Sync + 'static,
    {
        self.by_group.insert(group.into(), Box::new(f));
        self
    }

    pub fn with<F>(mut self, group: impl Into<SmolStr>, f: F) -> Self
    where
        F: Fn(&str) -> Result<CaptureValue, TransformError> + Send + Sync + 'static,
    {
        self.insert(group, f);
        self
    }

    pub fn get(&self, group: &str) -> Option<&Transform> {
        self.by_group.get(group).map(|f| f.as_ref())
    }

    pub fn contains(&self, group: &str) -> bool {
        self.by_group.contains_key(group)
    }

    pub fn remove(&mut self, group: &str) -> bool {
        self.by_group.remove(group).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_group.is_empty()
    }
}

impl fmt::Debug for TransformTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.by_group.keys()).finish()
    }
}

use std::any::Any;

use crate::convert::{ConvertError, Converters};
use crate::target::FieldSlot;
use crate::value::CaptureValue;

use super::{MapError, TransformTable};

/// Everything needed to write one capture into its terminal field.
///
/// `group` is always the full, undivided group name; transforms are looked up
/// by it no matter how deep the field sits.
pub struct ApplyContext<'a> {
    group: &'a str,
    field: &'a str,
    raw: &'a str,
    transforms: Option<&'a TransformTable>,
    converters: &'a Converters,
}

impl<'a> ApplyContext<'a> {
    pub(crate) fn new(
        group: &'a str,
        field: &'a str,
        raw: &'a str,
        transforms: Option<&'a TransformTable>,
        converters: &'a Converters,
    ) -> Self {
        ApplyContext {
            group,
            field,
            raw,
            transforms,
            converters,
        }
    }

    #[inline]
    pub fn group(&self) -> &str {
        self.group
    }

    #[inline]
    pub fn field(&self) -> &str {
        self.field
    }

    #[inline]
    pub fn raw(&self) -> &str {
        self.raw
    }

    pub fn converters(&self) -> &Converters {
        self.converters
    }

    /// The value to write: the transform's output if one is registered for
    /// the group, otherwise the raw capture.
    pub fn resolve(&self) -> Result<CaptureValue, MapError> {
        match self.transforms.and_then(|t| t.get(self.group)) {
            Some(transform) => transform(self.raw).map_err(MapError::Transform),
            None => Ok(CaptureValue::Str(self.raw.to_owned())),
        }
    }

    /// Resolve the value and hand it to `slot`.
    pub fn write(&self, slot: &mut dyn FieldSlot) -> Result<(), MapError> {
        let value = self.resolve()?;
        slot.assign(value, self.converters).map_err(|e| self.convert_error(e))
    }

    /// Write into an `Option<C>` object field that has no `FieldSlot` of its
    /// own. Only `Nil` or a pre-built `C` is accepted; `target` names `C` in
    /// the error otherwise.
    pub fn place<C: Any>(
        &self,
        slot: &mut Option<C>,
        target: &'static str,
    ) -> Result<(), MapError> {
        match self.resolve()? {
            CaptureValue::Nil => *slot = None,
            value => match value.downcast::<C>() {
                Ok(object) => *slot = Some(object),
                Err(value) => {
                    return Err(self.convert_error(ConvertError::unsupported(
                        value.type_name(),
                        target,
                    )));
                }
            },
        }
        Ok(())
    }

    fn convert_error(&self, source: ConvertError) -> MapError {
        MapError::Convert {
            group: self.group.to_owned(),
            field: self.field.to_owned(),
            source,
        }
    }
}

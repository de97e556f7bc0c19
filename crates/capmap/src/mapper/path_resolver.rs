use log::{trace, warn};

use super::{ApplyContext, ConstructPolicy, MapError, MapOptions, TransformTable};
use crate::convert::Converters;
use crate::target::CaptureTarget;

/// Walks a group name down the object graph and writes one capture.
pub(crate) struct PathResolver<'a> {
    pub options: &'a MapOptions,
    pub transforms: Option<&'a TransformTable>,
    pub converters: &'a Converters,
}

impl PathResolver<'_> {
    /// Write `raw` into the field addressed by `path` under `target`.
    ///
    /// `group` stays the full group name through the whole descent; `path` is
    /// the part of it not yet consumed.
    pub fn resolve(
        &self,
        target: &mut dyn CaptureTarget,
        group: &str,
        path: &str,
        raw: &str,
    ) -> Result<(), MapError> {
        let split = match self.options.separator.as_str() {
            "" => None,
            sep => path.split_once(sep),
        };

        let Some((head, tail)) = split else {
            return self.apply(target, group, path, raw);
        };

        match target.descend(head) {
            None => {
                trace!(
                    "group '{}': no nested field '{}' on {}, ignored",
                    group,
                    head,
                    target.type_name()
                );
                Ok(())
            }
            Some(Ok(child)) => self.resolve(child, group, tail, raw),
            Some(Err(source)) => match self.options.construct_failures {
                ConstructPolicy::Propagate => Err(MapError::Construct {
                    group: group.to_owned(),
                    field: head.to_owned(),
                    source,
                }),
                ConstructPolicy::Skip => {
                    warn!("group '{}', field '{}': {}, capture skipped", group, head, source);
                    Ok(())
                }
            },
        }
    }

    fn apply(
        &self,
        target: &mut dyn CaptureTarget,
        group: &str,
        field: &str,
        raw: &str,
    ) -> Result<(), MapError> {
        let cx = ApplyContext::new(group, field, raw, self.transforms, self.converters);
        match target.apply(field, &cx) {
            Some(result) => result,
            None => {
                trace!(
                    "group '{}': no writable field '{}' on {}, ignored",
                    group,
                    field,
                    target.type_name()
                );
                Ok(())
            }
        }
    }
}

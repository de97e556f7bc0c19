/// What to do when an intermediate object cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructPolicy {
    /// Abort the mapping call with `MapError::Construct`.
    #[default]
    Propagate,
    /// Log the failure at `warn` and move on to the next capture.
    Skip,
}

#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Splits a group name into field path segments.
    pub separator: String,
    pub construct_failures: ConstructPolicy,
}

/// Field path separator used in group names, e.g. `Order__Customer__Name`.
pub const DEFAULT_SEPARATOR: &str = "__";

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_owned(),
            construct_failures: ConstructPolicy::Propagate,
        }
    }
}

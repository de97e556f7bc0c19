//! Match model consumed by the mapper.
//!
//! A [`MatchResult`] is an ordered list of [`Group`]s. Ordinal 0 is always the
//! whole match; every later group carries a name and the strings it captured,
//! in capture order. A group that repeated (inside a quantifier) holds one
//! capture per repetition; a group that did not participate holds none.

use smol_str::SmolStr;

/// One named sub-match and everything it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    name: SmolStr,
    captures: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Group {
            name: name.into(),
            captures: Vec::new(),
        }
    }

    pub fn with_captures<I, S>(name: impl Into<SmolStr>, captures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Group {
            name: name.into(),
            captures: captures.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    pub fn push(&mut self, capture: impl Into<String>) {
        self.captures.push(capture.into());
    }

    /// Last capture, which is what a non-repeating group matched.
    pub fn value(&self) -> Option<&str> {
        self.captures.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

/// The groups of a single match, whole match first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    groups: Vec<Group>,
}

/// Name given to the whole-match group at ordinal 0.
pub const WHOLE_MATCH: &str = "0";

impl MatchResult {
    /// Start a match result whose ordinal 0 group captured `whole`.
    pub fn new(whole: impl Into<String>) -> Self {
        let whole: String = whole.into();
        MatchResult {
            groups: vec![Group::with_captures(WHOLE_MATCH, [whole])],
        }
    }

    /// Build from groups listed in ordinal order, the first being the whole match.
    ///
    /// An empty list yields a result with an empty whole-match group.
    pub fn from_groups(groups: Vec<Group>) -> Self {
        if groups.is_empty() {
            return MatchResult {
                groups: vec![Group::new(WHOLE_MATCH)],
            };
        }
        MatchResult { groups }
    }

    /// Append a group with the given captures.
    pub fn with_group<I, S>(mut self, name: impl Into<SmolStr>, captures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(Group::with_captures(name, captures));
        self
    }

    /// Append one capture to the named group, creating the group if needed.
    pub fn push_capture(&mut self, name: &str, capture: impl Into<String>) {
        match self.groups.iter_mut().skip(1).find(|g| g.name() == name) {
            Some(group) => group.push(capture),
            None => {
                let mut group = Group::new(name);
                group.push(capture);
                self.groups.push(group);
            }
        }
    }

    /// All groups including ordinal 0.
    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Groups at ordinal 1 and above.
    pub fn named_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().skip(1)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.named_groups().find(|g| g.name() == name)
    }

    pub fn whole_match(&self) -> Option<&str> {
        self.groups.first().and_then(Group::value)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when there is nothing beyond the whole match.
    pub fn is_empty(&self) -> bool {
        self.groups.len() <= 1
    }
}

#[cfg(feature = "regex")]
impl MatchResult {
    /// Collect the named groups of a `regex` match.
    ///
    /// `regex` only reports the last repetition of a group, so every group
    /// built here holds at most one capture. Groups that did not participate
    /// are kept with no captures.
    pub fn from_regex(re: &regex::Regex, caps: &regex::Captures<'_>) -> Self {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let mut result = MatchResult::new(whole);
        for (index, name) in re.capture_names().enumerate().skip(1) {
            let Some(name) = name else { continue };
            let group = match caps.get(index) {
                Some(m) => Group::with_captures(name, [m.as_str()]),
                None => Group::new(name),
            };
            result.groups.push(group);
        }
        result
    }
}

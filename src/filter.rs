use std::collections::HashSet;

use jiff::Timestamp;

use crate::data::RawItem;

/// Inclusive `[start, end]` range of instants.
///
/// A window with `start > end` is allowed and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: Timestamp) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Case-insensitive allow-list of author logins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorFilter(HashSet<String>);

impl AuthorFilter {
    /// Parse a comma-separated list like `"alice, BOB"`.
    ///
    /// Returns `None` when the list names nobody, meaning every author passes.
    pub fn parse(list: &str) -> Option<Self> {
        let names: HashSet<String> = list
            .split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        (!names.is_empty()).then_some(Self(names))
    }

    pub fn allows(&self, login: &str) -> bool {
        self.0.contains(&login.to_lowercase())
    }

    /// Names in a stable order, for logging
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Which timestamp the time predicate looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Merged,
    Created,
}

impl DateField {
    fn read(self, item: &RawItem) -> Option<Timestamp> {
        let raw = match self {
            Self::Merged => item.merged_at()?,
            Self::Created => item.created_at.as_str(),
        };
        raw.parse().ok()
    }
}

/// Time and author predicates, combined with AND
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemFilter<'a> {
    /// When set, items without a parseable value for this field never pass
    pub date_field: Option<DateField>,
    pub window: Option<&'a TimeWindow>,
    pub authors: Option<&'a AuthorFilter>,
}

impl ItemFilter<'_> {
    pub fn matches(&self, item: &RawItem) -> bool {
        self.matches_time(item) && self.matches_author(item)
    }

    fn matches_time(&self, item: &RawItem) -> bool {
        let Some(field) = self.date_field else {
            return true;
        };
        match field.read(item) {
            Some(instant) => self.window.is_none_or(|window| window.contains(instant)),
            None => false,
        }
    }

    fn matches_author(&self, item: &RawItem) -> bool {
        self.authors.is_none_or(|authors| authors.allows(item.author()))
    }

    pub fn apply(&self, items: Vec<RawItem>) -> Vec<RawItem> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

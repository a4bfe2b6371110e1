//! Record query engine
//!
//! A [`Query`] narrows and orders the full record list for display. It is a
//! pure transform over an in-memory slice: search text first, then the
//! mix-state filter, then the sort on whatever survived.

use crate::entities::PaintCan;

/// Which cans to keep by dilution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixFilter {
    #[default]
    All,
    /// Only cans not mixed with water
    PureOnly,
    /// Only cans mixed with water
    DilutedOnly,
}

impl MixFilter {
    fn keeps(self, can: &PaintCan) -> bool {
        match self {
            MixFilter::All => true,
            MixFilter::PureOnly => !can.paint.mixed,
            MixFilter::DilutedOnly => can.paint.mixed,
        }
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Store iteration order
    #[default]
    Default,
    /// Name, case-insensitive, A to Z
    NameAscending,
    /// Fullest cans first
    PercentDescending,
    /// Emptiest cans first
    PercentAscending,
}

/// Search, filter and sort settings for a record listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub search: String,
    pub mix: MixFilter,
    pub sort: SortKey,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn mix(mut self, mix: MixFilter) -> Self {
        self.mix = mix;
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// True when the query keeps every record in store order
    pub fn is_identity(&self) -> bool {
        self.search.is_empty() && self.mix == MixFilter::All && self.sort == SortKey::Default
    }

    /// Filter and order `records`
    ///
    /// Never adds records. All sorts are stable, so applying the same query
    /// to its own output returns it unchanged.
    pub fn apply(&self, records: &[PaintCan]) -> Vec<PaintCan> {
        let needle = self.search.to_lowercase();

        let mut kept: Vec<PaintCan> = records
            .iter()
            .filter(|can| matches_search(can, &needle))
            .filter(|can| self.mix.keeps(can))
            .cloned()
            .collect();

        match self.sort {
            SortKey::Default => {}
            SortKey::NameAscending => kept.sort_by_cached_key(|can| can.paint.name.to_lowercase()),
            SortKey::PercentDescending => kept.sort_by(|a, b| b.paint.percent.cmp(&a.paint.percent)),
            SortKey::PercentAscending => kept.sort_by_key(|can| can.paint.percent),
        }

        kept
    }
}

/// Case-insensitive substring match on name or code; `needle` is lowercased
fn matches_search(can: &PaintCan, needle: &str) -> bool {
    needle.is_empty()
        || can.paint.name.to_lowercase().contains(needle)
        || can.paint.code.to_lowercase().contains(needle)
}

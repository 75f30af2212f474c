//! Result ordering for listings and ranked search
//!
//! Listings are ordered by recency. Ranked search adds one tier in front:
//! rows whose name matches the term come before rows that only matched on
//! their description. Both variants end with the identity so that ties are
//! stable across pages.

use crate::core::filter::{WrittenPredicate, contains_ignore_case};
use crate::core::model::BusinessSummary;
use std::cmp::Ordering as CmpOrdering;

/// How matching businesses are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultOrder {
    /// `created_at DESC, id ASC`
    #[default]
    Recency,
    /// Name matches first, then description-only matches, then recency
    Ranked,
}

impl ResultOrder {
    /// Write the `ORDER BY` clause
    ///
    /// The ranked tier reuses the search pattern already bound by the
    /// predicate; without a search term it is omitted entirely.
    pub fn order_by_sql(&self, written: &WrittenPredicate) -> String {
        match (self, written.search_placeholder) {
            (ResultOrder::Ranked, Some(index)) => format!(
                "ORDER BY CASE WHEN b.name ILIKE ${index} THEN 1 ELSE 2 END, \
                 b.created_at DESC, b.id ASC"
            ),
            _ => "ORDER BY b.created_at DESC, b.id ASC".to_string(),
        }
    }

    /// Rank tier of a row for a term: 1 for a name match, 2 otherwise
    pub fn tier(name: &str, term: Option<&str>) -> u8 {
        match term {
            Some(term) if contains_ignore_case(name, term) => 1,
            Some(_) => 2,
            None => 0,
        }
    }

    /// In-memory comparator equivalent to [`ResultOrder::order_by_sql`]
    pub fn compare(
        &self,
        term: Option<&str>,
        a: &BusinessSummary,
        b: &BusinessSummary,
    ) -> CmpOrdering {
        let by_recency = || {
            b.business
                .created_at
                .cmp(&a.business.created_at)
                .then_with(|| a.business.id.cmp(&b.business.id))
        };

        match self {
            ResultOrder::Recency => by_recency(),
            ResultOrder::Ranked => Self::tier(&a.business.name, term)
                .cmp(&Self::tier(&b.business.name, term))
                .then_with(by_recency),
        }
    }
}

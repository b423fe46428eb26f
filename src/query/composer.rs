//! Query composer: filters, sort and pagination combined into retrieval and count plans.

use crate::query::{build, Pagination, ParsedQueryIntent, Predicate, SortField};
use crate::schema::TableDescriptor;

/// Half-open row window `[start, end)`. `end == None` means unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: u64,
    pub end: Option<u64>,
}

impl Window {
    pub const UNBOUNDED: Window = Window { start: 0, end: None };

    pub fn limit(&self) -> Option<u64> {
        self.end.map(|e| e.saturating_sub(self.start))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaginationMode {
    Page { page: u64, per_page: u64 },
    Range,
}

/// Everything the store needs for the primary fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievalPlan {
    pub predicates: Vec<Predicate>,
    pub sort: Vec<SortField>,
    pub window: Window,
}

/// Filter-only plan for total-count reporting.
#[derive(Clone, Debug, PartialEq)]
pub struct CountPlan {
    pub predicates: Vec<Predicate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    pub retrieval: RetrievalPlan,
    pub count: CountPlan,
    pub mode: PaginationMode,
}

pub fn plan(intent: &ParsedQueryIntent, table: &TableDescriptor) -> QueryPlan {
    let predicates = build(&intent.filters, table);
    let sort: Vec<SortField> = intent
        .sort
        .iter()
        .filter(|s| {
            let known = table.has_column(&s.column);
            if !known {
                tracing::debug!(table = %table.resource, column = %s.column, "sort column ignored");
            }
            known
        })
        .cloned()
        .collect();
    let mode = if intent.pagination.is_range() {
        PaginationMode::Range
    } else {
        PaginationMode::Page {
            page: intent.pagination.page,
            per_page: intent.pagination.per_page,
        }
    };
    QueryPlan {
        retrieval: RetrievalPlan {
            predicates: predicates.clone(),
            sort,
            window: window(&intent.pagination),
        },
        count: CountPlan { predicates },
        mode,
    }
}

/// Largest offset a store is asked for; bounds must fit a signed 64-bit LIMIT/OFFSET.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Range keys take absolute precedence over page keys:
/// start+end, then start+limit, then page/per_page. A lone `_end` or `_limit` counts
/// from 0; a lone `_start` is open-ended.
pub fn window(p: &Pagination) -> Window {
    if !p.is_range() {
        let start = (p.page - 1).saturating_mul(p.per_page).min(MAX_OFFSET);
        return Window {
            start,
            end: Some(start.saturating_add(p.per_page).min(MAX_OFFSET)),
        };
    }
    let raw_start = p.start.unwrap_or(0);
    let start = raw_start.max(0) as u64;
    let end = match (p.end, p.limit) {
        (Some(end), _) => Some(end.max(0) as u64),
        (None, Some(limit)) => Some(raw_start.saturating_add(limit.max(0)).max(0) as u64),
        (None, None) => None,
    };
    Window {
        start: start.min(MAX_OFFSET),
        end: end.map(|e| e.max(start).min(MAX_OFFSET)),
    }
}

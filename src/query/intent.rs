//! Query parameter parser: raw parameters -> typed, validated intent.
//!
//! `parse` cannot fail. Malformed pagination, sort or embed tokens are dropped or
//! replaced by defaults, and every non-reserved key is passed on as a filter candidate.

use crate::query::{ParamValue, RawParams};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;

const RESERVED: &[&str] = &["_page", "_per_page", "_start", "_end", "_limit", "_sort", "_embed"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page, at least 1.
    pub page: u64,
    /// Rows per page, within 1..=100.
    pub per_page: u64,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub limit: Option<i64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            start: None,
            end: None,
            limit: None,
        }
    }
}

impl Pagination {
    /// Any range key present switches pagination to range mode.
    pub fn is_range(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.limit.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortField {
    pub column: String,
    pub direction: SortDirection,
}

/// A non-reserved parameter: raw key (column plus optional operator suffix) and value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterEntry {
    pub key: String,
    pub value: ParamValue,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedQueryIntent {
    pub pagination: Pagination,
    pub sort: Vec<SortField>,
    pub embed: Vec<String>,
    pub filters: Vec<FilterEntry>,
}

pub fn parse(params: &RawParams) -> ParsedQueryIntent {
    let number = |key: &str| params.get(key).and_then(|v| coerce_integer(v.first()));

    let pagination = Pagination {
        page: number("_page").map_or(DEFAULT_PAGE, |n| n.max(1) as u64),
        per_page: number("_per_page").map_or(DEFAULT_PER_PAGE, |n| n.clamp(1, MAX_PER_PAGE as i64) as u64),
        start: number("_start"),
        end: number("_end"),
        limit: number("_limit"),
    };

    let sort = params.get("_sort").map(parse_sort).unwrap_or_default();
    let embed = params.get("_embed").map(parse_embed).unwrap_or_default();
    let filters = params
        .iter()
        .filter(|(k, _)| !RESERVED.contains(k))
        .map(|(k, v)| FilterEntry {
            key: k.to_string(),
            value: v.clone(),
        })
        .collect();

    ParsedQueryIntent {
        pagination,
        sort,
        embed,
        filters,
    }
}

/// Strict integer parse with a permissive fallback: decimal tokens are truncated,
/// anything else is absent.
pub fn coerce_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(f.trunc() as i64),
        _ => None,
    }
}

fn parse_sort(value: &ParamValue) -> Vec<SortField> {
    value
        .values()
        .into_iter()
        .flat_map(|v| v.split(','))
        .filter_map(|token| {
            let token = token.trim();
            let (column, direction) = match token.strip_prefix('-') {
                Some(rest) => (rest.trim(), SortDirection::Desc),
                None => (token, SortDirection::Asc),
            };
            (!column.is_empty()).then(|| SortField {
                column: column.to_string(),
                direction,
            })
        })
        .collect()
}

fn parse_embed(value: &ParamValue) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for key in value.values().into_iter().flat_map(|v| v.split(',')) {
        let key = key.trim();
        if !key.is_empty() && !out.iter().any(|k| k == key) {
            out.push(key.to_string());
        }
    }
    out
}

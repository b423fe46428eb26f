//! List response: bare JSON array with `X-Total-Count`, plus a `Link` header in page mode.

use crate::query::PaginationMode;
use crate::service::ListResult;
use crate::store::Row;
use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

const PAGE_KEYS: [&str; 2] = ["_page", "_per_page"];

pub struct ListResponse {
    pub rows: Vec<Row>,
    pub total: u64,
    /// `first`/`prev`/`next`/`last` value, page mode only.
    pub link: Option<String>,
}

impl ListResponse {
    /// `path` and `query` are the request's, used verbatim for the page links.
    pub fn new(result: ListResult, path: &str, query: Option<&str>) -> Self {
        let link = match result.mode {
            PaginationMode::Page { page, per_page } => {
                Some(link_header(path, query.unwrap_or(""), page, per_page, result.total))
            }
            PaginationMode::Range => None,
        };
        ListResponse {
            rows: result.rows,
            total: result.total,
            link,
        }
    }
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        let mut res = (StatusCode::OK, Json(self.rows)).into_response();
        let headers = res.headers_mut();
        headers.insert(TOTAL_COUNT, HeaderValue::from(self.total));
        if let Some(link) = self.link.and_then(|l| HeaderValue::from_str(&l).ok()) {
            headers.insert(header::LINK, link);
        }
        res
    }
}

/// Last page is at least 1 so an empty result still links to itself.
pub fn last_page(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

pub fn link_header(path: &str, query: &str, page: u64, per_page: u64, total: u64) -> String {
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or("");
            !pair.is_empty() && !PAGE_KEYS.contains(&key)
        })
        .collect();
    let href = |p: u64| {
        let mut q = kept.clone().join("&");
        if !q.is_empty() {
            q.push('&');
        }
        format!("<{}?{}_page={}&_per_page={}>", path, q, p, per_page)
    };

    let last = last_page(total, per_page);
    let mut links = vec![format!("{}; rel=\"first\"", href(1))];
    if page > 1 {
        links.push(format!("{}; rel=\"prev\"", href((page - 1).min(last))));
    }
    if page < last {
        links.push(format!("{}; rel=\"next\"", href(page + 1)));
    }
    links.push(format!("{}; rel=\"last\"", href(last)));
    links.join(", ")
}

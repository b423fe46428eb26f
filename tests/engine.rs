mod common;

use async_trait::async_trait;
use common::{ids, params, service};
use relay_rest::query::{CountPlan, PaginationMode, Predicate, RetrievalPlan};
use relay_rest::{AppError, QueryService, Row, Store, StoreError, TableDescriptor};
use serde_json::{json, Value};
use std::sync::Arc;

#[tokio::test]
async fn page_two_of_five() {
    let res = service().list("users", &params(&[("_page", "2"), ("_per_page", "5")])).await.unwrap();
    assert_eq!(ids(&res.rows), vec![6, 7, 8, 9, 10]);
    assert_eq!(res.total, 15);
    assert_eq!(res.mode, PaginationMode::Page { page: 2, per_page: 5 });
}

#[tokio::test]
async fn range_window_wins_over_page() {
    let res = service()
        .list("users", &params(&[("_start", "3"), ("_end", "7"), ("_page", "3")]))
        .await
        .unwrap();
    assert_eq!(ids(&res.rows), vec![4, 5, 6, 7]);
    assert_eq!(res.mode, PaginationMode::Range);
}

#[tokio::test]
async fn no_params_returns_default_page_and_full_total() {
    let res = service().list("users", &params(&[])).await.unwrap();
    assert_eq!(ids(&res.rows), (1..=10).collect::<Vec<_>>());
    assert_eq!(res.total, 15);
}

#[tokio::test]
async fn total_ignores_window_but_not_filters() {
    let res = service()
        .list("users", &params(&[("id_gte", "13"), ("_start", "0"), ("_end", "1")]))
        .await
        .unwrap();
    assert_eq!(ids(&res.rows), vec![13]);
    assert_eq!(res.total, 3);
}

#[tokio::test]
async fn descending_sort_reverses_ascending() {
    let svc = service();
    let asc = svc.list("users", &params(&[("_sort", "fullName"), ("_start", "0")])).await.unwrap();
    let desc = svc.list("users", &params(&[("_sort", "-fullName"), ("_start", "0")])).await.unwrap();
    let mut reversed = ids(&asc.rows);
    reversed.reverse();
    assert_eq!(ids(&desc.rows), reversed);
    assert_eq!(asc.rows.len(), 15);
}

#[tokio::test]
async fn unknown_sort_columns_are_dropped() {
    let svc = service();
    let plain = svc.list("users", &params(&[("_sort", "fullName")])).await.unwrap();
    let noisy = svc.list("users", &params(&[("_sort", "bogus,fullName")])).await.unwrap();
    assert_eq!(ids(&plain.rows), ids(&noisy.rows));
}

#[tokio::test]
async fn like_is_case_sensitive_substring() {
    let res = service().list("users", &params(&[("fullName_like", "Ali")])).await.unwrap();
    assert_eq!(ids(&res.rows), vec![1]);
    let res = service().list("users", &params(&[("fullName_like", "ali")])).await.unwrap();
    assert_eq!(ids(&res.rows), vec![2, 3]);
}

#[tokio::test]
async fn equality_lists_and_typed_values() {
    let svc = service();
    let res = svc.list("users", &params(&[("id", "2,4,99")])).await.unwrap();
    assert_eq!(ids(&res.rows), vec![2, 4]);
    let res = svc.list("users", &params(&[("active", "true"), ("id_lte", "5")])).await.unwrap();
    assert_eq!(ids(&res.rows), vec![1, 3, 5]);
    let res = svc.list("users", &params(&[("nickname", "x")])).await.unwrap();
    assert_eq!(res.total, 15);
}

#[tokio::test]
async fn embeds_belongs_to_as_object_or_null() {
    let res = service().list("posts", &params(&[("_embed", "user")])).await.unwrap();
    assert_eq!(res.rows[0]["user"]["fullName"], json!("Alice"));
    assert_eq!(res.rows[2]["user"]["id"], json!(2));
    assert_eq!(res.rows[3]["user"], Value::Null);
}

#[tokio::test]
async fn embeds_has_many_as_list_or_empty() {
    let res = service()
        .list("users", &params(&[("_embed", "posts"), ("_start", "0"), ("_end", "3")]))
        .await
        .unwrap();
    let titles = |v: &Value| -> Vec<String> {
        v.as_array().unwrap().iter().map(|p| p["title"].as_str().unwrap().to_string()).collect()
    };
    assert_eq!(titles(&res.rows[0]["posts"]), vec!["Hello", "Again"]);
    assert_eq!(titles(&res.rows[1]["posts"]), vec!["Travel"]);
    assert_eq!(res.rows[2]["posts"], json!([]));
}

#[tokio::test]
async fn embed_keys_keep_request_spelling_and_skip_unknowns() {
    let res = service()
        .list("posts", &params(&[("_embed", "users,comments,tags"), ("id", "1")]))
        .await
        .unwrap();
    let row = &res.rows[0];
    assert_eq!(row["users"]["id"], json!(1));
    assert_eq!(row["comments"].as_array().unwrap().len(), 1);
    assert!(!row.contains_key("tags"));
    assert!(!row.contains_key("user"));
}

#[tokio::test]
async fn unknown_resource_is_not_found() {
    let err = service().list("widgets", &params(&[])).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn read_by_id_with_embed() {
    let svc = service();
    let row = svc.read("users", "1", &params(&[("_embed", "posts")])).await.unwrap();
    assert_eq!(row["fullName"], json!("Alice"));
    assert_eq!(row["posts"].as_array().unwrap().len(), 2);
    assert!(matches!(svc.read("users", "99", &params(&[])).await, Err(AppError::NotFound(_))));
    assert!(matches!(svc.read("users", "abc", &params(&[])).await, Err(AppError::NotFound(_))));
}

struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn fetch(&self, _: &TableDescriptor, _: &RetrievalPlan) -> Result<Vec<Row>, StoreError> {
        Err(StoreError::Document("connection reset".into()))
    }

    async fn count(&self, _: &TableDescriptor, _: &CountPlan) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn fetch_related(&self, _: &TableDescriptor, _: &[Predicate]) -> Result<Vec<Row>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn store_failures_propagate() {
    let catalog = service().catalog().clone();
    let svc = QueryService::new(Arc::new(catalog), Arc::new(FailingStore), Default::default());
    let err = svc.list("users", &params(&[])).await.unwrap_err();
    match err {
        AppError::Store(e) => assert!(e.to_string().contains("connection reset")),
        other => panic!("unexpected error: {other}"),
    }
}

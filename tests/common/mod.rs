#![allow(dead_code)]

use relay_rest::{extract_tables, MemoryStore, NamingConvention, QueryService, RawParams, SchemaDefinition};
use serde_json::{json, Value};
use std::sync::Arc;

/// 15 users, 4 posts (one without an author), 2 comments.
pub fn document() -> Value {
    let names = [
        "Alice", "alina", "Malik", "Bruno", "Chen", "Dara", "Emeka", "Farah", "Goran", "Hana", "Ivo",
        "Jun", "Kofi", "Lena", "Mira",
    ];
    let users: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"id": i + 1, "fullName": name, "active": i % 2 == 0}))
        .collect();
    json!({
        "users": users,
        "posts": [
            {"id": 1, "title": "Hello", "userId": 1},
            {"id": 2, "title": "Again", "userId": 1},
            {"id": 3, "title": "Travel", "userId": 2},
            {"id": 4, "title": "Orphan", "userId": null}
        ],
        "comments": [
            {"id": 1, "body": "Nice", "postId": 1},
            {"id": 2, "body": "Agreed", "postId": 3}
        ]
    })
}

pub fn service() -> QueryService {
    let doc = document();
    let store = MemoryStore::from_document(&doc).unwrap();
    let naming = NamingConvention::default();
    let catalog = extract_tables(&SchemaDefinition::infer_from_document(&doc), &naming).into_catalog();
    QueryService::new(Arc::new(catalog), Arc::new(store), naming)
}

pub fn params(pairs: &[(&str, &str)]) -> RawParams {
    RawParams::from_pairs(pairs.iter().copied())
}

pub fn ids(rows: &[relay_rest::Row]) -> Vec<i64> {
    rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

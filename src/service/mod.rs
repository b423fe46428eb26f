//! QueryService: request pipeline over the catalog and a store.

pub mod embed;
mod query;
pub use query::{ListResult, QueryService};

//! Per-request query translation: parameters -> intent -> predicates -> plans.

pub mod composer;
pub mod filter;
pub mod intent;
pub mod params;

pub use composer::*;
pub use filter::*;
pub use intent::*;
pub use params::*;

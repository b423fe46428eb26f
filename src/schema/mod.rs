//! Schema inspection: raw definitions in, immutable table descriptors out.

pub mod definition;
pub mod descriptor;
pub mod inspector;
pub mod loader;

pub use definition::*;
pub use descriptor::*;
pub use inspector::*;
pub use loader::*;

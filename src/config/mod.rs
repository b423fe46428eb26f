pub mod naming;
pub mod settings;

pub use naming::*;
pub use settings::*;

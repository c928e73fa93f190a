pub mod model;
pub mod record;
pub mod types;

pub use model::*;
pub use record::*;
pub use types::*;

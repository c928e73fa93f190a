pub mod analyzer;
pub mod consistency;
pub mod numbers;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod rule;
pub mod schema;
pub mod types;

pub use analyzer::*;
pub use pipeline::*;
pub use report::*;
pub use rule::Rule;
pub use types::*;

pub mod generator;
pub mod pipeline;
pub mod prompt;

pub use generator::*;
pub use pipeline::*;
pub use prompt::*;

pub mod kernel;
pub mod python;
pub mod sandbox;

pub use kernel::*;
pub use python::*;
pub use sandbox::*;

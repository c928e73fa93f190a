pub mod backup;
pub mod pass;
pub mod targeted;
pub mod transforms;

pub use backup::*;
pub use pass::*;
pub use targeted::*;
pub use transforms::fix_code;

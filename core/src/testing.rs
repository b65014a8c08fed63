pub mod diff;
pub mod mode;
pub mod result;
pub mod runner;

pub use diff::*;
pub use mode::*;
pub use result::*;
pub use runner::*;

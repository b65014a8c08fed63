pub mod error;
pub mod filter;
pub mod model;
pub mod parser;
pub mod render;

pub use error::*;
pub use filter::*;
pub use model::*;
pub use parser::*;
pub use render::*;

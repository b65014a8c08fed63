pub mod cmd;
pub mod util;

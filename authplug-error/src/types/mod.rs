pub mod backend;
pub mod config;
pub mod password;

pub use backend::*;
pub use config::*;
pub use password::*;

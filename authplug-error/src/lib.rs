pub mod ext;
pub mod result;
pub mod stack;
pub mod status_code;
pub mod types;

pub use ext::*;
pub use result::*;
pub use stack::*;
pub use status_code::*;
pub use types::*;

pub type AuthplugResult<T> = Result<T, StackError>;

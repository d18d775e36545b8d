//! Built-in backend adapters.

pub mod redb;
pub mod sqlite;

pub use self::redb::{AclEntry, RedbBackend};
pub use self::sqlite::SqliteBackend;

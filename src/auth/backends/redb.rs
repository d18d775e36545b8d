//! Embedded redb credential store.
//!
//! Tables:
//! - `users`: username -> PBKDF2 record;
//! - `superusers`: username -> 1;
//! - `acls` (multimap): username -> `"<mask> <filter>"`.

use std::{fmt::Display, path::Path};

use authplug_error::BackendError;
use parking_lot::RwLock;
use redb::{
    Database, MultimapTableDefinition, ReadableMultimapTable, ReadableTable, TableDefinition,
};
use tracing::{debug, info, warn};

use crate::{
    auth::{topic::matches_filter, Access, Backend},
    config::AuthOptions,
};

pub const NAME: &str = "redb";

const USERS: TableDefinition<&str, &str> = TableDefinition::new("users");
const SUPERUSERS: TableDefinition<&str, u8> = TableDefinition::new("superusers");
const ACLS: MultimapTableDefinition<&str, &str> = MultimapTableDefinition::new("acls");

fn storage_err(e: impl Display) -> BackendError {
    BackendError::Query {
        backend: NAME,
        reason: e.to_string(),
    }
}

fn open_err(e: impl Display) -> BackendError {
    BackendError::Open {
        backend: NAME,
        reason: e.to_string(),
    }
}

/// Бэкенд поверх файла redb.
///
/// Чтения идут через MVCC-транзакции redb; блокировка нужна только для
/// teardown, который забирает базу.
pub struct RedbBackend {
    db: RwLock<Option<Database>>,
}

/// Одно ACL-правило: маска доступа и фильтр топиков.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub mask: u8,
    pub filter: String,
}

impl AclEntry {
    fn encode(&self) -> String {
        format!("{} {}", self.mask, self.filter)
    }

    fn decode(raw: &str) -> Option<Self> {
        let (mask, filter) = raw.split_once(' ')?;
        let mask = mask.parse::<u8>().ok()?;
        if filter.is_empty() {
            return None;
        }
        Some(Self {
            mask,
            filter: filter.to_string(),
        })
    }

    fn permits(
        &self,
        topic: &str,
        access: Access,
    ) -> bool {
        access.is_in(self.mask) && (self.filter == topic || matches_filter(&self.filter, topic))
    }
}

impl RedbBackend {
    /// Открывает существующую базу (опция `redb_path`).
    pub fn open(opts: &AuthOptions) -> Result<Self, BackendError> {
        let path = opts.require(NAME, "redb_path")?;
        let db = Database::open(path).map_err(|e| open_err(format!("{path}: {e}")))?;
        let backend = Self::with_database(db)?;
        info!(path, "redb backend opened");
        Ok(backend)
    }

    /// Создаёт базу, если её нет. Используется административными командами.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let db = Database::create(path.as_ref()).map_err(open_err)?;
        Self::with_database(db)
    }

    pub fn factory(opts: &AuthOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(Self::open(opts)?))
    }

    fn with_database(db: Database) -> Result<Self, BackendError> {
        // Таблицы создаются заранее, чтобы чтение не натыкалось на их
        // отсутствие.
        let tx = db.begin_write().map_err(open_err)?;
        {
            tx.open_table(USERS).map_err(open_err)?;
            tx.open_table(SUPERUSERS).map_err(open_err)?;
            tx.open_multimap_table(ACLS).map_err(open_err)?;
        }
        tx.commit().map_err(open_err)?;

        Ok(Self {
            db: RwLock::new(Some(db)),
        })
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&Database) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(BackendError::Closed { backend: NAME })?;
        f(db)
    }

    pub fn put_user(
        &self,
        username: &str,
        record: &str,
    ) -> Result<(), BackendError> {
        self.read(|db| {
            let tx = db.begin_write().map_err(storage_err)?;
            {
                let mut table = tx.open_table(USERS).map_err(storage_err)?;
                table.insert(username, record).map_err(storage_err)?;
            }
            tx.commit().map_err(storage_err)
        })
    }

    pub fn set_superuser(
        &self,
        username: &str,
        superuser: bool,
    ) -> Result<(), BackendError> {
        self.read(|db| {
            let tx = db.begin_write().map_err(storage_err)?;
            {
                let mut table = tx.open_table(SUPERUSERS).map_err(storage_err)?;
                if superuser {
                    table.insert(username, 1u8).map_err(storage_err)?;
                } else {
                    table.remove(username).map_err(storage_err)?;
                }
            }
            tx.commit().map_err(storage_err)
        })
    }

    pub fn add_acl(
        &self,
        username: &str,
        entry: &AclEntry,
    ) -> Result<(), BackendError> {
        let encoded = entry.encode();
        self.read(|db| {
            let tx = db.begin_write().map_err(storage_err)?;
            {
                let mut table = tx.open_multimap_table(ACLS).map_err(storage_err)?;
                table
                    .insert(username, encoded.as_str())
                    .map_err(storage_err)?;
            }
            tx.commit().map_err(storage_err)
        })
    }

    /// Все ACL-правила пользователя. Испорченные записи пропускаются.
    pub fn acl_entries(
        &self,
        username: &str,
    ) -> Result<Vec<AclEntry>, BackendError> {
        self.read(|db| {
            let tx = db.begin_read().map_err(storage_err)?;
            let table = tx.open_multimap_table(ACLS).map_err(storage_err)?;

            let mut entries = Vec::new();
            for item in table.get(username).map_err(storage_err)? {
                let raw = item.map_err(storage_err)?;
                match AclEntry::decode(raw.value()) {
                    Some(entry) => entries.push(entry),
                    None => warn!(username, raw = raw.value(), "skipping malformed acl entry"),
                }
            }
            Ok(entries)
        })
    }

    fn lookup_user(
        &self,
        username: &str,
    ) -> Result<Option<String>, BackendError> {
        self.read(|db| {
            let tx = db.begin_read().map_err(storage_err)?;
            let table = tx.open_table(USERS).map_err(storage_err)?;
            let record = table
                .get(username)
                .map_err(storage_err)?
                .map(|v| v.value().to_string());
            Ok(record)
        })
    }

    fn lookup_superuser(
        &self,
        username: &str,
    ) -> Result<bool, BackendError> {
        self.read(|db| {
            let tx = db.begin_read().map_err(storage_err)?;
            let table = tx.open_table(SUPERUSERS).map_err(storage_err)?;
            let flag = table.get(username).map_err(storage_err)?;
            Ok(flag.is_some_and(|v| v.value() != 0))
        })
    }
}

impl Backend for RedbBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn get_user(
        &self,
        username: &str,
    ) -> Option<String> {
        self.lookup_user(username).unwrap_or_else(|e| {
            warn!(error = %e, username, "user lookup failed");
            None
        })
    }

    fn is_superuser(
        &self,
        username: &str,
    ) -> bool {
        self.lookup_superuser(username).unwrap_or_else(|e| {
            warn!(error = %e, username, "superuser lookup failed");
            false
        })
    }

    fn acl_check(
        &self,
        username: &str,
        topic: &str,
        access: Access,
    ) -> bool {
        match self.acl_entries(username) {
            Ok(entries) => {
                let allowed = entries.iter().any(|e| e.permits(topic, access));
                debug!(username, topic, %access, entries = entries.len(), allowed, "redb acl");
                allowed
            }
            Err(e) => {
                warn!(error = %e, username, topic, "acl lookup failed");
                false
            }
        }
    }

    fn teardown(&self) {
        if self.db.write().take().is_some() {
            info!("redb backend closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    #[case("1 a/b", Some((1, "a/b")))]
    #[case("7 u/+/cmd", Some((7, "u/+/cmd")))]
    #[case("x a/b", None)]
    #[case("1 ", None)]
    #[case("1", None)]
    fn test_acl_entry_decode(
        #[case] raw: &str,
        #[case] expected: Option<(u8, &str)>,
    ) {
        let decoded = AclEntry::decode(raw).map(|e| (e.mask, e.filter));
        assert_eq!(decoded, expected.map(|(m, f)| (m, f.to_string())));
    }

    #[test]
    fn test_open_requires_path() {
        assert!(matches!(
            RedbBackend::open(&AuthOptions::new()),
            Err(BackendError::MissingOption { .. })
        ));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.redb");
        let opts = AuthOptions::from_pairs([("redb_path", path.display().to_string())]);
        assert!(matches!(
            RedbBackend::open(&opts),
            Err(BackendError::Open { .. })
        ));
    }

    #[test]
    fn test_superuser_toggle() {
        let dir = TempDir::new().unwrap();
        let backend = RedbBackend::create(dir.path().join("auth.redb")).unwrap();
        backend.set_superuser("admin", true).unwrap();
        assert!(backend.is_superuser("admin"));
        backend.set_superuser("admin", false).unwrap();
        assert!(!backend.is_superuser("admin"));
    }

    #[test]
    fn test_teardown_closes() {
        let dir = TempDir::new().unwrap();
        let backend = RedbBackend::create(dir.path().join("auth.redb")).unwrap();
        backend.put_user("alice", "record").unwrap();
        backend.teardown();
        assert_eq!(backend.get_user("alice"), None);
        assert!(matches!(
            backend.put_user("bob", "record"),
            Err(BackendError::Closed { .. })
        ));
    }
}

//! SQLite credential store.
//!
//! Options:
//! - `dbpath` (required) path to an existing database, opened read-only;
//! - `sqlite_userquery` (required) returns the password record for `?`
//!   (username) in the first column;
//! - `sqlite_superquery` returns a count, non-zero means superuser;
//! - `sqlite_aclquery` returns topic filters in the first column; binds the
//!   username and, when the statement has a second `?`, the access bits.

use std::{path::Path, time::Duration};

use authplug_error::BackendError;
use parking_lot::Mutex;
use rusqlite::{params_from_iter, types::Value, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, warn};

use crate::{
    auth::{topic::matches_filter, Access, Backend},
    config::AuthOptions,
};

pub const NAME: &str = "sqlite";

const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Бэкенд поверх SQLite-файла.
///
/// `rusqlite::Connection` не `Sync`, поэтому все запросы сериализуются через
/// мьютекс. `None` внутри означает, что бэкенд уже закрыт.
pub struct SqliteBackend {
    conn: Mutex<Option<Connection>>,
    user_query: String,
    super_query: Option<String>,
    acl_query: Option<String>,
}

impl SqliteBackend {
    pub fn open(opts: &AuthOptions) -> Result<Self, BackendError> {
        let path = opts.require(NAME, "dbpath")?;
        let user_query = opts.require(NAME, "sqlite_userquery")?.to_string();
        let super_query = opts.get_non_empty("sqlite_superquery").map(str::to_string);
        let acl_query = opts.get_non_empty("sqlite_aclquery").map(str::to_string);

        let conn = open_connection(Path::new(path))?;

        // Запросы проверяем сразу, чтобы опечатка в конфиге была фатальной.
        for query in std::iter::once(&user_query)
            .chain(super_query.iter())
            .chain(acl_query.iter())
        {
            conn.prepare_cached(query).map_err(|e| BackendError::Open {
                backend: NAME,
                reason: format!("invalid query `{query}`: {e}"),
            })?;
        }

        info!(path, superquery = super_query.is_some(), aclquery = acl_query.is_some(), "sqlite backend opened");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            user_query,
            super_query,
            acl_query,
        })
    }

    /// Фабрика для реестра.
    pub fn factory(opts: &AuthOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(Self::open(opts)?))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, BackendError> {
        let guard = self.conn.lock();
        let conn = guard
            .as_ref()
            .ok_or(BackendError::Closed { backend: NAME })?;
        f(conn).map_err(|e| BackendError::Query {
            backend: NAME,
            reason: e.to_string(),
        })
    }

    fn lookup_user(
        &self,
        username: &str,
    ) -> Result<Option<String>, BackendError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&self.user_query)?;
            let record: Option<Option<String>> = stmt
                .query_row([username], |row| row.get(0))
                .optional()?;
            Ok(record.flatten())
        })
    }

    fn lookup_superuser(
        &self,
        query: &str,
        username: &str,
    ) -> Result<bool, BackendError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(query)?;
            let count: Option<Option<i64>> =
                stmt.query_row([username], |row| row.get(0)).optional()?;
            Ok(count.flatten().unwrap_or(0) > 0)
        })
    }

    fn lookup_filters(
        &self,
        query: &str,
        username: &str,
        access: Access,
    ) -> Result<Vec<String>, BackendError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(query)?;
            let mut params = vec![Value::Text(username.to_string())];
            if stmt.parameter_count() >= 2 {
                params.push(Value::Integer(i64::from(access.bits())));
            }
            let rows = stmt.query_map(params_from_iter(params), |row| {
                row.get::<_, Option<String>>(0)
            })?;

            let mut filters = Vec::new();
            for row in rows {
                if let Some(filter) = row? {
                    filters.push(filter);
                }
            }
            Ok(filters)
        })
    }
}

fn open_connection(path: &Path) -> Result<Connection, BackendError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| BackendError::Open {
        backend: NAME,
        reason: format!("{}: {e}", path.display()),
    })?;

    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| BackendError::Open {
            backend: NAME,
            reason: e.to_string(),
        })?;

    Ok(conn)
}

impl Backend for SqliteBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn get_user(
        &self,
        username: &str,
    ) -> Option<String> {
        match self.lookup_user(username) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, username, "user lookup failed");
                None
            }
        }
    }

    fn is_superuser(
        &self,
        username: &str,
    ) -> bool {
        let Some(query) = self.super_query.as_deref() else {
            return false;
        };
        self.lookup_superuser(query, username).unwrap_or_else(|e| {
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
        let Some(query) = self.acl_query.as_deref() else {
            return false;
        };
        match self.lookup_filters(query, username, access) {
            Ok(filters) => {
                let allowed = filters
                    .iter()
                    .any(|f| f == topic || matches_filter(f, topic));
                debug!(username, topic, %access, filters = filters.len(), allowed, "sqlite acl");
                allowed
            }
            Err(e) => {
                warn!(error = %e, username, topic, "acl lookup failed");
                false
            }
        }
    }

    fn teardown(&self) {
        if let Some(conn) = self.conn.lock().take() {
            if let Err((_, e)) = conn.close() {
                warn!(error = %e, "sqlite close failed");
            }
            info!("sqlite backend closed");
        }
    }
}

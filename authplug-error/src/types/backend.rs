use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки хранилищ бэкендов.
///
/// Во время обработки запросов эти ошибки не покидают адаптер: они
/// логируются и превращаются в "записи нет" / "доступа нет". Наружу они
/// выходят только при инициализации, завёрнутые в `ConfigError::BackendInit`.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Обязательная опция бэкенда не задана.
    #[error("{backend}: missing required option `{key}`")]
    MissingOption { backend: &'static str, key: String },
    /// Не удалось открыть хранилище.
    #[error("{backend}: cannot open store: {reason}")]
    Open {
        backend: &'static str,
        reason: String,
    },
    /// Ошибка выполнения запроса к хранилищу.
    #[error("{backend}: query failed: {reason}")]
    Query {
        backend: &'static str,
        reason: String,
    },
    /// Хранилище уже закрыто (teardown).
    #[error("{backend}: store is closed")]
    Closed { backend: &'static str },
}

impl ErrorExt for BackendError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingOption { .. } => StatusCode::ConfigMissing,
            Self::Open { .. } => StatusCode::StorageUnavailable,
            Self::Query { .. } => StatusCode::QueryFailed,
            Self::Closed { .. } => StatusCode::StorageClosed,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

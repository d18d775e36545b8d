use thiserror::Error;

use crate::{BackendError, ErrorExt, StatusCode};

/// Фатальные ошибки конфигурации плагина.
///
/// Любая из них означает, что плагин не готов и брокер не должен начинать
/// обслуживать клиентов.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Ключ `backends` отсутствует или не содержит ни одного имени.
    #[error("no backends configured")]
    MissingBackends,
    /// Имя бэкенда не зарегистрировано в реестре.
    #[error("configured backend `{name}` doesn't exist")]
    UnknownBackend { name: String },
    /// Превышено максимальное число бэкендов в цепочке.
    #[error("too many backends configured: {count} (max {max})")]
    TooManyBackends { count: usize, max: usize },
    /// Конструктор бэкенда вернул ошибку.
    #[error("backend `{name}` failed to initialize: {source}")]
    BackendInit {
        name: String,
        #[source]
        source: BackendError,
    },
    /// Значение опции не удалось разобрать.
    #[error("invalid value for option `{key}`: {reason}")]
    InvalidOption { key: String, reason: String },
    /// Файл конфигурации не удалось прочитать или разобрать.
    #[error("cannot load configuration from {path}: {reason}")]
    Load { path: String, reason: String },
}

impl ErrorExt for ConfigError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingBackends => StatusCode::ConfigMissing,
            Self::UnknownBackend { .. } => StatusCode::UnknownBackend,
            Self::TooManyBackends { .. } => StatusCode::TooManyBackends,
            Self::BackendInit { .. } => StatusCode::BackendInitFailed,
            Self::InvalidOption { .. } | Self::Load { .. } => StatusCode::ConfigInvalid,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

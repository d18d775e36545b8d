pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggingConfig, LOG_LEVEL_ENV};
pub use handle::LoggingHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ошибки инициализации логирования.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid logging config: {0}")]
    InvalidConfig(String),
    #[error("cannot create log directory: {0}")]
    LogDir(#[from] std::io::Error),
    #[error("global subscriber already set: {0}")]
    AlreadyInitialized(String),
}

/// Инициализация логирования с конфигурацией.
///
/// Устанавливает глобальный подписчик, поэтому вызывается один раз за
/// процесс.
pub fn init_logging(mut config: LoggingConfig) -> Result<LoggingHandle, LoggingError> {
    config.apply_env_overrides();
    config.validate().map_err(LoggingError::InvalidConfig)?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter_from_config(&config);
    let mut layers = Vec::new();

    if config.console.enabled {
        layers.push(sinks::console::layer_with_config(&config));
    }

    let file_guard = if config.file.enabled {
        let (file_layer, guard) = sinks::file::layer_with_config(&config);
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        console_format = %config.console.format,
        file_enabled = config.file.enabled,
        log_dir = %config.file.dir.display(),
        "logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}

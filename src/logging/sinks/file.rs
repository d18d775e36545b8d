use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::registry::LookupSpan;

use crate::logging::{
    config::LoggingConfig,
    formatter::{self, BoxedLayer},
};

/// Файловый слой с ежедневной ротацией.
///
/// Возвращённый `WorkerGuard` нужно держать живым, иначе буфер не будет
/// сброшен на диск.
pub fn layer_with_config<S>(config: &LoggingConfig) -> (BoxedLayer<S>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let appender = daily(&config.file.dir, &config.file.prefix);
    let (writer, guard) = non_blocking(appender);
    let layer = formatter::build_formatter(&config.console, config.file.format, false, writer);
    (layer, guard)
}

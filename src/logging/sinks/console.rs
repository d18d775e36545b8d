use std::io::{self, Stderr};

use tracing_subscriber::registry::LookupSpan;

use crate::logging::{
    config::LoggingConfig,
    formatter::{self, BoxedLayer},
};

/// Консольный слой. Пишет в stderr: stdout принадлежит выводу CLI.
pub fn layer_with_config<S>(config: &LoggingConfig) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer: fn() -> Stderr = io::stderr;
    formatter::build_formatter(
        &config.console,
        config.console.format,
        config.console.with_ansi,
        writer,
    )
}

#[cfg(test)]
mod tests {
    use tracing::info;
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;
    use crate::logging::config::{ConsoleConfig, LogFormat};

    /// Тест проверяет, что слой регистрируется для всех форматов и
    /// логирование не паникует.
    #[test]
    fn test_layer_with_config_all_formats() {
        for format in [LogFormat::Compact, LogFormat::Pretty, LogFormat::Json] {
            let cfg = LoggingConfig {
                console: ConsoleConfig {
                    format,
                    with_ansi: false,
                    ..Default::default()
                },
                ..Default::default()
            };
            let subscriber = Registry::default().with(layer_with_config::<Registry>(&cfg));
            tracing::subscriber::with_default(subscriber, || {
                info!(format = %format, "console sink smoke test");
            });
        }
    }
}

use std::{collections::BTreeMap, fs, path::Path};

use authplug_error::ConfigError;
use config::{Config, Environment, File, Value};
use tracing::debug;

use super::AuthOptions;

/// Префикс переменных окружения, перекрывающих опции файла.
pub const ENV_PREFIX: &str = "AUTHPLUG";

impl AuthOptions {
    /// Загружает опции из файла и накладывает переменные `AUTHPLUG_*`.
    ///
    /// Файлы `.conf` читаются как конфигурация брокера (`auth_opt_*`), любые
    /// другие форматы (TOML, YAML, JSON) разбирает крейт `config`. Вложенные
    /// таблицы пропускаются.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load_err = |reason: String| ConfigError::Load {
            path: path.display().to_string(),
            reason,
        };

        let is_broker_conf = path.extension().and_then(|e| e.to_str()) == Some("conf");

        let mut builder = Config::builder();
        let mut opts = if is_broker_conf {
            let text = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
            AuthOptions::parse_mosquitto_conf(&text)
        } else {
            builder = builder.add_source(File::from(path));
            AuthOptions::new()
        };

        let cfg = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| load_err(e.to_string()))?;

        opts.merge(flatten(cfg).map_err(load_err)?);
        Ok(opts)
    }

    /// Только переменные окружения `AUTHPLUG_*`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| ConfigError::Load {
                path: "<env>".to_string(),
                reason: e.to_string(),
            })?;
        flatten(cfg).map_err(|reason| ConfigError::Load {
            path: "<env>".to_string(),
            reason,
        })
    }
}

fn flatten(cfg: Config) -> Result<AuthOptions, String> {
    let table: BTreeMap<String, Value> = cfg.try_deserialize().map_err(|e| e.to_string())?;

    let mut opts = AuthOptions::new();
    for (key, value) in table {
        match value.into_string() {
            Ok(s) => opts.set(key, s),
            Err(_) => debug!(key = %key, "skipping non-scalar option"),
        }
    }
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::Builder;

    use super::*;

    #[test]
    #[serial]
    fn test_load_broker_conf() {
        let mut file = Builder::new().suffix(".conf").tempfile().unwrap();
        writeln!(file, "auth_opt_backends sqlite").unwrap();
        writeln!(file, "auth_opt_dbpath /var/lib/auth.db").unwrap();

        let opts = AuthOptions::load(file.path()).unwrap();
        assert_eq!(opts.get("backends"), Some("sqlite"));
        assert_eq!(opts.get("dbpath"), Some("/var/lib/auth.db"));
    }

    #[test]
    #[serial]
    fn test_load_toml_with_env_overlay() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "backends = \"sqlite\"").unwrap();
        writeln!(file, "topic_prefix = \"u/%/#\"").unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"debug\"").unwrap();

        std::env::set_var("AUTHPLUG_BACKENDS", "redb");
        let result = AuthOptions::load(file.path());
        std::env::remove_var("AUTHPLUG_BACKENDS");

        let opts = result.unwrap();
        assert_eq!(opts.get("backends"), Some("redb"));
        assert_eq!(opts.get("topic_prefix"), Some("u/%/#"));
        assert_eq!(opts.get("logging"), None);
    }

    #[test]
    #[serial]
    fn test_load_missing_file() {
        let err = AuthOptions::load("/definitely/not/here.conf").unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }
}

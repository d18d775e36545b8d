use std::collections::HashMap;

use authplug_error::{BackendError, ConfigError};
use tracing::{error, info};

use super::{
    backends::{RedbBackend, SqliteBackend},
    Backend, BackendChain, MAX_BACKENDS,
};
use crate::config::AuthOptions;

/// Конструктор бэкенда: получает все опции плагина.
pub type BackendFactory =
    Box<dyn Fn(&AuthOptions) -> Result<Box<dyn Backend>, BackendError> + Send + Sync>;

/// Реестр видов бэкендов, доступных для опции `backends`.
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Пустой реестр.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Реестр со встроенными бэкендами `sqlite` и `redb`.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(super::backends::sqlite::NAME, SqliteBackend::factory);
        registry.register(super::backends::redb::NAME, RedbBackend::factory);
        registry
    }

    /// Регистрирует вид бэкенда `name`. Повторная регистрация заменяет
    /// фабрику.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) where
        F: Fn(&AuthOptions) -> Result<Box<dyn Backend>, BackendError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.factories.contains_key(name)
    }

    /// Зарегистрированные имена в алфавитном порядке.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Строит цепочку по опции `backends`.
    ///
    /// Все имена проверяются до вызова первой фабрики. Если фабрика падает,
    /// уже созданные бэкенды закрываются до возврата ошибки.
    pub fn build_chain(
        &self,
        opts: &AuthOptions,
    ) -> Result<BackendChain, ConfigError> {
        let names = opts.backend_names()?;

        if names.len() > MAX_BACKENDS {
            return Err(ConfigError::TooManyBackends {
                count: names.len(),
                max: MAX_BACKENDS,
            });
        }

        let mut factories = Vec::with_capacity(names.len());
        for name in &names {
            match self.factories.get(*name) {
                Some(factory) => factories.push((*name, factory)),
                None => {
                    error!(backend = name, "configured backend doesn't exist");
                    return Err(ConfigError::UnknownBackend {
                        name: name.to_string(),
                    });
                }
            }
        }

        let mut built: Vec<Box<dyn Backend>> = Vec::with_capacity(factories.len());
        for (name, factory) in factories {
            match factory(opts) {
                Ok(backend) => {
                    info!(backend = name, position = built.len(), "backend initialized");
                    built.push(backend);
                }
                Err(source) => {
                    error!(backend = name, error = %source, "backend failed to initialize");
                    for backend in built.iter().rev() {
                        backend.teardown();
                    }
                    return Err(ConfigError::BackendInit {
                        name: name.to_string(),
                        source,
                    });
                }
            }
        }

        BackendChain::new(built)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

use std::sync::atomic::{AtomicBool, Ordering};

use authplug_error::ConfigError;
use tracing::{debug, info};

use super::{password, Access, Backend, MAX_BACKENDS};

/// Упорядоченная цепочка бэкендов (от 1 до [`MAX_BACKENDS`]).
///
/// Порядок задаётся опцией `backends` и не меняется после инициализации.
pub struct BackendChain {
    backends: Vec<Box<dyn Backend>>,
    torn_down: AtomicBool,
}

impl BackendChain {
    pub fn new(backends: Vec<Box<dyn Backend>>) -> Result<Self, ConfigError> {
        if backends.is_empty() {
            return Err(ConfigError::MissingBackends);
        }
        if backends.len() > MAX_BACKENDS {
            return Err(ConfigError::TooManyBackends {
                count: backends.len(),
                max: MAX_BACKENDS,
            });
        }
        Ok(Self {
            backends,
            torn_down: AtomicBool::new(false),
        })
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Проверяет логин и пароль.
    ///
    /// Первый бэкенд, вернувший непустую запись, решает исход: дальше цепочка не
    /// опрашивается, даже если пароль не совпал.
    pub fn check_credential(
        &self,
        username: &str,
        password: &str,
    ) -> bool {
        if username.is_empty() || password.is_empty() {
            debug!("empty username or password");
            return false;
        }

        for backend in &self.backends {
            if let Some(record) = backend.get_user(username).filter(|r| !r.is_empty()) {
                let matched = password::verify(password, &record);
                debug!(username, backend = backend.name(), matched, "credential checked");
                return matched;
            }
        }

        debug!(username, "user not found in any backend");
        false
    }

    /// Есть ли в цепочке бэкенд, который считает пользователя
    /// суперпользователем или разрешает доступ к топику.
    pub fn permits(
        &self,
        username: &str,
        topic: &str,
        access: Access,
    ) -> bool {
        self.backends.iter().any(|backend| {
            let allowed =
                backend.is_superuser(username) || backend.acl_check(username, topic, access);
            if allowed {
                debug!(username, topic, %access, backend = backend.name(), "backend permits");
            }
            allowed
        })
    }

    /// Закрывает бэкенды в обратном порядке. Повторные вызовы ничего не
    /// делают.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        for backend in self.backends.iter().rev() {
            backend.teardown();
        }
        info!(backends = self.backends.len(), "backend chain torn down");
    }
}

impl Drop for BackendChain {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for BackendChain {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("BackendChain")
            .field("backends", &self.names())
            .finish()
    }
}

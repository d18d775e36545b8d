use authplug_error::{BackendError, ConfigError};

/// Префикс опций плагина в конфигурации брокера.
pub const AUTH_OPT_PREFIX: &str = "auth_opt_";

/// Опции плагина в виде упорядоченных пар ключ/значение.
///
/// Брокер передаёт их при инициализации как есть; плагин не изменяет их
/// после построения цепочки. Опции конкретных бэкендов передаются фабрикам
/// без интерпретации.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthOptions {
    pairs: Vec<(String, String)>,
}

impl AuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut opts = Self::new();
        for (k, v) in pairs {
            opts.set(k, v);
        }
        opts
    }

    /// Устанавливает значение ключа. Повторный ключ заменяет значение, но
    /// сохраняет исходную позицию.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Значение ключа, если оно задано и не пустое после trim.
    pub fn get_non_empty(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Обязательная опция бэкенда `backend`.
    pub fn require(
        &self,
        backend: &'static str,
        key: &str,
    ) -> Result<&str, BackendError> {
        self.get_non_empty(key)
            .ok_or_else(|| BackendError::MissingOption {
                backend,
                key: key.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Накладывает `other` поверх текущих опций.
    pub fn merge(
        &mut self,
        other: AuthOptions,
    ) {
        for (k, v) in other.pairs {
            self.set(k, v);
        }
    }

    /// Имена бэкендов из ключа `backends` в порядке перечисления.
    ///
    /// Пробелы вокруг имён отбрасываются, пустые элементы пропускаются.
    pub fn backend_names(&self) -> Result<Vec<&str>, ConfigError> {
        let names: Vec<&str> = self
            .get("backends")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if names.is_empty() {
            return Err(ConfigError::MissingBackends);
        }
        Ok(names)
    }

    /// Читает строки `auth_opt_<key> <value>` из конфигурации брокера.
    ///
    /// Остальные строки, комментарии и опции без значения игнорируются.
    pub fn parse_mosquitto_conf(text: &str) -> Self {
        let mut opts = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some(rest) = line.strip_prefix(AUTH_OPT_PREFIX) else {
                continue;
            };
            let Some((key, value)) = rest.split_once(char::is_whitespace) else {
                continue;
            };
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            opts.set(key, value);
        }
        opts
    }
}

impl<K, V> FromIterator<(K, V)> for AuthOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

use std::fmt;

/// Коды статуса для категоризации ошибок плагина.
///
/// # Диапазоны:
/// - 1xxx: Аргументы и хеширование паролей
/// - 5xxx: Хранилища бэкендов
/// - 9xxx: Конфигурация плагина (фатальные при init)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Аргументы и хеширование ===
    InvalidArgs = 1004,
    PasswordHashFailed = 1100,

    // === 5xxx: Хранилища ===
    StorageUnavailable = 5000,
    QueryFailed = 5001,
    StorageClosed = 5003,

    // === 9xxx: Конфигурация ===
    ConfigMissing = 9000,
    ConfigInvalid = 9001,
    UnknownBackend = 9002,
    TooManyBackends = 9003,
    BackendInitFailed = 9004,
}

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Ошибка конфигурации (диапазон 9xxx).
    ///
    /// Такие ошибки фатальны: плагин не должен начинать обслуживать клиентов.
    pub fn is_config_error(&self) -> bool {
        (9000..=9999).contains(&self.code())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки генерации хешей паролей.
///
/// Проверка пароля ошибок не возвращает: испорченная запись считается
/// несовпадением.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid hash parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl ErrorExt for PasswordError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidParams(_) => StatusCode::InvalidArgs,
            Self::Hash(_) => StatusCode::PasswordHashFailed,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

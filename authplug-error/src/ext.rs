use std::{any::Any, error::Error};

use crate::StatusCode;

/// Расширение для доменных ошибок плагина (object-safe).
///
/// Даёт код статуса и доступ к конкретному типу через
/// [`StackError`](crate::StackError).
pub trait ErrorExt: Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode;

    /// Возвращает ошибку как [`Any`], чтобы можно было выполнить downcast к
    /// конкретному типу.
    fn as_any(&self) -> &dyn Any;
}

use super::Access;

/// Максимальное число бэкендов в одной цепочке.
pub const MAX_BACKENDS: usize = 4;

/// Хранилище учётных записей и ACL-правил.
///
/// Реализации обязаны быть потокобезопасными: брокер может вызывать проверки
/// из нескольких потоков одновременно. Ошибки хранилища не поднимаются
/// наружу. Адаптер логирует их и отвечает "записи нет" или "доступа нет".
pub trait Backend: Send + Sync {
    /// Имя вида бэкенда (`sqlite`, `redb`, ...), используется в логах.
    fn name(&self) -> &str;

    /// Возвращает сохранённую PBKDF2-запись пароля пользователя.
    fn get_user(
        &self,
        username: &str,
    ) -> Option<String>;

    /// Является ли пользователь суперпользователем этого бэкенда.
    fn is_superuser(
        &self,
        username: &str,
    ) -> bool;

    /// Разрешён ли пользователю доступ `access` к топику `topic`.
    fn acl_check(
        &self,
        username: &str,
        topic: &str,
        access: Access,
    ) -> bool;

    /// Освобождает ресурсы хранилища. После вызова бэкенд больше не
    /// используется.
    fn teardown(&self) {}
}

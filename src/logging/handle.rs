use std::time::Instant;

use tracing_appender::non_blocking::WorkerGuard;

/// Handle для управления lifecycle логирования.
///
/// Держит `WorkerGuard` файлового слоя; при drop буфер сбрасывается на диск.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    /// Есть ли активный файловый вывод.
    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Явное завершение: сбрасывает файловый буфер.
    pub fn shutdown(mut self) {
        let start = Instant::now();
        if let Some(guard) = self.file_guard.take() {
            tracing::debug!("flushing file log sink");
            drop(guard);
        }
        // Подписчик может уже не писать в файл, поэтому только stderr-слой
        // увидит это событие.
        tracing::debug!(
            shutdown_duration_ms = start.elapsed().as_millis() as u64,
            "logging shutdown completed"
        );
    }
}

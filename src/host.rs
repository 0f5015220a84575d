//! Интерфейсы, которые должно предоставить приложение-хозяин
//!
//! Документ (список субтитров) и плеер живут вне библиотеки.

use std::path::PathBuf;

/// Документ с субтитрами, у которого есть текущий субтитр
pub trait DocumentModel {
    /// Положение курсора; восстанавливается после правок
    type Position;

    fn position(&self) -> Self::Position;
    fn restore_position(&mut self, position: Self::Position);

    /// Начало текущего субтитра (`None` - курсор не на субтитре)
    fn current_start_ms(&self) -> Option<u64>;
    /// Конец текущего субтитра
    fn current_stop_ms(&self) -> Option<u64>;

    fn set_start_ms(&mut self, ms: u64);
    fn set_stop_ms(&mut self, ms: u64);
    fn adjust_start_ms(&mut self, delta_ms: i64);
    fn adjust_stop_ms(&mut self, delta_ms: i64);

    /// Перейти к предыдущему субтитру; `false`, если его нет
    fn backward_entry(&mut self) -> bool;
    /// Перейти к следующему субтитру; `false`, если его нет
    fn forward_entry(&mut self) -> bool;

    /// Минимальный зазор между соседними субтитрами
    fn spacing_ms(&self) -> u64;

    /// Сообщить зависимым представлениям, что времена изменились
    fn times_adjusted(&mut self);
}

/// Медиаплеер. Общий для всего процесса, поэтому методы принимают `&self`.
pub trait Player: Send + Sync {
    fn jump(&self, ms: u64);
    fn pause(&self);
    fn unpause(&self);

    /// Зацикливание текущего субтитра
    fn is_looping(&self) -> bool;
    fn set_looping(&self, enabled: bool);

    /// Синхронизация курсора документа с позицией плеера
    fn is_syncing(&self) -> bool;
    fn set_syncing(&self, enabled: bool);

    /// Открытый медиафайл
    fn media_file(&self) -> Option<PathBuf>;
}

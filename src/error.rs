//! Модуль обработки ошибок библиотеки subwave
//!
//! Ошибки возвращаются только при построении значений (окно, запрос, конфигурация)
//! и при поиске ffmpeg. Сбои самого рендеринга сюда не попадают: асинхронный
//! рендер молча отбрасывается, синхронный возвращает `None`.

use thiserror::Error;

/// Ошибки библиотеки subwave
#[derive(Debug, Error)]
pub enum WaveformError {
    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Некорректное временное окно (start >= stop)
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    /// Некорректный запрос на рендеринг
    #[error("Invalid render request: {0}")]
    InvalidRequest(String),

    /// Ошибка конфигурации
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// ffmpeg не найден
    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    /// ffmpeg завершился с ошибкой
    #[error("Backend error: {0}")]
    Backend(String),

    /// Представление уже закрыто
    #[error("Waveform view is closed")]
    ViewClosed,

    /// Другая ошибка
    #[error("Other error: {0}")]
    Other(String),
}

impl From<&str> for WaveformError {
    fn from(s: &str) -> Self {
        WaveformError::Other(s.to_string())
    }
}

impl From<String> for WaveformError {
    fn from(s: String) -> Self {
        WaveformError::Other(s)
    }
}

/// Тип Result для библиотеки subwave
pub type Result<T> = std::result::Result<T, WaveformError>;

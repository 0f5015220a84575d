//! Вспомогательные модули: поиск ffmpeg и настройка логгера

pub mod ffmpeg;
pub mod logger;

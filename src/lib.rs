//! Основной файл библиотеки subwave
//!
//! Библиотека рисует волну для отрезка медиафайла через ffmpeg и позволяет
//! править время субтитров мышью прямо на картинке: клик задаёт границу,
//! перетаскивание с Shift сдвигает её, средняя кнопка даёт короткое прослушивание.
//!
//! Документ и плеер предоставляет приложение через трейты из [`host`].

pub mod config;
pub mod error;
pub mod filter;
pub mod gesture;
pub mod host;
pub mod mapping;
pub mod overlay;
pub mod playback;
pub mod render;
pub mod utils;
pub mod view;
pub mod window;

use std::path::Path;

pub use crate::config::WaveformConfig;
pub use crate::error::{Result, WaveformError};
pub use crate::filter::FilterStyle;
pub use crate::gesture::{Action, Button, Dispatched, Gesture, Modifiers, PointerEvent};
pub use crate::host::{DocumentModel, Player};
pub use crate::overlay::{RefreshOutcome, SkipReason};
pub use crate::render::{RenderRequest, WaveformImage};
pub use crate::view::WaveformView;
pub use crate::window::TimeWindow;

/// Синхронно отрисовать окно медиафайла с настройками из `config`.
///
/// Возвращает `Ok(None)`, если ffmpeg ничего не выдал. Ошибка возможна только
/// при построении запроса (слишком длинное окно или нулевая ширина).
pub fn render_window_sync(
    config: &WaveformConfig,
    source: &Path,
    window: TimeWindow,
) -> Result<Option<WaveformImage>> {
    if config.exceeds_max_window(&window) {
        return Err(WaveformError::InvalidWindow(format!(
            "{} is longer than the configured maximum",
            window
        )));
    }
    let request = RenderRequest::from_config(source, window, config)?;
    let bytes = render::render_sync(Path::new(&config.ffmpeg_executable), &request);
    Ok(bytes.map(|bytes| WaveformImage {
        bytes,
        window,
        width_px: request.width_px,
        height_px: request.height_px,
    }))
}

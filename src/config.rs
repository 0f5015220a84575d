//! Модуль конфигурации библиотеки subwave
//!
//! Конфигурация общая для всех открытых представлений и обычно хранится в `Arc`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WaveformError};
use crate::filter::FilterStyle;
use crate::window::TimeWindow;

/// Конфигурация волны и взаимодействия с ней
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Путь или имя исполняемого файла ffmpeg
    pub ffmpeg_executable: String,
    /// Стиль отрисовки; из JSON читается только строка
    pub filter_style: FilterStyle,
    /// Высота картинки в пикселях
    pub height_px: u32,
    /// Горизонтальная плотность, пикселей на секунду
    pub pixels_per_second: f64,
    /// Окна длиннее этого значения не рендерятся (None - без ограничения)
    pub max_window_ms: Option<u64>,
    /// Длительность прослушивания по средней кнопке (0 - только переход)
    pub sample_ms: u64,
    /// Шаг сдвига по клику с Shift без перетаскивания
    pub step_ms: u64,
    /// Запас перед началом текущего субтитра
    pub padding_before_ms: u64,
    /// Запас после конца текущего субтитра
    pub padding_after_ms: u64,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            ffmpeg_executable: "ffmpeg".to_string(),
            filter_style: FilterStyle::default(),
            height_px: 40,
            pixels_per_second: 75.0,
            max_window_ms: None,
            sample_ms: 2000,
            step_ms: 100,
            padding_before_ms: 0,
            padding_after_ms: 0,
        }
    }
}

impl WaveformConfig {
    /// Загрузить конфигурацию из JSON-файла; отсутствующие поля берутся по умолчанию
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Проверка значений, которые нельзя выразить типами
    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg_executable.trim().is_empty() {
            return Err(WaveformError::Configuration(
                "ffmpeg_executable must not be empty".to_string(),
            ));
        }
        if self.height_px == 0 {
            return Err(WaveformError::Configuration(
                "height_px must be greater than zero".to_string(),
            ));
        }
        if !self.pixels_per_second.is_finite() || self.pixels_per_second <= 0.0 {
            return Err(WaveformError::Configuration(format!(
                "pixels_per_second must be positive, got {}",
                self.pixels_per_second
            )));
        }
        if self.max_window_ms == Some(0) {
            return Err(WaveformError::Configuration(
                "max_window_ms must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Ширина картинки для окна при текущей плотности
    pub fn image_width_for(&self, window: &TimeWindow) -> u32 {
        window.width_px(self.pixels_per_second)
    }

    /// Превышает ли окно допустимую длительность
    pub fn exceeds_max_window(&self, window: &TimeWindow) -> bool {
        self.max_window_ms
            .is_some_and(|max| window.duration_ms() > max)
    }

    /// Прослушивание включено
    pub fn sample_enabled(&self) -> bool {
        self.sample_ms > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WaveformConfig::default();
        config.validate().unwrap();
        assert_eq!(config.height_px, 40);
        assert_eq!(config.pixels_per_second, 75.0);
        assert!(config.max_window_ms.is_none());
        assert!(config.sample_enabled());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = WaveformConfig::from_json_str(
            r#"{ "ffmpeg_executable": "/opt/ffmpeg/bin/ffmpeg", "filter_style": ":colors=#ffcc00", "max_window_ms": 60000, "sample_ms": 0 }"#,
        )
        .unwrap();
        assert_eq!(config.ffmpeg_executable, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.filter_style.build(1, 1), ":colors=#ffcc00");
        assert_eq!(config.max_window_ms, Some(60000));
        assert!(!config.sample_enabled());
        assert_eq!(config.step_ms, 100);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(WaveformConfig::from_json_str(r#"{ "height_px": 0 }"#).is_err());
        assert!(WaveformConfig::from_json_str(r#"{ "pixels_per_second": -3.0 }"#).is_err());
        assert!(WaveformConfig::from_json_str(r#"{ "max_window_ms": 0 }"#).is_err());
        assert!(WaveformConfig::from_json_str(r#"{ "ffmpeg_executable": " " }"#).is_err());
    }

    #[test]
    fn loads_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("waveform.json");
        std::fs::write(&path, r#"{ "height_px": 80, "pixels_per_second": 100 }"#).unwrap();

        let config = WaveformConfig::from_json_file(&path).unwrap();
        assert_eq!(config.height_px, 80);
        let window = TimeWindow::new(0, 1500).unwrap();
        assert_eq!(config.image_width_for(&window), 150);
    }

    #[test]
    fn max_window_limit() {
        let config = WaveformConfig {
            max_window_ms: Some(10_000),
            ..WaveformConfig::default()
        };
        assert!(!config.exceeds_max_window(&TimeWindow::new(0, 10_000).unwrap()));
        assert!(config.exceeds_max_window(&TimeWindow::new(0, 10_001).unwrap()));
    }
}

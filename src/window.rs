//! Временное окно, которое отображается одной картинкой волны
//!
//! Окно полуоткрытое: `[start_ms, stop_ms)`. Пустое или перевёрнутое окно
//! построить нельзя, поэтому в рендеринг оно попасть не может.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WaveformError};

/// Полуоткрытый интервал времени в миллисекундах
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start_ms: u64,
    stop_ms: u64,
}

#[derive(Deserialize)]
struct RawWindow {
    start_ms: u64,
    stop_ms: u64,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = WaveformError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        TimeWindow::new(raw.start_ms, raw.stop_ms)
    }
}

impl TimeWindow {
    /// Создать окно; `start_ms` должен быть строго меньше `stop_ms`
    pub fn new(start_ms: u64, stop_ms: u64) -> Result<Self> {
        if start_ms >= stop_ms {
            return Err(WaveformError::InvalidWindow(format!(
                "start {}ms must be before stop {}ms",
                start_ms, stop_ms
            )));
        }
        Ok(Self { start_ms, stop_ms })
    }

    /// Окно вокруг субтитра с запасом до и после.
    /// Начало не уходит ниже нуля.
    pub fn around_entry(start_ms: u64, stop_ms: u64, before_ms: u64, after_ms: u64) -> Result<Self> {
        Self::new(
            start_ms.saturating_sub(before_ms),
            stop_ms.saturating_add(after_ms),
        )
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn stop_ms(&self) -> u64 {
        self.stop_ms
    }

    /// Длительность окна, всегда больше нуля
    pub fn duration_ms(&self) -> u64 {
        self.stop_ms - self.start_ms
    }

    pub fn contains(&self, ms: u64) -> bool {
        ms >= self.start_ms && ms < self.stop_ms
    }

    /// Ширина картинки для заданной плотности:
    /// `round(duration_ms * pixels_per_second / 1000)`
    pub fn width_px(&self, pixels_per_second: f64) -> u32 {
        let width = (self.duration_ms() as f64 * pixels_per_second / 1000.0).round();
        if width.is_finite() && width > 0.0 {
            width.min(u32::MAX as f64) as u32
        } else {
            0
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}ms, {}ms)", self.start_ms, self.stop_ms)
    }
}

//! Состояние оверлея одного представления
//!
//! Хранит показанную картинку и не более одного фонового рендеринга.
//! Новый запрос убивает предыдущий процесс; кроме того, каждому запросу
//! выдаётся номер, и применяется только результат последнего.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::config::WaveformConfig;
use crate::filter::FilterStyle;
use crate::render::{PendingRender, RenderCompletion, RenderRequest, WaveformImage, spawn_render};
use crate::window::TimeWindow;

/// Почему запрос на обновление ничего не запустил
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Показанная картинка уже соответствует окну
    UpToDate,
    /// Окно длиннее `max_window_ms`
    TooLong,
    /// Картинка получилась бы нулевой ширины
    EmptyImage,
    /// Это окно уже рендерится
    InFlight,
    /// ffmpeg не удалось запустить
    BackendUnavailable,
}

/// Итог `maybe_refresh`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Started { ticket: u64 },
    Skipped(SkipReason),
}

impl RefreshOutcome {
    pub fn started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

#[derive(Debug)]
pub struct OverlayState {
    executable: PathBuf,
    style: FilterStyle,
    max_window_ms: Option<u64>,
    displayed: Option<WaveformImage>,
    anchor: Option<usize>,
    pending: Option<PendingRender>,
    next_ticket: u64,
    completions: mpsc::UnboundedSender<RenderCompletion>,
}

impl OverlayState {
    /// Новое состояние; успешные рендеры отправляются в `completions`
    pub fn new(config: &WaveformConfig, completions: mpsc::UnboundedSender<RenderCompletion>) -> Self {
        Self {
            executable: PathBuf::from(&config.ffmpeg_executable),
            style: config.filter_style.clone(),
            max_window_ms: config.max_window_ms,
            displayed: None,
            anchor: None,
            pending: None,
            next_ticket: 0,
            completions,
        }
    }

    pub fn displayed_image(&self) -> Option<&WaveformImage> {
        self.displayed.as_ref()
    }

    /// Позиция в документе, к которой привязан оверлей
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<usize>) {
        self.anchor = anchor;
    }

    /// Ждём ли результат фонового рендеринга
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Окно рендеринга, результат которого ещё не применён
    pub fn pending_window(&self) -> Option<TimeWindow> {
        self.pending.as_ref().map(PendingRender::window)
    }

    /// Убить рендеринг другого окна: его картинка больше не нужна.
    /// Номер увеличивается, чтобы уже отправленный результат не прошёл проверку.
    fn abandon_pending_except(&mut self, window: TimeWindow) {
        if self.pending_window().is_some_and(|pending| pending != window) {
            if let Some(mut pending) = self.pending.take() {
                pending.cancel();
            }
            self.next_ticket += 1;
        }
    }

    /// Обновить картинку для окна, если это нужно.
    ///
    /// Слишком длинные окна не рендерятся даже при `force`.
    /// Без `force` пропускается окно, совпадающее с показанным или уже рендерящееся.
    /// При пропуске рендеринг другого окна прерывается.
    pub fn maybe_refresh(
        &mut self,
        source: &Path,
        window: TimeWindow,
        width_px: u32,
        height_px: u32,
        force: bool,
    ) -> RefreshOutcome {
        if self.max_window_ms.is_some_and(|max| window.duration_ms() > max) {
            debug!("Window {} exceeds the render limit, skipping", window);
            self.abandon_pending_except(window);
            return RefreshOutcome::Skipped(SkipReason::TooLong);
        }

        if !force {
            if self.displayed.as_ref().is_some_and(|image| image.window == window) {
                self.abandon_pending_except(window);
                return RefreshOutcome::Skipped(SkipReason::UpToDate);
            }
            if self.pending_window() == Some(window) {
                return RefreshOutcome::Skipped(SkipReason::InFlight);
            }
        }

        let request = match RenderRequest::new(source, window, width_px, height_px, &self.style) {
            Ok(request) => request,
            Err(e) => {
                debug!("Not rendering: {}", e);
                self.abandon_pending_except(window);
                return RefreshOutcome::Skipped(SkipReason::EmptyImage);
            }
        };

        // Не более одного процесса на представление
        if let Some(mut previous) = self.pending.take() {
            previous.cancel();
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        match spawn_render(&self.executable, request, ticket, self.completions.clone()) {
            Ok(pending) => {
                self.pending = Some(pending);
                RefreshOutcome::Started { ticket }
            }
            Err(e) => {
                warn!("Failed to start {}: {}", self.executable.display(), e);
                RefreshOutcome::Skipped(SkipReason::BackendUnavailable)
            }
        }
    }

    /// Применить доставленный результат.
    /// Возвращает `true`, если картинка заменена и нужна перерисовка.
    /// Неудачный рендеринг картинку не трогает.
    pub fn apply_completion(&mut self, completion: RenderCompletion) -> bool {
        if completion.ticket != self.next_ticket {
            debug!(
                "Dropping stale render #{} (latest is #{})",
                completion.ticket, self.next_ticket
            );
            return false;
        }
        self.pending = None;
        match completion.image {
            Some(image) => {
                self.displayed = Some(image);
                true
            }
            None => false,
        }
    }

    /// Убрать картинку. Идущий рендеринг не прерывается и заменит её, когда закончится.
    pub fn clear(&mut self) {
        self.displayed = None;
    }

    /// Убить фоновый рендеринг и забыть картинку
    pub fn shutdown(&mut self) {
        if let Some(mut pending) = self.pending.take() {
            pending.cancel();
        }
        // Запоздавший результат не должен пройти проверку номера
        self.next_ticket += 1;
        self.displayed = None;
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(config: &WaveformConfig) -> (OverlayState, mpsc::UnboundedReceiver<RenderCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (OverlayState::new(config, tx), rx)
    }

    fn completion(ticket: u64, window: TimeWindow, bytes: &[u8]) -> RenderCompletion {
        RenderCompletion {
            ticket,
            image: Some(WaveformImage {
                bytes: bytes.to_vec(),
                window,
                width_px: 10,
                height_px: 40,
            }),
        }
    }

    #[tokio::test]
    async fn too_long_window_is_never_rendered() {
        let config = WaveformConfig {
            ffmpeg_executable: "/nonexistent/ffmpeg".to_string(),
            max_window_ms: Some(5_000),
            ..WaveformConfig::default()
        };
        let (mut state, _rx) = overlay(&config);
        let window = TimeWindow::new(0, 5_001).unwrap();

        for force in [false, true] {
            assert_eq!(
                state.maybe_refresh(Path::new("a.wav"), window, 375, 40, force),
                RefreshOutcome::Skipped(SkipReason::TooLong)
            );
        }
        assert!(!state.has_pending());
    }

    #[tokio::test]
    async fn missing_backend_is_absorbed() {
        let config = WaveformConfig {
            ffmpeg_executable: "/nonexistent/ffmpeg".to_string(),
            ..WaveformConfig::default()
        };
        let (mut state, _rx) = overlay(&config);
        let window = TimeWindow::new(0, 1_000).unwrap();

        assert_eq!(
            state.maybe_refresh(Path::new("a.wav"), window, 75, 40, false),
            RefreshOutcome::Skipped(SkipReason::BackendUnavailable)
        );
        assert!(state.displayed_image().is_none());
    }

    #[tokio::test]
    async fn zero_width_is_skipped() {
        let (mut state, _rx) = overlay(&WaveformConfig::default());
        let window = TimeWindow::new(0, 1).unwrap();
        assert_eq!(
            state.maybe_refresh(Path::new("a.wav"), window, 0, 40, true),
            RefreshOutcome::Skipped(SkipReason::EmptyImage)
        );
    }

    #[test]
    fn only_latest_ticket_is_applied() {
        let (mut state, _rx) = overlay(&WaveformConfig::default());
        let first = TimeWindow::new(0, 1000).unwrap();
        let second = TimeWindow::new(1000, 2000).unwrap();
        state.next_ticket = 2;

        assert!(state.apply_completion(completion(2, second, b"B")));
        assert!(!state.apply_completion(completion(1, first, b"A")));
        assert_eq!(state.displayed_image().unwrap().bytes, b"B");
    }

    #[test]
    fn clear_keeps_pending_result_applicable() {
        let (mut state, _rx) = overlay(&WaveformConfig::default());
        let window = TimeWindow::new(0, 1000).unwrap();
        state.next_ticket = 1;
        assert!(state.apply_completion(completion(1, window, b"A")));

        state.next_ticket = 2;
        state.clear();
        assert!(state.displayed_image().is_none());
        assert!(state.apply_completion(completion(2, window, b"B")));
        assert_eq!(state.displayed_image().unwrap().bytes, b"B");
    }

    #[test]
    fn failed_render_keeps_image() {
        let (mut state, _rx) = overlay(&WaveformConfig::default());
        let window = TimeWindow::new(0, 1000).unwrap();
        state.next_ticket = 1;
        assert!(state.apply_completion(completion(1, window, b"A")));

        state.next_ticket = 2;
        let failed = RenderCompletion { ticket: 2, image: None };
        assert!(!state.apply_completion(failed));
        assert_eq!(state.displayed_image().unwrap().bytes, b"A");
        assert!(!state.has_pending());
    }

    #[test]
    fn shutdown_invalidates_late_results() {
        let (mut state, _rx) = overlay(&WaveformConfig::default());
        let window = TimeWindow::new(0, 1000).unwrap();
        state.next_ticket = 1;
        state.set_anchor(Some(42));
        state.shutdown();

        assert!(!state.apply_completion(completion(1, window, b"A")));
        assert!(state.displayed_image().is_none());
        assert_eq!(state.anchor(), None);
    }
}

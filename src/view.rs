//! Контекст одного открытого представления документа
//!
//! Собирает вместе оверлей, планировщик прослушиваний и обработку жестов.
//! Всё состояние представления живёт здесь и передаётся явно.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc;

use crate::config::WaveformConfig;
use crate::error::{Result, WaveformError};
use crate::gesture::{Dispatched, Gesture, dispatch};
use crate::host::{DocumentModel, Player};
use crate::overlay::{OverlayState, RefreshOutcome};
use crate::playback::SampleScheduler;
use crate::render::{RenderCompletion, WaveformImage};
use crate::window::TimeWindow;

pub struct WaveformView {
    config: Arc<WaveformConfig>,
    overlay: OverlayState,
    scheduler: SampleScheduler,
    completions: mpsc::UnboundedReceiver<RenderCompletion>,
    open: bool,
}

impl WaveformView {
    pub fn new(config: Arc<WaveformConfig>, player: Arc<dyn Player>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            overlay: OverlayState::new(&config, tx),
            scheduler: SampleScheduler::new(player),
            completions: rx,
            config,
            open: true,
        }
    }

    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn scheduler(&self) -> &SampleScheduler {
        &self.scheduler
    }

    pub fn displayed_image(&self) -> Option<&WaveformImage> {
        self.overlay.displayed_image()
    }

    /// Окно для текущего субтитра с учётом запаса из конфигурации
    pub fn window_for_entry<D: DocumentModel>(&self, doc: &D) -> Option<TimeWindow> {
        let start = doc.current_start_ms()?;
        let stop = doc.current_stop_ms()?;
        TimeWindow::around_entry(
            start,
            stop,
            self.config.padding_before_ms,
            self.config.padding_after_ms,
        )
        .ok()
    }

    fn media_file(&self) -> Result<PathBuf> {
        self.scheduler
            .player()
            .media_file()
            .ok_or_else(|| WaveformError::Other("no media file is open".to_string()))
    }

    /// Отрисовать окно с размерами из конфигурации
    pub fn render_window(&mut self, window: TimeWindow, force: bool) -> Result<RefreshOutcome> {
        if !self.open {
            return Err(WaveformError::ViewClosed);
        }
        let source = self.media_file()?;
        let width_px = self.config.image_width_for(&window);
        Ok(self
            .overlay
            .maybe_refresh(&source, window, width_px, self.config.height_px, force))
    }

    fn refresh_entry<D: DocumentModel>(&mut self, doc: &D, force: bool) -> Result<Option<RefreshOutcome>> {
        if !self.open {
            return Err(WaveformError::ViewClosed);
        }
        let Some(window) = self.window_for_entry(doc) else {
            debug!("No current subtitle, nothing to render");
            return Ok(None);
        };
        self.render_window(window, force).map(Some)
    }

    /// Курсор переместился
    pub fn on_motion<D: DocumentModel>(&mut self, doc: &D) -> Result<Option<RefreshOutcome>> {
        self.refresh_entry(doc, false)
    }

    /// Времена субтитров изменились
    pub fn on_times_adjusted<D: DocumentModel>(&mut self, doc: &D) -> Result<Option<RefreshOutcome>> {
        self.refresh_entry(doc, false)
    }

    /// Принудительная перерисовка текущего субтитра
    pub fn refresh<D: DocumentModel>(&mut self, doc: &D) -> Result<Option<RefreshOutcome>> {
        self.refresh_entry(doc, true)
    }

    /// Убрать картинку, например перед удалением субтитров
    pub fn clear(&mut self) {
        self.overlay.clear();
    }

    /// Обработать жест на картинке. На закрытом представлении ничего не делает.
    pub fn handle_gesture<D: DocumentModel>(&mut self, gesture: &Gesture, doc: &mut D) -> Dispatched {
        if !self.open {
            return Dispatched::Ignored;
        }
        dispatch(gesture, doc, &mut self.scheduler, &self.config)
    }

    /// Применить все уже доставленные результаты рендеринга.
    /// `true` - картинка изменилась и её нужно перерисовать.
    pub fn poll_completions(&mut self) -> bool {
        let mut redraw = false;
        while let Ok(completion) = self.completions.try_recv() {
            redraw |= self.overlay.apply_completion(completion);
        }
        redraw && self.open
    }

    /// Дождаться результата, который заменит картинку.
    /// `None`, если ждать нечего: рендеринг не запущен, не удался или представление закрыто.
    pub async fn next_completion(&mut self) -> Option<&WaveformImage> {
        loop {
            if !self.open || !self.overlay.has_pending() {
                return None;
            }
            let completion = self.completions.recv().await?;
            if self.overlay.apply_completion(completion) {
                break;
            }
        }
        self.overlay.displayed_image()
    }

    /// Закрыть представление: убить рендеринг, восстановить плеер
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.overlay.shutdown();
        self.scheduler.stop();
        self.completions.close();
        info!("Waveform view closed");
    }
}

impl Drop for WaveformView {
    fn drop(&mut self) {
        self.close();
    }
}

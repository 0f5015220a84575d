//! Короткое прослушивание с восстановлением состояния плеера
//!
//! На время прослушивания зацикливание и синхронизация отключаются, чтобы
//! не перебить воспроизведение. По таймеру плеер ставится на паузу,
//! возвращается к исходной позиции, и отключённые режимы включаются обратно.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::host::Player;

/// Ожидающее восстановление после прослушивания
#[derive(Debug)]
pub struct PlaybackSession {
    pub resume_at_ms: u64,
    pub saved_looping: bool,
    pub saved_syncing: bool,
    timer: JoinHandle<()>,
}

impl PlaybackSession {
    fn is_pending(&self) -> bool {
        !self.timer.is_finished()
    }
}

/// Длительность прослушивания, не выходящая за конец субтитра
pub fn clamp_sample_ms(start_ms: u64, sample_ms: u64, entry_stop_ms: Option<u64>) -> u64 {
    match entry_stop_ms {
        Some(stop) => sample_ms.min(stop.saturating_sub(start_ms)),
        None => sample_ms,
    }
}

fn restore(player: &dyn Player, resume_at_ms: u64, looping: bool, syncing: bool) {
    player.pause();
    player.jump(resume_at_ms);
    if looping {
        player.set_looping(true);
    }
    if syncing {
        player.set_syncing(true);
    }
}

/// Планировщик прослушиваний одного представления.
/// Одновременно ждёт не более одной сессии.
pub struct SampleScheduler {
    player: Arc<dyn Player>,
    session: Option<PlaybackSession>,
}

impl SampleScheduler {
    pub fn new(player: Arc<dyn Player>) -> Self {
        Self {
            player,
            session: None,
        }
    }

    pub fn player(&self) -> &Arc<dyn Player> {
        &self.player
    }

    pub fn is_pending(&self) -> bool {
        self.session.as_ref().is_some_and(PlaybackSession::is_pending)
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref().filter(|s| s.is_pending())
    }

    /// Проиграть `duration_ms` начиная с `start_ms`, затем вернуться к `start_ms`.
    ///
    /// При нулевой длительности плеер только переходит к `start_ms`.
    /// Предыдущая сессия отменяется, а её сохранённые режимы переходят к новой.
    /// Должно вызываться внутри runtime tokio.
    pub fn play_sample(&mut self, start_ms: u64, duration_ms: u64) -> bool {
        let mut inherited_looping = false;
        let mut inherited_syncing = false;
        if let Some(previous) = self.session.take() {
            if previous.is_pending() {
                previous.timer.abort();
                inherited_looping = previous.saved_looping;
                inherited_syncing = previous.saved_syncing;
                debug!("Superseding sample at {}ms", previous.resume_at_ms);
            }
        }

        if duration_ms == 0 {
            if inherited_looping || inherited_syncing {
                restore(self.player.as_ref(), start_ms, inherited_looping, inherited_syncing);
            } else {
                self.player.jump(start_ms);
            }
            return false;
        }

        let saved_looping = inherited_looping || self.player.is_looping();
        let saved_syncing = inherited_syncing || self.player.is_syncing();
        if saved_looping {
            self.player.set_looping(false);
        }
        if saved_syncing {
            self.player.set_syncing(false);
        }

        self.player.jump(start_ms);
        self.player.unpause();

        let player = Arc::clone(&self.player);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            restore(player.as_ref(), start_ms, saved_looping, saved_syncing);
            debug!("Sample finished, back at {}ms", start_ms);
        });

        self.session = Some(PlaybackSession {
            resume_at_ms: start_ms,
            saved_looping,
            saved_syncing,
            timer,
        });
        true
    }

    /// Прервать ожидающую сессию и сразу восстановить плеер
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            if session.is_pending() {
                session.timer.abort();
                restore(
                    self.player.as_ref(),
                    session.resume_at_ms,
                    session.saved_looping,
                    session.saved_syncing,
                );
            }
        }
    }
}

impl Drop for SampleScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

// Фиктивные реализации документа и плеера для интеграционных тестов
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use subwave::{DocumentModel, Player, PointerEvent, TimeWindow};

/// Документ из списка субтитров `(start, stop)` с курсором на одном из них
#[derive(Debug, Clone)]
pub struct MockDocument {
    pub entries: Vec<(u64, u64)>,
    pub current: Option<usize>,
    pub spacing: u64,
    pub adjusted_events: usize,
}

impl MockDocument {
    pub fn new(entries: &[(u64, u64)], current: usize) -> Self {
        Self {
            entries: entries.to_vec(),
            current: Some(current),
            spacing: 100,
            adjusted_events: 0,
        }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            spacing: 100,
            adjusted_events: 0,
        }
    }

    fn entry_mut(&mut self) -> Option<&mut (u64, u64)> {
        let index = self.current?;
        self.entries.get_mut(index)
    }
}

fn shift(ms: u64, delta: i64) -> u64 {
    (ms as i64 + delta).max(0) as u64
}

impl DocumentModel for MockDocument {
    type Position = Option<usize>;

    fn position(&self) -> Self::Position {
        self.current
    }

    fn restore_position(&mut self, position: Self::Position) {
        self.current = position;
    }

    fn current_start_ms(&self) -> Option<u64> {
        self.current.and_then(|i| self.entries.get(i)).map(|e| e.0)
    }

    fn current_stop_ms(&self) -> Option<u64> {
        self.current.and_then(|i| self.entries.get(i)).map(|e| e.1)
    }

    fn set_start_ms(&mut self, ms: u64) {
        if let Some(entry) = self.entry_mut() {
            entry.0 = ms;
        }
    }

    fn set_stop_ms(&mut self, ms: u64) {
        if let Some(entry) = self.entry_mut() {
            entry.1 = ms;
        }
    }

    fn adjust_start_ms(&mut self, delta_ms: i64) {
        if let Some(entry) = self.entry_mut() {
            entry.0 = shift(entry.0, delta_ms);
        }
    }

    fn adjust_stop_ms(&mut self, delta_ms: i64) {
        if let Some(entry) = self.entry_mut() {
            entry.1 = shift(entry.1, delta_ms);
        }
    }

    fn backward_entry(&mut self) -> bool {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    fn forward_entry(&mut self) -> bool {
        match self.current {
            Some(i) if i + 1 < self.entries.len() => {
                self.current = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    fn spacing_ms(&self) -> u64 {
        self.spacing
    }

    fn times_adjusted(&mut self) {
        self.adjusted_events += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub position: u64,
    pub playing: bool,
    pub looping: bool,
    pub syncing: bool,
    pub media: Option<PathBuf>,
    pub jumps: Vec<u64>,
}

#[derive(Debug, Default)]
pub struct MockPlayer {
    state: Mutex<PlayerState>,
}

impl MockPlayer {
    pub fn with_media(path: impl AsRef<Path>) -> Arc<Self> {
        let player = Self::default();
        player.state.lock().unwrap().media = Some(path.as_ref().to_path_buf());
        Arc::new(player)
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state.lock().unwrap().clone()
    }

    pub fn set_modes(&self, looping: bool, syncing: bool) {
        let mut state = self.state.lock().unwrap();
        state.looping = looping;
        state.syncing = syncing;
    }
}

impl Player for MockPlayer {
    fn jump(&self, ms: u64) {
        let mut state = self.state.lock().unwrap();
        state.position = ms;
        state.jumps.push(ms);
    }

    fn pause(&self) {
        self.state.lock().unwrap().playing = false;
    }

    fn unpause(&self) {
        self.state.lock().unwrap().playing = true;
    }

    fn is_looping(&self) -> bool {
        self.state.lock().unwrap().looping
    }

    fn set_looping(&self, enabled: bool) {
        self.state.lock().unwrap().looping = enabled;
    }

    fn is_syncing(&self) -> bool {
        self.state.lock().unwrap().syncing
    }

    fn set_syncing(&self, enabled: bool) {
        self.state.lock().unwrap().syncing = enabled;
    }

    fn media_file(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().media.clone()
    }
}

pub fn event(x_px: i64, image_width_px: u32, start_ms: u64, stop_ms: u64) -> PointerEvent {
    PointerEvent {
        x_px,
        image_width_px,
        window: TimeWindow::new(start_ms, stop_ms).unwrap(),
    }
}

/// Исполняемый shell-скрипт вместо ffmpeg
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

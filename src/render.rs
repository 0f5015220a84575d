//! Модуль запросов на рендеринг волны через ffmpeg
//!
//! ffmpeg выбирает аудиодорожку, оставляет только отсчёты из окна,
//! сбрасывает метки времени к нулю, рисует `showwavespic` нужного размера
//! и отдаёт ровно один PNG-кадр в stdout.
//!
//! Синхронный режим блокирует вызывающего до завершения процесса.
//! Асинхронный возвращает [`PendingRender`]: отмена убивает процесс,
//! результат доставляется через канал вместе с номером запроса.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use log::{debug, warn};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::WaveformConfig;
use crate::error::{Result, WaveformError};
use crate::filter::{FilterStyle, build_filter_args};
use crate::window::TimeWindow;

/// Запрос на рендеринг одного окна
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub source: PathBuf,
    pub window: TimeWindow,
    pub width_px: u32,
    pub height_px: u32,
    pub filter_args: String,
}

impl RenderRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        window: TimeWindow,
        width_px: u32,
        height_px: u32,
        style: &FilterStyle,
    ) -> Result<Self> {
        if width_px == 0 || height_px == 0 {
            return Err(WaveformError::InvalidRequest(format!(
                "image size {}x{} for window {} is empty",
                width_px, height_px, window
            )));
        }
        Ok(Self {
            source: source.into(),
            window,
            width_px,
            height_px,
            filter_args: build_filter_args(style, width_px, height_px),
        })
    }

    /// Запрос с шириной по плотности и высотой из конфигурации
    pub fn from_config(
        source: impl Into<PathBuf>,
        window: TimeWindow,
        config: &WaveformConfig,
    ) -> Result<Self> {
        Self::new(
            source,
            window,
            config.image_width_for(&window),
            config.height_px,
            &config.filter_style,
        )
    }
}

/// Отрисованная волна вместе с окном, которое она изображает
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformImage {
    pub bytes: Vec<u8>,
    pub window: TimeWindow,
    pub width_px: u32,
    pub height_px: u32,
}

impl WaveformImage {
    fn from_request(request: &RenderRequest, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            window: request.window,
            width_px: request.width_px,
            height_px: request.height_px,
        }
    }
}

/// Миллисекунды в секунды для выражений ffmpeg, без потери точности
pub fn format_seconds(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// Предикат для `aselect`: `t >= start AND t < stop`.
/// Если задана только одна граница, предикат односторонний; без границ - `None`.
pub fn time_predicate(start_ms: Option<u64>, stop_ms: Option<u64>) -> Option<String> {
    match (start_ms, stop_ms) {
        (Some(start), Some(stop)) => Some(format!(
            "gte(t,{})*lt(t,{})",
            format_seconds(start),
            format_seconds(stop)
        )),
        (Some(start), None) => Some(format!("gte(t,{})", format_seconds(start))),
        (None, Some(stop)) => Some(format!("lt(t,{})", format_seconds(stop))),
        (None, None) => None,
    }
}

/// Границы предиката для окна. Нулевое начало ничего не отсекает и опускается.
fn predicate_bounds(window: &TimeWindow) -> (Option<u64>, Option<u64>) {
    let start = Some(window.start_ms()).filter(|&ms| ms > 0);
    (start, Some(window.stop_ms()))
}

/// Граф фильтров для `-filter_complex`
pub fn build_filter_graph(request: &RenderRequest) -> String {
    let mut graph = String::from("[0:a]");
    let (start_ms, stop_ms) = predicate_bounds(&request.window);
    if let Some(predicate) = time_predicate(start_ms, stop_ms) {
        graph.push_str(&format!("aselect='{}',", predicate));
    }
    graph.push_str("asetpts=N/SR/TB,");
    graph.push_str(&format!(
        "showwavespic=s={}x{}{}",
        request.width_px, request.height_px, request.filter_args
    ));
    graph
}

/// Аргументы командной строки ffmpeg
pub fn build_ffmpeg_args(request: &RenderRequest) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        request.source.to_string_lossy().to_string(),
        "-filter_complex".to_string(),
        build_filter_graph(request),
        "-frames:v".to_string(),
        "1".to_string(),
        "-f".to_string(),
        "image2pipe".to_string(),
        "-c:v".to_string(),
        "png".to_string(),
        "-".to_string(),
    ]
}

/// Синхронный рендеринг. `None` - картинки нет
/// (ffmpeg не запустился, завершился с ошибкой или ничего не вывел).
pub fn render_sync(executable: &Path, request: &RenderRequest) -> Option<Vec<u8>> {
    let output = std::process::Command::new(executable)
        .args(build_ffmpeg_args(request))
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() && !output.stdout.is_empty() => {
            debug!(
                "Rendered {} bytes for window {}",
                output.stdout.len(),
                request.window
            );
            Some(output.stdout)
        }
        Ok(output) => {
            warn!(
                "ffmpeg produced no image for window {} (status: {})",
                request.window, output.status
            );
            None
        }
        Err(e) => {
            warn!("Failed to run {}: {}", executable.display(), e);
            None
        }
    }
}

/// Результат асинхронного рендеринга с номером запроса.
/// `image == None` - ffmpeg завершился, но картинки не дал.
#[derive(Debug)]
pub struct RenderCompletion {
    pub ticket: u64,
    pub image: Option<WaveformImage>,
}

/// Запущенный фоновый рендеринг
///
/// Отмена (или drop) убивает процесс ffmpeg; частичный вывод отбрасывается.
#[derive(Debug)]
pub struct PendingRender {
    ticket: u64,
    window: TimeWindow,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PendingRender {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if !self.task.is_finished() {
                debug!("Cancelling render #{} for window {}", self.ticket, self.window);
            }
            let _ = cancel.send(());
        }
    }
}

impl Drop for PendingRender {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Запустить ffmpeg в фоне. Итог уходит в `completions`: картинка или,
/// при ошибке, завершение без неё. Убитый процесс ничего не отправляет.
/// Должно вызываться внутри runtime tokio.
pub fn spawn_render(
    executable: &Path,
    request: RenderRequest,
    ticket: u64,
    completions: mpsc::UnboundedSender<RenderCompletion>,
) -> Result<PendingRender> {
    let child = Command::new(executable)
        .args(build_ffmpeg_args(&request))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    debug!(
        "Started render #{} for window {} ({}x{})",
        ticket, request.window, request.width_px, request.height_px
    );

    let (cancel_tx, cancel_rx) = oneshot::channel();
    let window = request.window;
    let task = tokio::spawn(async move {
        let Some(outcome) = await_backend(child, cancel_rx, ticket).await else {
            return;
        };
        let image = outcome.map(|bytes| WaveformImage::from_request(&request, bytes));
        // Получатель мог уже закрыться вместе с представлением
        let _ = completions.send(RenderCompletion { ticket, image });
    });

    Ok(PendingRender {
        ticket,
        window,
        cancel: Some(cancel_tx),
        task,
    })
}

/// `None` - процесс убит; `Some(None)` - завершился без картинки
async fn await_backend(
    mut child: Child,
    mut cancel_rx: oneshot::Receiver<()>,
    ticket: u64,
) -> Option<Option<Vec<u8>>> {
    let Some(mut stdout) = child.stdout.take() else {
        return Some(None);
    };

    let collected = tokio::select! {
        result = collect_output(&mut child, &mut stdout) => Some(result),
        _ = &mut cancel_rx => None,
    };

    match collected {
        None => {
            let _ = child.kill().await;
            debug!("Render #{} killed", ticket);
            None
        }
        Some(Ok((status, bytes))) if status.success() && !bytes.is_empty() => Some(Some(bytes)),
        Some(Ok((status, _))) => {
            warn!("Render #{} produced no image (status: {})", ticket, status);
            Some(None)
        }
        Some(Err(e)) => {
            warn!("Render #{} failed: {}", ticket, e);
            Some(None)
        }
    }
}

async fn collect_output(
    child: &mut Child,
    stdout: &mut ChildStdout,
) -> std::io::Result<(ExitStatus, Vec<u8>)> {
    let mut bytes = Vec::new();
    stdout.read_to_end(&mut bytes).await?;
    let status = child.wait().await?;
    Ok((status, bytes))
}

// Отрисовка одного окна в PNG через синхронный рендеринг
//
// waveform_png <media> <start_ms> <stop_ms> <output.png> [config.json]

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use log::{error, info};

use subwave::utils::{ffmpeg, logger};
use subwave::{TimeWindow, WaveformConfig, render_window_sync};

const USAGE: &str = "usage: waveform_png <media> <start_ms> <stop_ms> <output.png> [config.json]";

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 4 || args.len() > 5 {
        bail!(USAGE);
    }

    let media = PathBuf::from(&args[0]);
    let start_ms: u64 = args[1]
        .parse()
        .with_context(|| format!("Invalid start_ms: {}", args[1]))?;
    let stop_ms: u64 = args[2]
        .parse()
        .with_context(|| format!("Invalid stop_ms: {}", args[2]))?;
    let output = PathBuf::from(&args[3]);

    let config = match args.get(4) {
        Some(path) => WaveformConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => WaveformConfig::default(),
    };

    let backend = ffmpeg::check_backend(&config.ffmpeg_executable)
        .context("ffmpeg is required to render waveforms")?;
    let config = WaveformConfig {
        ffmpeg_executable: backend.path.to_string_lossy().to_string(),
        ..config
    };

    let window = TimeWindow::new(start_ms, stop_ms)?;
    let image = render_window_sync(&config, &media, window)?
        .ok_or_else(|| anyhow!("ffmpeg produced no image for {} {}", media.display(), window))?;

    std::fs::write(&output, &image.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {}x{} waveform for {} to {}",
        image.width_px,
        image.height_px,
        window,
        output.display()
    );
    Ok(())
}

fn main() {
    logger::init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

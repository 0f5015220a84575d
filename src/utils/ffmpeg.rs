//! Модуль для поиска и проверки ffmpeg

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;

use crate::error::{Result, WaveformError};

/// Минимальная версия, в которой есть `showwavespic` с нужными опциями
pub const MIN_FFMPEG_VERSION: Version = Version::new(4, 0, 0);

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ffmpeg version n?(\d+)\.(\d+)(?:\.(\d+))?").expect("valid ffmpeg version regex")
});

/// Найденный ffmpeg
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub path: PathBuf,
    /// `None` - версию разобрать не удалось (например, сборка из git)
    pub version: Option<Version>,
}

/// Найти исполняемый файл: путь проверяется как есть, имя ищется в PATH
pub fn locate_backend(executable: &str) -> Result<PathBuf> {
    let candidate = Path::new(executable);
    if candidate.components().count() > 1 {
        if candidate.is_file() {
            return Ok(candidate.to_path_buf());
        }
        return Err(WaveformError::BackendNotFound(format!(
            "{} does not exist",
            candidate.display()
        )));
    }

    which::which(executable).map_err(|e| {
        WaveformError::BackendNotFound(format!("{} not found in PATH: {}", executable, e))
    })
}

/// Разобрать вывод `ffmpeg -version`
pub fn parse_ffmpeg_version(output: &str) -> Option<Version> {
    let caps = VERSION_RE.captures(output)?;
    let major = caps.get(1)?.as_str().parse::<u64>().ok()?;
    let minor = caps.get(2)?.as_str().parse::<u64>().ok()?;
    let patch = caps
        .get(3)
        .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())?;
    Some(Version::new(major, minor, patch))
}

/// Версия ffmpeg по пути
pub fn backend_version(path: &Path) -> Result<Option<Version>> {
    let output = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(WaveformError::Backend(format!(
            "{} -version failed with status: {}",
            path.display(),
            output.status
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    debug!("Raw ffmpeg version: {}", text.lines().next().unwrap_or(""));
    Ok(parse_ffmpeg_version(&text))
}

/// Найти ffmpeg и узнать его версию
pub fn check_backend(executable: &str) -> Result<BackendInfo> {
    let path = locate_backend(executable)?;
    let version = backend_version(&path)?;

    match &version {
        Some(v) if *v < MIN_FFMPEG_VERSION => {
            warn!(
                "ffmpeg {} at {} is older than {}, waveforms may fail",
                v,
                path.display(),
                MIN_FFMPEG_VERSION
            );
        }
        Some(v) => info!("Found ffmpeg {} at {}", v, path.display()),
        None => info!("Found ffmpeg at {} (unknown version)", path.display()),
    }

    Ok(BackendInfo { path, version })
}

//! Logging setup: per-target console levels plus rotating JSON log files.
//!
//! Config keys are tracing targets (crate names such as `modkit_bus`), except
//! `default`, which covers every target not listed explicitly.

use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LoggingConfig, Section};

const DEFAULT_KEY: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        // empty or unknown
        _ => LevelFilter::INFO,
    }
}

/// True if `target` is `prefix` or lives under `prefix::`.
fn matches_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn console_targets(cfg: &LoggingConfig) -> Targets {
    build_targets(cfg, |s| Some(parse_level(&s.console_level)))
}

fn file_targets(cfg: &LoggingConfig) -> Targets {
    build_targets(cfg, |s| {
        (!s.file.trim().is_empty()).then(|| parse_level(&s.file_level))
    })
}

fn build_targets(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> Option<LevelFilter>) -> Targets {
    let default = cfg
        .get(DEFAULT_KEY)
        .and_then(&level_of)
        .unwrap_or(LevelFilter::OFF);
    cfg.iter()
        .filter(|(k, _)| k.as_str() != DEFAULT_KEY)
        .fold(Targets::new().with_default(default), |t, (k, s)| {
            t.with_target(k.clone(), level_of(s).unwrap_or(LevelFilter::OFF))
        })
}

// -------- rotating files --------

type SharedFile = Arc<Mutex<FileRotate<AppendCount>>>;

/// Resolve a log file path against `base_dir` (home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(path: &Path, section: &Section) -> std::io::Result<SharedFile> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let rot = FileRotate::new(
        path,
        AppendCount::new(section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS)),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Arc::new(Mutex::new(rot)))
}

/// Picks the log file by event target; falls back to the `default` file.
#[derive(Default)]
struct FileRouter {
    default: Option<SharedFile>,
    by_prefix: Vec<(String, SharedFile)>,
}

impl FileRouter {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = FileRouter::default();
        for (key, section) in cfg {
            if section.file.trim().is_empty() {
                continue;
            }
            let path = resolve_log_path(&section.file, base_dir);
            let file = match open_rotating(&path, section) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("failed to open log file {} for '{key}': {e}", path.display());
                    continue;
                }
            };
            if key == DEFAULT_KEY {
                router.default = Some(file);
            } else {
                router.by_prefix.push((key.clone(), file));
            }
        }
        // Longest prefix wins.
        router.by_prefix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        router
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }

    fn route(&self, target: &str) -> Option<SharedFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_prefix(target, prefix))
            .map(|(_, f)| f.clone())
            .or_else(|| self.default.clone())
    }
}

/// Writer for one record; drops the bytes when no file is routed.
struct RoutedWriter(Option<SharedFile>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(f) => f.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(f) => f.lock().flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.route(meta.target()))
    }
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: logging sections keyed by target
/// - `base_dir`: base directory used to resolve relative log file paths (usually home_dir)
///
/// An empty config installs a plain console subscriber honoring `RUST_LOG`.
/// Calling this twice is harmless; the second subscriber is not installed.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let console = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = FileRouter::from_config(cfg, base_dir);
    let file = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_current_span(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(file_targets(cfg))
    });

    if Registry::default().with(console).with(file).try_init().is_err() {
        tracing::debug!("global subscriber already installed; logging config ignored");
    }
}

fn init_default_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

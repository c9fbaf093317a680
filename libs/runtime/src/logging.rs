use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendCount, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// Unknown names fall back to info; "off"/"none" disable output.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn matches_prefix(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

// -------- rotating file writers --------

type SharedRotate = Arc<Mutex<FileRotate<AppendCount>>>;

#[derive(Clone)]
struct FileHandle(Option<SharedRotate>);

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(f) => f.lock().unwrap_or_else(|e| e.into_inner()).write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(f) => f.lock().unwrap_or_else(|e| e.into_inner()).flush(),
            None => Ok(()),
        }
    }
}

/// Sends each record to the file of the longest matching target prefix,
/// or to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    by_prefix: Vec<(String, SharedRotate)>,
}

impl FileRouter {
    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }

    fn resolve(&self, target: &str) -> Option<SharedRotate> {
        self.by_prefix
            .iter()
            .filter(|(p, _)| matches_prefix(target, p))
            .max_by_key(|(p, _)| p.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = FileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        FileHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        FileHandle(self.resolve(meta.target()))
    }
}

/// Relative paths are joined with `base_dir` (normally `server.home_dir`).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn max_bytes(section: &Section) -> usize {
    let bytes = section
        .max_size_mb
        .unwrap_or(DEFAULT_MAX_SIZE_MB)
        .saturating_mul(1024 * 1024);
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

fn open_rotating(section: &Section, base_dir: &Path) -> std::io::Result<Option<SharedRotate>> {
    if section.file.trim().is_empty() {
        return Ok(None);
    }
    let path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let rot = FileRotate::new(
        &path,
        AppendCount::new(section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS)),
        ContentLimit::BytesSurpassed(max_bytes(section)),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Some(Arc::new(Mutex::new(rot))))
}

// -------- filters --------

/// Console filter: the default section's level for everything, each named
/// section's level for its own prefix.
fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level(&s.console_level))
        .unwrap_or(LevelFilter::INFO);
    named_sections(cfg).fold(Targets::new().with_default(default), |t, (name, s)| {
        t.with_target(name.clone(), parse_level(&s.console_level))
    })
}

/// File filter: only sections that write a file (or fall into the default
/// file) produce file records.
fn file_targets(cfg: &LoggingConfig, router: &FileRouter) -> Targets {
    let default = match (cfg.get(DEFAULT_SECTION), &router.default) {
        (Some(s), Some(_)) => parse_level(&s.file_level),
        _ => LevelFilter::OFF,
    };
    named_sections(cfg).fold(Targets::new().with_default(default), |t, (name, s)| {
        let level = if s.file.trim().is_empty() {
            LevelFilter::OFF
        } else {
            parse_level(&s.file_level)
        };
        t.with_target(name.clone(), level)
    })
}

fn named_sections(cfg: &LoggingConfig) -> impl Iterator<Item = (&String, &Section)> {
    cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_SECTION)
}

fn build_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();
    let mut opened: HashMap<PathBuf, SharedRotate> = HashMap::new();

    for (name, section) in cfg {
        // Sections sharing a path share a writer.
        let path = resolve_log_path(&section.file, base_dir);
        let writer = match opened.get(&path) {
            Some(w) => Some(w.clone()),
            None => match open_rotating(section, base_dir) {
                Ok(w) => w,
                Err(e) => {
                    eprintln!("Failed to open log file '{}': {e}", path.display());
                    None
                }
            },
        };
        let Some(writer) = writer else { continue };
        opened.insert(path, writer.clone());

        if name == DEFAULT_SECTION {
            router.default = Some(writer);
        } else {
            router.by_prefix.push((name.clone(), writer));
        }
    }
    router
}

// -------- public init --------

/// Install the global subscriber. Console output is human-readable, file
/// output is JSON; both use RFC 3339 UTC timestamps. Calling this twice is a
/// no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    let console = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = build_router(cfg, base_dir);
    if router.is_empty() {
        let _ = Registry::default().with(console).try_init();
        return;
    }

    let file_filter = file_targets(cfg, &router);
    let file = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(file_filter);

    let _ = Registry::default().with(console).with(file).try_init();
}

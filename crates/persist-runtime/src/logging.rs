//! Structured logging: stdout plus a size-bounded log file, per
//! SPEC_FULL.md §4.G / §6. Grounded on the teacher's `tracing_subscriber`
//! setup (`ferrumyx-agent::main`), with a small custom `Write` impl
//! (the same kind of hand-rolled `tracing` integration `ops::tracing`
//! shows in the pack) wrapped in `tracing_appender::non_blocking` to
//! honour `log_max_lines` — a line-count bound `tracing_appender`'s
//! own rotation policies don't offer directly.

use persist_config::PersistConfig;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

struct LineBoundedState {
    file: File,
    path: PathBuf,
    lines_written: u64,
    max_lines: u64,
}

/// Appends to `path`, truncating back to empty once `max_lines` lines
/// have been written. Cheap and lossy by design — this is operational
/// tailing output, not an audit log.
#[derive(Clone)]
struct LineBoundedWriter {
    state: Arc<Mutex<LineBoundedState>>,
}

impl LineBoundedWriter {
    fn open(path: PathBuf, max_lines: u64) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            state: Arc::new(Mutex::new(LineBoundedState {
                file,
                path,
                lines_written: 0,
                max_lines,
            })),
        })
    }
}

impl io::Write for LineBoundedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().expect("log writer mutex poisoned");
        if state.max_lines > 0 && state.lines_written >= state.max_lines {
            state.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&state.path)?;
            state.lines_written = 0;
        }
        let written = state.file.write(buf)?;
        state.lines_written += buf[..written].iter().filter(|&&b| b == b'\n').count() as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.lock().expect("log writer mutex poisoned").file.flush()
    }
}

/// Must be kept alive for the process lifetime — dropping it stops the
/// background flush thread and the file layer goes silent.
pub fn init(config: &PersistConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)?;

    let log_path = PathBuf::from(&config.log_dir).join(format!("{}.log", config.log_file_prefix));
    let writer = LineBoundedWriter::open(log_path, config.log_max_lines)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("persist=debug,info"));

    let stdout_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

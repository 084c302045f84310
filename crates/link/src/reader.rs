use crate::frame::{parse_frame, FrameError};
use hygro_config::LinkConfig;
use hygro_core::HygroError;
use hygro_series::{Ingest, Session};
use std::fmt::Display;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

/// Granularity of interruptible sleeps.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Longest line kept while waiting for its terminator.  Frames are a few
/// dozen bytes; anything longer is line noise.
pub const MAX_LINE_BYTES: usize = 1024;

#[derive(Debug, Error)]
pub enum LinkError {
    /// Every connection attempt failed; the reader gives up.
    #[error("device unavailable on {port} after {attempts} attempt(s): {last}")]
    Unavailable {
        port:     String,
        attempts: u32,
        last:     String,
    },

    #[error("connection aborted by shutdown")]
    Cancelled,

    /// Transient; the read loop logs it and carries on.
    #[error("link read failed: {0}")]
    Read(#[source] io::Error),
}

impl From<LinkError> for HygroError {
    fn from(e: LinkError) -> Self {
        HygroError::Link(e.to_string())
    }
}

/// Source of newline-terminated lines with a bounded wait per call.
pub trait LineSource {
    /// `Ok(None)` when the wait elapsed before a full line arrived.
    fn next_line(&mut self) -> io::Result<Option<String>>;

    /// Lines dropped for exceeding [`MAX_LINE_BYTES`].
    fn overlong_lines(&self) -> u64 {
        0
    }
}

/// [`LineSource`] over a buffered byte stream whose reads may time out.
///
/// Bytes of an incomplete line are kept across timeouts, so a frame split
/// over two reads is still delivered whole.  A line that grows past
/// [`MAX_LINE_BYTES`] is dropped up to its terminator.
pub struct BufferedLines<R> {
    reader:     R,
    pending:    Vec<u8>,
    discarding: bool,
    overlong:   u64,
}

impl<R: BufRead> BufferedLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(64),
            discarding: false,
            overlong: 0,
        }
    }
}

impl<R: BufRead> LineSource for BufferedLines<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        // `pending` is always shorter than the cap, so `room` is never zero.
        let room = (MAX_LINE_BYTES - self.pending.len()) as u64;
        let read = (&mut self.reader)
            .take(room)
            .read_until(b'\n', &mut self.pending);

        match read {
            Ok(0) => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "link closed")),
            Ok(_) if self.pending.ends_with(b"\n") => {
                let raw = std::mem::take(&mut self.pending);
                if std::mem::take(&mut self.discarding) {
                    return Ok(None);
                }
                String::from_utf8(raw)
                    .map(Some)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
            Ok(_) if self.pending.len() >= MAX_LINE_BYTES => {
                debug!("Dropping {} bytes received without a line break", self.pending.len());
                self.pending.clear();
                if !self.discarding {
                    self.discarding = true;
                    self.overlong += 1;
                }
                Ok(None)
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn overlong_lines(&self) -> u64 {
        self.overlong
    }
}

/// Per-run counters, returned when the read loop exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReaderStats {
    pub lines:       u64,
    pub appended:    u64,
    pub resynced:    u64,
    /// Valid frames dropped by the pause/menu gate.
    pub gated:       u64,
    /// Lines without the frame prefix.
    pub ignored:     u64,
    pub malformed:   u64,
    /// Lines dropped for exceeding [`MAX_LINE_BYTES`].
    pub overlong:    u64,
    pub read_errors: u64,
}

/// Open a connection with a bounded number of flat-delay retries.
///
/// Gives up early with [`LinkError::Cancelled`] once `shutdown` reports true.
pub fn connect<T, E: Display>(
    port: &str,
    attempts: u32,
    delay: Duration,
    shutdown: impl Fn() -> bool,
    mut open: impl FnMut() -> Result<T, E>,
) -> Result<T, LinkError> {
    let attempts = attempts.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
        if shutdown() {
            return Err(LinkError::Cancelled);
        }
        match open() {
            Ok(handle) => {
                info!("Link connected on {port}");
                return Ok(handle);
            }
            Err(e) => {
                warn!("Connection attempt {attempt}/{attempts} on {port} failed: {e}");
                last = e.to_string();
            }
        }
        if attempt < attempts {
            sleep_unless(&shutdown, delay);
        }
    }

    error!("Device unavailable on {port}; live data disabled");
    Err(LinkError::Unavailable {
        port: port.to_string(),
        attempts,
        last,
    })
}

/// Sleep for `total`, waking early if `shutdown` becomes true.
fn sleep_unless(shutdown: &impl Fn() -> bool, total: Duration) {
    let deadline = Instant::now() + total;
    while !shutdown() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

/// Reads telemetry frames from the serial link into the shared [`Session`].
pub struct LinkReader {
    config:  LinkConfig,
    session: Arc<Session>,
}

impl LinkReader {
    pub fn new(config: LinkConfig, session: Arc<Session>) -> Self {
        Self { config, session }
    }

    /// Connect, then read until shutdown.  Blocking; run it on its own thread.
    pub fn run(self) -> Result<ReaderStats, LinkError> {
        let cfg = &self.config;
        let session = Arc::clone(&self.session);

        let port = connect(
            &cfg.port,
            cfg.max_attempts,
            cfg.retry_delay(),
            || session.is_shutdown(),
            || {
                tokio_serial::new(cfg.port.as_str(), cfg.baud_rate)
                    .timeout(cfg.read_timeout())
                    .open()
            },
        )?;

        let mut lines = BufferedLines::new(BufReader::new(port));
        let stats = self.pump(&mut lines);

        // Dropping the reader closes the port handle.
        drop(lines);
        info!(
            "Link on {} closed ({} lines, {} samples, {} malformed, {} overlong, {} read errors)",
            cfg.port, stats.lines, stats.appended, stats.malformed, stats.overlong, stats.read_errors
        );
        Ok(stats)
    }

    /// Read loop: runs until the session's shutdown flag is set.
    pub fn pump<S: LineSource>(&self, source: &mut S) -> ReaderStats {
        let mut stats = ReaderStats::default();

        while !self.session.is_shutdown() {
            match source.next_line() {
                Ok(Some(line)) => self.handle_line(&line, &mut stats),
                Ok(None) => {}
                Err(e) => {
                    stats.read_errors += 1;
                    if !self.session.is_shutdown() {
                        warn!("{}", LinkError::Read(e));
                    }
                    sleep_unless(&|| self.session.is_shutdown(), self.config.error_backoff());
                }
            }
        }

        stats.overlong = source.overlong_lines();
        stats
    }

    fn handle_line(&self, line: &str, stats: &mut ReaderStats) {
        stats.lines += 1;

        let reading = match parse_frame(line) {
            Ok(reading) => reading,
            Err(FrameError::NotData) => {
                stats.ignored += 1;
                trace!("Ignoring non-frame line {:?}", line.trim_end());
                return;
            }
            Err(e) => {
                stats.malformed += 1;
                debug!("Discarding frame {:?}: {e}", line.trim_end());
                return;
            }
        };

        match self.session.ingest(reading, Instant::now()) {
            Ingest::Appended(sample) => {
                stats.appended += 1;
                trace!(
                    t = sample.relative_time,
                    temperature = sample.temperature,
                    humidity = sample.humidity,
                    "sample appended"
                );
            }
            Ingest::Resynced => {
                stats.resynced += 1;
                debug!("First reading after resume used to re-anchor the clock");
            }
            Ingest::Gated | Ingest::Shutdown => stats.gated += 1,
        }
    }
}

/// Spawn the blocking reader on the runtime's blocking pool.
pub fn spawn_reader(reader: LinkReader) -> tokio::task::JoinHandle<Result<ReaderStats, LinkError>> {
    tokio::task::spawn_blocking(move || reader.run())
}

/// Names of serial ports visible on this machine.
pub fn list_ports() -> Vec<String> {
    match tokio_serial::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("Cannot enumerate serial ports: {e}");
            Vec::new()
        }
    }
}

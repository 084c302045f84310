//! Shared session context.
//!
//! One [`Session`] is shared (`Arc<Session>`) between the link reader thread,
//! which calls [`Session::ingest`], and the cooperative render loop, which
//! snapshots the buffer and drives mode, pause and resume. Nothing outside this
//! type touches the buffer columns or the clock directly.

use crate::{buffer::Snapshot, LiveFeed, SeriesBuffer};
use hygro_config::BufferConfig;
use hygro_core::{Mode, Reading, Sample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

/// What happened to one inbound reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ingest {
    /// Stamped and stored.
    Appended(Sample),
    /// First reading after a resume: used to re-anchor the clock, then dropped.
    Resynced,
    /// Dropped because no mode is selected or the session is paused.
    Gated,
    /// Dropped because the application is shutting down.
    Shutdown,
}

/// Copy of the control block, for display and tests.
#[derive(Debug, Clone, Copy)]
pub struct SessionState {
    pub mode:           Option<Mode>,
    pub paused:         bool,
    pub resync_pending: bool,
    /// Instant at which relative time equals `time_offset`.
    pub clock_origin:   Instant,
    pub time_offset:    f64,
}

impl SessionState {
    /// A mode is selected and ingestion is not paused.
    pub fn running(&self) -> bool {
        self.mode.is_some() && !self.paused
    }
}

#[derive(Debug)]
struct Control {
    mode:           Option<Mode>,
    paused:         bool,
    resync_pending: bool,
    clock_origin:   Instant,
    time_offset:    f64,
}

impl Control {
    fn relative_time(&self, now: Instant) -> f64 {
        self.time_offset + now.saturating_duration_since(self.clock_origin).as_secs_f64()
    }
}

/// Buffer, live feed and control flags of the running monitor.
///
/// Lock order is always control → buffer.
#[derive(Debug)]
pub struct Session {
    buffer:   SeriesBuffer,
    feed:     LiveFeed,
    control:  Mutex<Control>,
    shutdown: AtomicBool,
}

impl Session {
    pub fn new(config: &BufferConfig) -> Self {
        Self {
            buffer:   SeriesBuffer::new(config.capacity),
            feed:     LiveFeed::new(config.feed_len),
            control:  Mutex::new(Control {
                mode:           None,
                paused:         false,
                resync_pending: false,
                clock_origin:   Instant::now(),
                time_offset:    0.0,
            }),
            shutdown: AtomicBool::new(false),
        }
    }

    // ── Controller side ──────────────────────────────────────────────────────

    /// Begin a fresh session: clears the buffer and restarts the clock at `now`.
    pub fn start(&self, mode: Mode, now: Instant) {
        let mut control = self.control();
        *control = Control {
            mode:           Some(mode),
            paused:         false,
            resync_pending: false,
            clock_origin:   now,
            time_offset:    0.0,
        };
        self.buffer.clear();
        self.feed.clear();
        info!("Session started in {mode} mode");
    }

    /// Drop the current session and return to the mode menu.
    pub fn end(&self) {
        let mut control = self.control();
        control.mode = None;
        control.paused = false;
        control.resync_pending = false;
        self.buffer.clear();
        self.feed.clear();
        info!("Session ended");
    }

    /// Stop ingesting.  Returns `false` if there was nothing to pause.
    pub fn pause(&self) -> bool {
        let mut control = self.control();
        if control.mode.is_none() || control.paused {
            return false;
        }
        control.paused = true;
        true
    }

    /// Resume ingesting.  The next reading re-anchors the clock and is dropped.
    /// Returns `false` if the session was not paused.
    pub fn resume(&self) -> bool {
        let mut control = self.control();
        if control.mode.is_none() || !control.paused {
            return false;
        }
        // Both flags flip under the same lock, so the reader can never see
        // "running" without the pending resync.
        control.resync_pending = true;
        control.paused = false;
        true
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    // ── Reader side ──────────────────────────────────────────────────────────

    /// Apply the ingestion gate and resync rule to one reading received at `now`.
    pub fn ingest(&self, reading: Reading, now: Instant) -> Ingest {
        if self.is_shutdown() {
            return Ingest::Shutdown;
        }

        let mut control = self.control();
        if control.mode.is_none() || control.paused {
            return Ingest::Gated;
        }

        if control.resync_pending {
            control.resync_pending = false;
            if let Some(last) = self.buffer.last_time() {
                control.clock_origin = now;
                control.time_offset = last;
                debug!("Clock re-anchored at t={last:.3}s");
            }
            return Ingest::Resynced;
        }

        let sample = Sample {
            relative_time: control.relative_time(now),
            temperature:   reading.temperature,
            humidity:      reading.humidity,
        };
        self.buffer.append(sample);
        self.feed.push(&sample);
        Ingest::Appended(sample)
    }

    // ── Readers ──────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        self.buffer.snapshot()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn feed(&self) -> Vec<String> {
        self.feed.entries()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.control().mode
    }

    pub fn state(&self) -> SessionState {
        let control = self.control();
        SessionState {
            mode:           control.mode,
            paused:         control.paused,
            resync_pending: control.resync_pending,
            clock_origin:   control.clock_origin,
            time_offset:    control.time_offset,
        }
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const READING: Reading = Reading {
        temperature: 23.5,
        humidity:    65,
    };

    fn session() -> Session {
        Session::new(&BufferConfig::default())
    }

    fn at(base: Instant, secs: f64) -> Instant {
        base + Duration::from_secs_f64(secs)
    }

    #[test]
    fn nothing_is_ingested_without_a_mode() {
        let session = session();
        assert_eq!(session.ingest(READING, Instant::now()), Ingest::Gated);
        assert!(session.is_empty());
    }

    #[test]
    fn running_session_stamps_relative_time() {
        let session = session();
        let base = Instant::now();
        session.start(Mode::Both, base);

        let Ingest::Appended(sample) = session.ingest(READING, at(base, 1.5)) else {
            panic!("expected an appended sample");
        };
        assert_eq!(sample.relative_time, 1.5);
        assert_eq!(sample.temperature, 23.5);
        assert_eq!(sample.humidity, 65);
        assert_eq!(session.feed().len(), 1);
    }

    #[test]
    fn paused_session_drops_readings() {
        let session = session();
        let base = Instant::now();
        session.start(Mode::Humidity, base);
        session.ingest(READING, at(base, 1.0));
        assert!(session.pause());
        assert!(!session.pause());

        assert_eq!(session.ingest(READING, at(base, 2.0)), Ingest::Gated);
        assert_eq!(session.len(), 1);
        assert!(!session.state().running());
    }

    #[test]
    fn resume_discards_first_reading_and_continues_clock() {
        let session = session();
        let base = Instant::now();
        session.start(Mode::Temperature, base);
        session.ingest(READING, at(base, 1.0));
        session.ingest(READING, at(base, 2.0));
        let t_last = session.snapshot().time.last().copied().unwrap();

        session.pause();
        assert!(session.resume());
        assert!(session.state().resync_pending);

        // A long wall-clock gap while paused must not show up as a jump.
        assert_eq!(session.ingest(READING, at(base, 120.0)), Ingest::Resynced);
        assert_eq!(session.len(), 2);

        let Ingest::Appended(next) = session.ingest(READING, at(base, 121.0)) else {
            panic!("expected an appended sample");
        };
        assert!(next.relative_time >= t_last);
        assert!((next.relative_time - 3.0).abs() < 1e-9);
    }

    #[test]
    fn resume_on_empty_buffer_keeps_clock() {
        let session = session();
        let base = Instant::now();
        session.start(Mode::Both, base);
        session.pause();
        session.resume();

        assert_eq!(session.ingest(READING, at(base, 5.0)), Ingest::Resynced);
        let Ingest::Appended(next) = session.ingest(READING, at(base, 6.0)) else {
            panic!("expected an appended sample");
        };
        assert_eq!(next.relative_time, 6.0);
    }

    #[test]
    fn new_mode_clears_buffer_and_restarts_clock() {
        let session = session();
        let base = Instant::now();
        session.start(Mode::Humidity, base);
        session.ingest(READING, at(base, 4.0));

        session.start(Mode::Both, at(base, 10.0));
        assert!(session.is_empty());
        assert!(session.feed().is_empty());
        let Ingest::Appended(next) = session.ingest(READING, at(base, 10.5)) else {
            panic!("expected an appended sample");
        };
        assert_eq!(next.relative_time, 0.5);
    }

    #[test]
    fn shutdown_turns_ingest_into_noop() {
        let session = session();
        let base = Instant::now();
        session.start(Mode::Both, base);
        session.request_shutdown();
        assert_eq!(session.ingest(READING, at(base, 1.0)), Ingest::Shutdown);
        assert!(session.is_empty());
    }

    #[test]
    fn end_returns_to_menu() {
        let session = session();
        session.start(Mode::Both, Instant::now());
        session.ingest(READING, Instant::now());
        session.end();
        assert_eq!(session.mode(), None);
        assert!(session.is_empty());
        assert!(!session.resume());
    }
}

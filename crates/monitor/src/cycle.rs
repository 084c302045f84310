use hygro_core::HygroError;
use hygro_renderer::{DisplayState, Frame};
use hygro_series::Session;
use std::fmt;
use tracing::{debug, warn};

/// Render cycle lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Fewer than two points, or no mode selected.
    Idle,
    Active,
    Paused,
    Terminated,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Terminated => "terminated",
        })
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Paused, terminated or at the menu; nothing was read.
    Skipped,
    /// Fewer than two points buffered.
    Waiting,
    Rendered,
    /// The tick was abandoned; the next one runs as usual.
    Failed,
}

/// Periodic consumer of the buffer.  Only ever driven from the cooperative
/// loop, so two ticks never overlap.
#[derive(Debug)]
pub struct Cycle {
    state:        CycleState,
    display:      DisplayState,
    curve_points: usize,
}

impl Cycle {
    pub fn new(curve_points: usize) -> Self {
        Self {
            state: CycleState::Idle,
            display: DisplayState::new(),
            curve_points,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn toggle_metrics(&mut self) -> bool {
        self.display.toggle_metrics()
    }

    /// New session or back to the menu: forget the previous frame.
    pub fn restart(&mut self) {
        if self.state != CycleState::Terminated {
            self.state = CycleState::Idle;
            self.display.reset();
        }
    }

    pub fn pause(&mut self) -> bool {
        match self.state {
            CycleState::Idle | CycleState::Active => {
                self.state = CycleState::Paused;
                true
            }
            CycleState::Paused | CycleState::Terminated => false,
        }
    }

    /// Leave `Paused`; lands in `Idle` while fewer than two points exist.
    pub fn resume(&mut self, points: usize) -> bool {
        if self.state != CycleState::Paused {
            return false;
        }
        self.state = if points >= 2 {
            CycleState::Active
        } else {
            CycleState::Idle
        };
        true
    }

    pub fn terminate(&mut self) {
        self.state = CycleState::Terminated;
    }

    /// Snapshot, fit and refresh the display state.  Never touches the buffer.
    pub fn tick(&mut self, session: &Session) -> Tick {
        if session.is_shutdown() {
            self.terminate();
        }
        if matches!(self.state, CycleState::Paused | CycleState::Terminated) {
            return Tick::Skipped;
        }
        let Some(mode) = session.mode() else {
            return Tick::Skipped;
        };

        let snapshot = session.snapshot();
        if snapshot.len() < 2 {
            self.state = CycleState::Idle;
            return Tick::Waiting;
        }

        match Frame::build(&snapshot, mode, self.curve_points) {
            Ok(frame) => {
                debug!(points = frame.points(), %mode, "frame rendered");
                self.display.update(frame);
                self.state = CycleState::Active;
                Tick::Rendered
            }
            Err(e) => {
                warn!("Render tick abandoned: {}", HygroError::from(e));
                Tick::Failed
            }
        }
    }
}

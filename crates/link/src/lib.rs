//! Serial telemetry link: frame parsing and the blocking reader thread.

pub mod frame;
pub mod reader;

pub use frame::{parse_frame, FrameError, FRAME_PREFIX};
pub use reader::{
    connect, list_ports, spawn_reader, BufferedLines, LineSource, LinkError, LinkReader,
    ReaderStats,
};

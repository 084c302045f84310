//! Rolling sample storage shared between the link reader and the render loop.

pub mod buffer;
pub mod feed;
pub mod session;

pub use buffer::{SeriesBuffer, Snapshot};
pub use feed::LiveFeed;
pub use session::{Ingest, Session, SessionState};

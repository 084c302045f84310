pub mod error;
pub mod event;
pub mod state;

pub use error::{HygroError, Result};
pub use event::{Command, Notice, NoticeLevel};
pub use state::{Channel, Mode, Reading, Sample};

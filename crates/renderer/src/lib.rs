//! Per-tick derived view of the buffer: fits, metrics text, and the raster
//! plot used by the image export.

pub mod display;
pub mod frame;
pub mod plot;
pub mod text;

pub use display::DisplayState;
pub use frame::{ChannelFrame, Frame, RenderError, Trace, X_PADDING};
pub use plot::{draw_plot, render_plot, PlotCanvas};
pub use text::{metrics_text, status_line};

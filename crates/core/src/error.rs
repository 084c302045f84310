use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum HygroError {
    #[error("config error: {0}")]
    Config(String),

    #[error("link error: {0}")]
    Link(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = HygroError> = std::result::Result<T, E>;

pub mod schema;

pub use schema::{BufferConfig, CycleConfig, ExportConfig, LinkConfig, MonitorConfig, ThemeConfig};

use hygro_core::{HygroError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `MonitorConfig::default()` if
/// the file doesn't exist so the monitor always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(MonitorConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| HygroError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: MonitorConfig =
        toml::from_str(&raw).map_err(|e| HygroError::Config(format!("TOML parse error: {e}")))?;

    tracing::info!("Loaded configuration from '{}'", path.display());
    Ok(config.sanitized())
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("hygrograph").join("hygrograph.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load("/nonexistent/hygrograph.toml").unwrap();
        assert_eq!(config.link.port, "/dev/rfcomm0");
    }

    #[test]
    fn file_values_are_sanitized() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[cycle]\ninterval_ms = 0\n[link]\nport = \"COM7\"").unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.link.port, "COM7");
        assert_eq!(config.cycle.interval_ms, 10);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[link\nport = ").unwrap();

        assert!(matches!(load(file.path()), Err(HygroError::Config(_))));
    }
}

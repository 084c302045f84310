//! Durable artifacts of a paused session: a PNG of the plot and an XLSX
//! workbook with one sheet per active channel.

pub mod table;

pub use table::{tables, write_workbook, Table, TIME_COLUMN};

use hygro_config::MonitorConfig;
use hygro_core::{HygroError, Mode};
use hygro_renderer::{render_plot, Frame, RenderError};
use hygro_series::Snapshot;
use hygro_theme::Theme;
use image::ImageFormat;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("saving is only possible while acquisition is stopped")]
    NotPaused,

    #[error("acquire some data before saving")]
    NoData,

    #[error("cannot build the plot: {0}")]
    Render(#[from] RenderError),

    #[error("cannot save image {}: {source}", .path.display())]
    Image {
        path:   PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot save data {}: {source}", .path.display())]
    Table {
        path:   PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

impl From<ExportError> for HygroError {
    fn from(e: ExportError) -> Self {
        HygroError::Export(e.to_string())
    }
}

impl ExportError {
    /// Precondition failures are warnings; the rest are errors.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotPaused | Self::NoData)
    }
}

/// Paths written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub image: PathBuf,
    pub table: PathBuf,
}

impl Artifacts {
    /// `<base>.png` and `<base>.xlsx`; the extension is appended, never
    /// substituted.
    pub fn for_base(base: &Path) -> Self {
        Self {
            image: with_extension(base, "png"),
            table: with_extension(base, "xlsx"),
        }
    }
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Timestamped base name in the current directory.
pub fn default_base() -> PathBuf {
    PathBuf::from(
        chrono::Local::now()
            .format("hygrograph-%Y%m%d-%H%M%S")
            .to_string(),
    )
}

/// Writes both artifacts from one snapshot.
#[derive(Debug, Clone)]
pub struct Exporter {
    theme:        Theme,
    size:         (u32, u32),
    curve_points: usize,
}

impl Exporter {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            theme:        Theme::from_config(&config.theme),
            size:         config.export.pixel_size(),
            curve_points: config.cycle.curve_points,
        }
    }

    /// Reject the export unless acquisition is paused and data exists.
    pub fn check(paused: bool, snapshot: &Snapshot) -> Result<(), ExportError> {
        if !paused {
            return Err(ExportError::NotPaused);
        }
        if snapshot.is_empty() {
            return Err(ExportError::NoData);
        }
        Ok(())
    }

    /// Write `<base>.png` then `<base>.xlsx`.  A failed image aborts before
    /// the workbook is attempted.
    pub fn export(
        &self,
        paused: bool,
        snapshot: &Snapshot,
        mode: Mode,
        base: &Path,
    ) -> Result<Artifacts, ExportError> {
        Self::check(paused, snapshot)?;
        let artifacts = Artifacts::for_base(base);

        let frame = Frame::build(snapshot, mode, self.curve_points)?;
        let (width, height) = self.size;
        render_plot(&frame, &self.theme, width, height)
            .save_with_format(&artifacts.image, ImageFormat::Png)
            .map_err(|source| ExportError::Image {
                path: artifacts.image.clone(),
                source,
            })?;
        info!("Image saved: {}", artifacts.image.display());

        write_workbook(&tables(snapshot, mode), &artifacts.table).map_err(|source| {
            ExportError::Table {
                path: artifacts.table.clone(),
                source,
            }
        })?;
        info!("Data saved: {}", artifacts.table.display());

        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(n: usize) -> Snapshot {
        Snapshot {
            time:        (0..n).map(|i| i as f64 * 0.25).collect(),
            temperature: (0..n).map(|i| 21.0 + i as f64 * 0.05).collect(),
            humidity:    (0..n).map(|i| 50 + (i % 3) as i32).collect(),
        }
    }

    fn exporter() -> Exporter {
        Exporter::new(&MonitorConfig::default())
    }

    #[test]
    fn rejected_while_running_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        let err = exporter()
            .export(false, &snapshot(5), Mode::Both, &base)
            .unwrap_err();
        assert!(matches!(err, ExportError::NotPaused));
        assert!(err.is_precondition());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn rejected_on_empty_buffer_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        let err = exporter()
            .export(true, &Snapshot::default(), Mode::Humidity, &base)
            .unwrap_err();
        assert!(matches!(err, ExportError::NoData));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("session.v1");
        let artifacts = exporter()
            .export(true, &snapshot(8), Mode::Both, &base)
            .unwrap();

        assert_eq!(artifacts.image, dir.path().join("session.v1.png"));
        assert_eq!(artifacts.table, dir.path().join("session.v1.xlsx"));
        assert!(artifacts.image.is_file());
        assert!(artifacts.table.is_file());
    }

    #[test]
    fn single_point_still_exports() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = exporter()
            .export(true, &snapshot(1), Mode::Temperature, &dir.path().join("one"))
            .unwrap();
        assert!(artifacts.image.is_file());
    }

    #[test]
    fn image_failure_skips_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing").join("run");
        let err = exporter()
            .export(true, &snapshot(4), Mode::Humidity, &base)
            .unwrap_err();

        let ExportError::Image { path, .. } = &err else {
            panic!("expected an image error, got {err:?}");
        };
        assert_eq!(*path, dir.path().join("missing").join("run.png"));
        assert!(!dir.path().join("missing").join("run.xlsx").exists());
    }

    #[test]
    fn converts_into_top_level_error() {
        assert_eq!(
            HygroError::from(ExportError::NoData).to_string(),
            "export error: acquire some data before saving"
        );
    }

    #[test]
    fn default_base_is_timestamped() {
        let base = default_base();
        let name = base.to_string_lossy();
        assert!(name.starts_with("hygrograph-"));
        assert_eq!(name.len(), "hygrograph-YYYYmmdd-HHMMSS".len());
    }
}

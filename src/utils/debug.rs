//! Debug artifact output.
//!
//! When a debug directory is configured, intermediate masks and every cell
//! crop are written there as PNG files. Failures are logged and otherwise
//! ignored; debug output never changes the extraction result.

use crate::core::ProcessingStage;
use image::GrayImage;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes intermediate images to an optional directory.
#[derive(Debug, Clone, Default)]
pub struct DebugSink {
    dir: Option<PathBuf>,
}

impl DebugSink {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// A sink that writes nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Saves a pipeline stage image, e.g. `01_bw.png`.
    pub fn save_stage(&self, name: &str, image: &GrayImage) {
        self.save(name, image);
    }

    /// Saves the crop that was handed to the recognizer for a cell.
    pub fn save_cell(&self, row: usize, col: usize, image: &GrayImage) {
        self.save(&cell_artifact_name(row, col), image);
    }

    fn save(&self, name: &str, image: &GrayImage) {
        let Some(dir) = &self.dir else {
            return;
        };
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let path = dir.join(name);
        let result = std::fs::create_dir_all(dir)
            .map_err(image::ImageError::IoError)
            .and_then(|_| image.save(&path));
        match result {
            Ok(()) => debug!(path = %path.display(), "wrote debug artifact"),
            Err(err) => warn!(
                stage = %ProcessingStage::DebugOutput,
                path = %path.display(),
                error = %err,
                "failed to write debug artifact"
            ),
        }
    }
}

/// File name of the debug crop for cell `(row, col)`.
pub fn cell_artifact_name(row: usize, col: usize) -> String {
    format!("cell_r{row}_c{col}.png")
}

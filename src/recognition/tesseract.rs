//! Recognition through the `tesseract` command-line tool.

use crate::core::{RecognitionError, RecognitionRequest, TextRecognizer};
use image::{GrayImage, ImageFormat};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::trace;

/// LSTM engine only.
const ENGINE_MODE: &str = "1";

/// Runs the `tesseract` executable once per region.
///
/// Each call writes the region to a temporary PNG and reads the recognized
/// text from standard output, so concurrent calls share no state.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    /// Uses the executable at `program` (looked up on `PATH` when relative).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for recognizing `input` under `request`.
    pub fn arguments(input: &Path, request: &RecognitionRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            request.language.into(),
            "--oem".into(),
            ENGINE_MODE.into(),
            "--psm".into(),
            request.segmentation.psm().to_string().into(),
        ];
        if let Some(whitelist) = request.whitelist {
            args.push("-c".into());
            args.push(format!("tessedit_char_whitelist={whitelist}").into());
        }
        for (key, value) in request.options {
            args.push("-c".into());
            args.push(format!("{key}={value}").into());
        }
        args
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(
        &self,
        region: &GrayImage,
        request: &RecognitionRequest<'_>,
    ) -> Result<String, RecognitionError> {
        if region.width() == 0 || region.height() == 0 {
            return Ok(String::new());
        }

        let input = tempfile::Builder::new()
            .prefix("roster-cell-")
            .suffix(".png")
            .tempfile()?;
        region
            .save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| RecognitionError::Engine {
                message: format!("could not write region image: {e}"),
            })?;

        let args = Self::arguments(input.path(), request);
        trace!(program = %self.program.display(), ?args, "running tesseract");
        let output = Command::new(&self.program).args(&args).output()?;

        if !output.status.success() {
            return Err(RecognitionError::Engine {
                message: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| RecognitionError::InvalidOutput {
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SegmentationMode;
    use image::Luma;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_arguments_for_plain_request() {
        let request = RecognitionRequest::new("ces", SegmentationMode::SingleBlock);
        let args = strings(TesseractCli::arguments(Path::new("/tmp/x.png"), &request));
        assert_eq!(
            args,
            vec!["/tmp/x.png", "stdout", "-l", "ces", "--oem", "1", "--psm", "6"]
        );
    }

    #[test]
    fn test_arguments_carry_whitelist_and_options() {
        let options = [("load_system_dawg", "0"), ("preserve_interword_spaces", "1")];
        let request = RecognitionRequest::new("eng", SegmentationMode::SingleLine)
            .with_whitelist("0123456789")
            .with_options(&options);
        let args = strings(TesseractCli::arguments(Path::new("cell.png"), &request));
        assert_eq!(args[7], "7");
        assert_eq!(
            &args[8..],
            &[
                "-c",
                "tessedit_char_whitelist=0123456789",
                "-c",
                "load_system_dawg=0",
                "-c",
                "preserve_interword_spaces=1"
            ]
        );
    }

    #[test]
    fn test_missing_executable_is_an_error() {
        let cli = TesseractCli::new("/nonexistent/tesseract-binary");
        let request = RecognitionRequest::new("eng", SegmentationMode::SingleBlock);
        let region = GrayImage::from_pixel(8, 8, Luma([255]));
        assert!(cli.recognize(&region, &request).is_err());
    }

    #[test]
    fn test_empty_region_is_empty_text() {
        let cli = TesseractCli::new("/nonexistent/tesseract-binary");
        let request = RecognitionRequest::new("eng", SegmentationMode::SingleBlock);
        assert_eq!(cli.recognize(&GrayImage::new(0, 0), &request).unwrap(), "");
    }
}

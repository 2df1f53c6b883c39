use std::path::PathBuf;

use leaf_mask_types::LeafMask;
use log::info;

use crate::batch::InputImage;
use crate::settings::ReportSettings;

use super::error::OutputError;
use super::image::MaskOutput;
use super::json::JsonOutput;
use super::types::{ImageRecord, ReportJson};

/// Owns every sink of a batch run: the mask directory and the optional JSON
/// report accumulated across images.
pub struct OutputManager {
    masks: MaskOutput,
    json: Option<JsonOutput>,
}

impl OutputManager {
    pub fn new(mask_dir: PathBuf, report: Option<ReportSettings>) -> Self {
        Self {
            masks: MaskOutput::new(mask_dir),
            json: report.map(JsonOutput::new),
        }
    }

    pub fn write_mask(&mut self, input: &InputImage, mask: &LeafMask) -> Result<PathBuf, OutputError> {
        self.masks.write(input, mask)
    }

    pub fn finalize(&self, records: &[ImageRecord]) -> Result<(), OutputError> {
        let Some(json) = self.json.as_ref() else {
            return Ok(());
        };
        let masked = records.iter().filter(|r| r.mask.is_some()).count();
        let failed = records.iter().filter(|r| r.is_failure()).count();
        let report = ReportJson {
            processed: records.len(),
            masked,
            without_mask: records.len() - masked - failed,
            failed,
            images: records,
        };
        json.write(&report)?;
        info!("report written to {}", json.path().display());
        Ok(())
    }
}

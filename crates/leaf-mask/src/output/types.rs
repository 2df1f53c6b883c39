use std::path::PathBuf;

use leaf_mask_core::Rejection;
use leaf_mask_types::{MaskStats, TileCoverageMap};
use serde::Serialize;

/// Outcome for one input photograph, as written to the JSON report.
#[derive(Debug, Serialize, Clone)]
pub struct ImageRecord {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub mask: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<MaskStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles: Option<TileCoverageMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageRecord {
    pub(crate) fn failed(input: PathBuf, error: String) -> Self {
        Self {
            input,
            width: None,
            height: None,
            mask: None,
            rejection: None,
            stats: None,
            tiles: None,
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportJson<'a> {
    pub(crate) processed: usize,
    pub(crate) masked: usize,
    pub(crate) without_mask: usize,
    pub(crate) failed: usize,
    pub(crate) images: &'a [ImageRecord],
}

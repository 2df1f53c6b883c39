use std::fs;
use std::path::{Path, PathBuf};

use leaf_mask_core::{mask_stats, segment, tile_coverage};
use log::{debug, error, warn};
use thiserror::Error;

use crate::output::{ImageRecord, OutputError, OutputManager, load_frame};
use crate::progress::batch_bar;
use crate::settings::EffectiveSettings;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input {} does not exist", .path.display())]
    MissingInput { path: PathBuf },
    #[error("failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no images found in the given inputs")]
    NoImages,
    #[error("failed to write report: {0}")]
    Report(#[source] OutputError),
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub masked: usize,
    pub without_mask: usize,
    pub failed: usize,
    pub records: Vec<ImageRecord>,
}

impl BatchSummary {
    fn push(&mut self, record: ImageRecord) {
        self.processed += 1;
        if record.is_failure() {
            self.failed += 1;
        } else if record.mask.is_some() {
            self.masked += 1;
        } else {
            self.without_mask += 1;
        }
        self.records.push(record);
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// A photograph to process together with its path below the input it was
/// found in, which is mirrored under the mask directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct InputImage {
    pub path: PathBuf,
    pub relative: PathBuf,
}

impl InputImage {
    fn from_file(path: &Path) -> Self {
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf());
        Self {
            path: path.to_path_buf(),
            relative,
        }
    }

    fn below(root: &Path, path: PathBuf) -> Self {
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        Self { path, relative }
    }
}

/// Expands files and directories into the sorted list of photographs to
/// process. Explicit files are kept regardless of extension.
pub fn discover_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<InputImage>, BatchError> {
    let mut found = Vec::new();
    for input in inputs {
        if input.is_dir() {
            scan_dir(input, input, recursive, &mut found)?;
        } else if input.is_file() {
            found.push(InputImage::from_file(input));
        } else {
            return Err(BatchError::MissingInput {
                path: input.clone(),
            });
        }
    }
    found.sort();
    found.dedup_by(|a, b| a.path == b.path);
    if found.is_empty() {
        return Err(BatchError::NoImages);
    }
    Ok(found)
}

fn scan_dir(
    root: &Path,
    dir: &Path,
    recursive: bool,
    found: &mut Vec<InputImage>,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir).map_err(|source| BatchError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| BatchError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                scan_dir(root, &path, recursive, found)?;
            }
        } else if is_supported_image(&path) {
            found.push(InputImage::below(root, path));
        }
    }
    Ok(())
}

/// Segments every discovered photograph, writing masks and the optional
/// report. Per-image failures are recorded and do not stop the batch.
pub fn run_batch(
    settings: &EffectiveSettings,
    inputs: &[PathBuf],
) -> Result<BatchSummary, BatchError> {
    let images = discover_inputs(inputs, settings.recursive)?;
    let mut outputs = OutputManager::new(settings.output_dir.clone(), settings.report.clone());
    let bar = batch_bar(images.len());

    let mut summary = BatchSummary::default();
    for image in &images {
        let path = &image.path;
        bar.set_message(
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        let record = match process_image(image, settings, &mut outputs) {
            Ok(record) => record,
            Err(err) => {
                bar.suspend(|| error!("{}: {err}", path.display()));
                ImageRecord::failed(path.clone(), err.to_string())
            }
        };
        if let Some(rejection) = record.rejection {
            bar.suspend(|| {
                warn!(
                    "{}: no leaf region found ({})",
                    path.display(),
                    rejection.as_str()
                )
            });
        }
        summary.push(record);
        bar.inc(1);
    }
    bar.finish_and_clear();

    outputs
        .finalize(&summary.records)
        .map_err(BatchError::Report)?;
    Ok(summary)
}

#[derive(Debug, Error)]
enum ImageFailure {
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Mask(#[from] leaf_mask_core::MaskError),
}

fn process_image(
    image: &InputImage,
    settings: &EffectiveSettings,
    outputs: &mut OutputManager,
) -> Result<ImageRecord, ImageFailure> {
    let path = image.path.as_path();
    let frame = load_frame(path)?;
    let segmentation = segment(&frame, settings.relative_threshold)?;
    debug!("{}: {:?}", path.display(), segmentation.diagnostics);

    let mut record = ImageRecord {
        input: path.to_path_buf(),
        width: Some(frame.width()),
        height: Some(frame.height()),
        mask: None,
        rejection: segmentation.diagnostics.rejection,
        stats: None,
        tiles: None,
        error: None,
    };
    if let Some(mask) = segmentation.mask {
        record.stats = Some(mask_stats(&frame, &mask)?);
        record.tiles = Some(tile_coverage(&mask, &settings.tiles)?);
        record.mask = Some(outputs.write_mask(image, &mask)?);
    }
    Ok(record)
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use leaf_mask_types::{ColorFrame, LeafMask};

use crate::batch::InputImage;
use crate::output::error::OutputError;

const MASK_SUFFIX: &str = "_mask.png";

/// Decodes any supported photograph into an interleaved RGB frame.
pub fn load_frame(path: &Path) -> Result<ColorFrame, OutputError> {
    let decoded = image::open(path).map_err(|source| OutputError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = decoded.into_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(ColorFrame::from_owned(width, height, rgb.into_raw())?)
}

/// `<stem>_mask.png` for the given input photograph.
pub fn mask_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}{MASK_SUFFIX}")
}

/// Mask location below the output directory: the input's subdirectories are
/// kept and only the file name changes.
pub fn mask_relative_path(relative: &Path) -> PathBuf {
    relative.with_file_name(mask_file_name(relative))
}

pub(crate) struct MaskOutput {
    directory: PathBuf,
    // mask path -> input that produced it
    written: HashMap<PathBuf, PathBuf>,
}

impl MaskOutput {
    pub(crate) fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            written: HashMap::new(),
        }
    }

    /// Writes `mask` as an 8-bit grayscale PNG and returns the written path.
    ///
    /// A mask already written during this run is never overwritten.
    pub(crate) fn write(
        &mut self,
        input: &InputImage,
        mask: &LeafMask,
    ) -> Result<PathBuf, OutputError> {
        let path = self.directory.join(mask_relative_path(&input.relative));
        if let Some(previous) = self.written.get(&path) {
            return Err(OutputError::MaskCollision {
                path,
                previous: previous.clone(),
            });
        }
        let parent = path.parent().unwrap_or(self.directory.as_path());
        fs::create_dir_all(parent).map_err(|source| OutputError::io(parent, source))?;

        let mut encoded = Vec::new();
        let encoder = PngEncoder::new(&mut encoded);
        encoder
            .write_image(mask.data(), mask.width(), mask.height(), ColorType::L8)
            .map_err(|source| OutputError::Encode {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, encoded).map_err(|source| OutputError::io(&path, source))?;
        self.written.insert(path.clone(), input.path.clone());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_names_keep_the_input_stem() {
        assert_eq!(mask_file_name(Path::new("/a/b/leaf_01.JPG")), "leaf_01_mask.png");
        assert_eq!(mask_file_name(Path::new("plant.v2.tiff")), "plant.v2_mask.png");
    }

    fn input(path: &str, relative: &str) -> InputImage {
        InputImage {
            path: PathBuf::from(path),
            relative: PathBuf::from(relative),
        }
    }

    #[test]
    fn mask_paths_mirror_input_subdirectories() {
        assert_eq!(
            mask_relative_path(Path::new("tray1/1-sample.png")),
            Path::new("tray1").join("1-sample_mask.png")
        );
        assert_eq!(
            mask_relative_path(Path::new("leaf.jpg")),
            PathBuf::from("leaf_mask.png")
        );
    }

    #[test]
    fn second_mask_for_the_same_path_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = MaskOutput::new(dir.path().to_path_buf());
        let mask = LeafMask::from_owned(2, 1, vec![255, 0]).unwrap();
        let first = output.write(&input("a/leaf.png", "leaf.png"), &mask).unwrap();
        assert_eq!(first, dir.path().join("leaf_mask.png"));

        let err = output
            .write(&input("a/leaf.bmp", "leaf.bmp"), &mask)
            .unwrap_err();
        match err {
            OutputError::MaskCollision { path, previous } => {
                assert_eq!(path, first);
                assert_eq!(previous, PathBuf::from("a/leaf.png"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn written_mask_round_trips_as_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = MaskOutput::new(dir.path().join("masks"));
        let mask = LeafMask::from_owned(3, 2, vec![0, 255, 0, 255, 255, 0]).unwrap();
        let path = output.write(&input("photos/leaf.jpg", "leaf.jpg"), &mask).unwrap();
        assert_eq!(path, dir.path().join("masks").join("leaf_mask.png"));

        let decoded = image::open(&path).unwrap().into_luma8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.into_raw(), mask.data());
    }
}

//! Shared domain models for the leaf-mask workspace.
//!
//! This crate centralizes the lightweight buffers passed between the
//! segmentation core and the command line front end. Keep it free of image
//! codecs and threading crates so every crate can depend on it cheaply.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

pub type FrameResult<T> = Result<T, FrameError>;

/// Number of interleaved channels expected in a [`ColorFrame`].
pub const COLOR_CHANNELS: usize = 3;

pub const MASK_FOREGROUND: u8 = 0xFF;
pub const MASK_BACKGROUND: u8 = 0x00;

/// Immutable, row-major, channel-interleaved RGB8 photograph.
#[derive(Clone)]
pub struct ColorFrame {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl fmt::Debug for ColorFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl ColorFrame {
    /// Wraps an RGB8 buffer of exactly `width * height * 3` bytes.
    pub fn from_owned(width: u32, height: u32, data: Vec<u8>) -> FrameResult<Self> {
        Self::from_raw(width, height, COLOR_CHANNELS, data)
    }

    /// Wraps an interleaved buffer, rejecting anything but three channels.
    pub fn from_raw(width: u32, height: u32, channels: usize, data: Vec<u8>) -> FrameResult<Self> {
        if channels != COLOR_CHANNELS {
            return Err(FrameError::UnsupportedChannels { channels });
        }
        let required = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(COLOR_CHANNELS))
            .ok_or_else(|| FrameError::InvalidFrame {
                reason: "calculated frame length overflowed".into(),
            })?;
        if data.len() != required {
            return Err(FrameError::InsufficientData {
                data_len: data.len(),
                required,
            });
        }
        Ok(Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.width as usize * COLOR_CHANNELS
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Interleaved bytes of row `y`.
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.stride();
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Converts to single-channel luminance using BT.601 weights in 14-bit
    /// fixed point with rounding.
    pub fn luminance(&self) -> LumaPlane {
        const R_WEIGHT: u32 = 4899;
        const G_WEIGHT: u32 = 9617;
        const B_WEIGHT: u32 = 1868;
        const SHIFT: u32 = 14;
        const ROUND: u32 = 1 << (SHIFT - 1);

        let data = self
            .data
            .chunks_exact(COLOR_CHANNELS)
            .map(|px| {
                let y = px[0] as u32 * R_WEIGHT
                    + px[1] as u32 * G_WEIGHT
                    + px[2] as u32 * B_WEIGHT
                    + ROUND;
                (y >> SHIFT) as u8
            })
            .collect();
        LumaPlane {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Single-channel 8-bit plane derived from a [`ColorFrame`].
#[derive(Clone, Debug)]
pub struct LumaPlane {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl LumaPlane {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Full-resolution binary leaf mask, 255 marks leaf pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct LeafMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for LeafMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("foreground", &self.foreground_pixels())
            .finish()
    }
}

impl LeafMask {
    /// Builds a mask from a buffer whose values are already 0 or 255.
    pub fn from_owned(width: u32, height: u32, data: Vec<u8>) -> FrameResult<Self> {
        let required = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| FrameError::InvalidFrame {
                reason: "calculated mask length overflowed".into(),
            })?;
        if data.len() != required {
            return Err(FrameError::InsufficientData {
                data_len: data.len(),
                required,
            });
        }
        if let Some(&value) = data
            .iter()
            .find(|&&v| v != MASK_FOREGROUND && v != MASK_BACKGROUND)
        {
            return Err(FrameError::InvalidFrame {
                reason: format!("mask value {value} is neither 0 nor 255"),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize] == MASK_FOREGROUND
    }

    pub fn foreground_pixels(&self) -> usize {
        self.data.iter().filter(|&&v| v == MASK_FOREGROUND).count()
    }

    /// Fraction of pixels marked as leaf, in `[0, 1]`.
    pub fn coverage(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.foreground_pixels() as f32 / self.data.len() as f32
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("expected 3 interleaved channels, got {channels}")]
    UnsupportedChannels { channels: usize },

    #[error("provided buffer length {data_len} does not match the expected {required} bytes")]
    InsufficientData { data_len: usize, required: usize },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },
}

/// Luminance statistics of the pixels under a leaf mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaskStats {
    pub foreground_pixels: usize,
    pub foreground_ratio: f32,
    pub mean_luma: f32,
}

impl MaskStats {
    pub fn empty() -> Self {
        Self {
            foreground_pixels: 0,
            foreground_ratio: 0.0,
            mean_luma: 0.0,
        }
    }
}

/// Mask coverage of one fixed-size tile of the photograph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileCoverage {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub coverage: f32,
    pub in_focus: bool,
}

/// Centered grid of tiles with their mask coverage, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileCoverageMap {
    pub cols: u32,
    pub rows: u32,
    pub origin_x: u32,
    pub origin_y: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles: Vec<TileCoverage>,
}

impl TileCoverageMap {
    pub fn empty(tile_width: u32, tile_height: u32) -> Self {
        Self {
            cols: 0,
            rows: 0,
            origin_x: 0,
            origin_y: 0,
            tile_width,
            tile_height,
            tiles: Vec::new(),
        }
    }

    pub fn in_focus_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.in_focus).count()
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&TileCoverage> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get((row * self.cols + col) as usize)
    }
}

//! Error kinds that callers may want to match on

use std::path::PathBuf;
use thiserror::Error;

/// An image that could not be turned into pixels
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Why a single placement attempt produced no box. Never fatal to a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("sprite has no area ({width}x{height})")]
    InvalidSprite { width: u32, height: u32 },
    #[error("region {available_w}x{available_h} cannot fit a {bound_w}x{bound_h} sprite")]
    RegionTooSmall {
        available_w: i64,
        available_h: i64,
        bound_w: u32,
        bound_h: u32,
    },
    #[error(
        "sprite {bound_w}x{bound_h} at ({offset_x}, {offset_y}) overflows the {canvas_w}x{canvas_h} canvas"
    )]
    PlacementOverflow {
        offset_x: i64,
        offset_y: i64,
        bound_w: u32,
        bound_h: u32,
        canvas_w: u32,
        canvas_h: u32,
    },
}

impl SkipReason {
    /// Short stable name, used as a key in scene statistics
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::InvalidSprite { .. } => "invalid_sprite",
            SkipReason::RegionTooSmall { .. } => "region_too_small",
            SkipReason::PlacementOverflow { .. } => "placement_overflow",
        }
    }
}

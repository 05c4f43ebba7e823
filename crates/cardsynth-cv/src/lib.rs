//! Card scene synthesis
//!
//! Composites rotated card sprites onto a table background and produces the
//! matching bounding-box labels, for training an object detector.

pub mod assets;
pub mod augment;
pub mod compose;
pub mod error;
pub mod placement;
pub mod scene;
pub mod transform;
pub mod utils;

// Re-export commonly used types
pub use assets::{AssetStore, Image, SpritePool};
pub use cardsynth_core::{LabelFile, LabeledBox, NormalizedBox, PixelBox};
pub use error::{AssetError, SkipReason};
pub use placement::{FreePlacement, LabelGuided, PlacementRequest};
pub use scene::{DatasetConfig, Scene, SceneBuilder, SceneConfig};
pub use transform::{TargetSize, Transformed, Transformer};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Seams between the compositor and its collaborators
pub mod traits {
    use super::*;
    use rand::RngCore;

    /// Decides, attempt by attempt, where sprites go in one scene
    pub trait PlacementPolicy {
        /// Number of placement attempts planned for the scene
        fn attempts(&self) -> usize;

        /// Target for the attempt with the given index (`0..attempts()`)
        fn request(&self, attempt: usize, rng: &mut dyn RngCore) -> PlacementRequest;
    }

    /// External object detector. Its output can seed label-guided placement.
    pub trait Detector {
        fn detect(&self, image: &Image) -> Result<Vec<Detection>>;
    }

    /// One detector hit, top-left corner plus size in pixels
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct Detection {
        pub class_id: u32,
        pub x: i32,
        pub y: i32,
        pub width: u32,
        pub height: u32,
    }

    impl Detection {
        pub fn to_pixel_box(&self) -> PixelBox {
            PixelBox::from_origin_size(self.x, self.y, self.width, self.height)
        }
    }
}

//! Loading sprites, backgrounds and label pools from disk

pub mod image;
pub mod pool;
pub mod store;

pub use self::image::Image;
pub use pool::SpritePool;
pub use store::{load_label_pool, AssetStore};

//! Decoded sprites shared across placements and scenes

use super::image::Image;
use super::store::AssetStore;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded sprite and where it came from
#[derive(Debug, Clone)]
pub struct Sprite {
    pub path: PathBuf,
    pub image: Arc<Image>,
}

/// Every sprite that decoded successfully. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct SpritePool {
    sprites: Vec<Sprite>,
    skipped: Vec<PathBuf>,
}

impl SpritePool {
    /// Decode all `paths`, skipping (and remembering) the ones that fail
    pub fn load<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut pool = Self::default();

        for path in paths {
            let path = path.as_ref();
            match Image::load(path) {
                Ok(image) => pool.sprites.push(Sprite {
                    path: path.to_path_buf(),
                    image: Arc::new(image),
                }),
                Err(e) => {
                    tracing::warn!("skipping sprite: {e}");
                    pool.skipped.push(path.to_path_buf());
                }
            }
        }

        tracing::info!(
            loaded = pool.sprites.len(),
            skipped = pool.skipped.len(),
            "sprite pool ready"
        );
        pool
    }

    /// Decode every image the store can find, sorted by path
    pub fn from_store(store: &AssetStore) -> Self {
        let mut paths: Vec<PathBuf> = store.images().collect();
        paths.sort();
        Self::load(paths)
    }

    /// Build from images already in memory
    pub fn from_images<I: IntoIterator<Item = Image>>(images: I) -> Self {
        let sprites = images
            .into_iter()
            .enumerate()
            .map(|(i, image)| Sprite {
                path: PathBuf::from(format!("<memory:{i}>")),
                image: Arc::new(image),
            })
            .collect();

        Self {
            sprites,
            skipped: Vec::new(),
        }
    }

    /// Uniform pick, with replacement
    pub fn choose(&self, rng: &mut dyn RngCore) -> Option<&Sprite> {
        self.sprites.choose(rng)
    }

    /// Paths that failed to load
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;

    #[test]
    fn test_load_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        RgbaImage::from_pixel(5, 7, Rgba([9, 9, 9, 255]))
            .save(&good)
            .unwrap();
        let bad = dir.path().join("bad.png");
        fs::write(&bad, b"nope").unwrap();
        let missing = dir.path().join("missing.png");

        let pool = SpritePool::load([&good, &bad, &missing]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.skipped().len(), 2);
        let mut rng = StdRng::seed_from_u64(1);
        let sprite = pool.choose(&mut rng).unwrap();
        assert_eq!(sprite.image.dimensions(), (5, 7));
        assert_eq!(sprite.path, good);
    }

    #[test]
    fn test_choose_from_empty_pool() {
        let pool = SpritePool::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pool.choose(&mut rng).is_none());
    }

    #[test]
    fn test_choose_is_reproducible() {
        let pool = SpritePool::from_images(
            (1..=5).map(|w| Image::from_rgba(RgbaImage::new(w, 1))),
        );

        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| pool.choose(&mut rng).unwrap().image.width())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }
}

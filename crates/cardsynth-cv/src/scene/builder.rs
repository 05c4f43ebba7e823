//! The placement loop

use super::config::{PlacementMode, SceneConfig};
use super::{AttemptOutcome, Scene};
use crate::assets::{Image, SpritePool};
use crate::compose::Compositor;
use crate::error::SkipReason;
use crate::placement::{FreePlacement, LabelGuided};
use crate::traits::PlacementPolicy;
use crate::transform::Transformer;
use crate::Result;
use cardsynth_core::{LabeledBox, NormalizedBox, PixelBox};
use rand::RngCore;
use std::time::Instant;

/// Builds scenes by compositing sprites from a shared pool
pub struct SceneBuilder<'a> {
    sprites: &'a SpritePool,
    class_id: u32,
    transformer: Transformer,
    compositor: Compositor,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(sprites: &'a SpritePool) -> Self {
        Self {
            sprites,
            class_id: 0,
            transformer: Transformer::new(),
            compositor: Compositor::new(),
        }
    }

    /// Class id attached to every realized box
    pub fn with_class_id(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    /// Pick the policy described by `config` and build one scene.
    ///
    /// `labels` are only used in label-guided mode.
    pub fn build_from_config(
        &self,
        background: &Image,
        config: &SceneConfig,
        labels: &[NormalizedBox],
        rng: &mut dyn RngCore,
    ) -> Result<Scene> {
        let (width, height) = background.dimensions();

        let policy: Box<dyn PlacementPolicy> = match config.mode {
            PlacementMode::Free => Box::new(FreePlacement::new(
                config.region.resolve(width, height),
                config.card_size,
                config.cards_per_scene.sample(rng),
                config.angles,
            )),
            PlacementMode::LabelGuided => Box::new(LabelGuided::from_labels(
                labels,
                width,
                height,
                config.cards_per_scene,
                config.angles,
                rng,
            )),
        };

        self.build(background, policy.as_ref(), rng)
    }

    /// Run every attempt the policy plans on a copy of `background`
    pub fn build(
        &self,
        background: &Image,
        policy: &dyn PlacementPolicy,
        rng: &mut dyn RngCore,
    ) -> Result<Scene> {
        let start_time = Instant::now();
        let attempts = policy.attempts();

        if attempts > 0 && self.sprites.is_empty() {
            anyhow::bail!("cannot place {} cards: sprite pool is empty", attempts);
        }

        let mut canvas = background.clone();
        let mut outcomes = Vec::with_capacity(attempts);

        for attempt in 0..attempts {
            let outcome = match self.try_place(&mut canvas, policy, attempt, rng) {
                Ok(bbox) => AttemptOutcome::Placed(LabeledBox::new(self.class_id, bbox)),
                Err(reason) => {
                    tracing::debug!(attempt, "placement skipped: {reason}");
                    AttemptOutcome::Skipped(reason)
                }
            };
            outcomes.push(outcome);
        }

        let scene = Scene::new(canvas, outcomes, start_time.elapsed());
        tracing::debug!(
            attempts = scene.stats().attempts,
            placed = scene.stats().placed,
            skipped = scene.stats().skipped_total(),
            "scene built"
        );
        Ok(scene)
    }

    /// pick sprite -> target -> resize/rotate -> offset -> blend
    fn try_place(
        &self,
        canvas: &mut Image,
        policy: &dyn PlacementPolicy,
        attempt: usize,
        rng: &mut dyn RngCore,
    ) -> std::result::Result<PixelBox, SkipReason> {
        let sprite = self
            .sprites
            .choose(rng)
            .ok_or(SkipReason::InvalidSprite { width: 0, height: 0 })?;
        let request = policy.request(attempt, rng);

        let (sprite_w, sprite_h) = sprite.image.dimensions();
        let size = request.target_size(sprite_w, sprite_h)?;
        let rotated = self.transformer.apply(&sprite.image, size, request.angle())?;
        let (offset_x, offset_y) = request.offset(rotated.bound_w, rotated.bound_h, rng)?;

        self.compositor.place(canvas, &rotated, offset_x, offset_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::{AngleSet, PlacementRequest, Region};
    use crate::scene::config::CountRange;
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> SpritePool {
        SpritePool::from_images([
            Image::from_rgba(RgbaImage::from_pixel(50, 70, Rgba([255, 0, 0, 255]))),
            Image::from_rgb(image::RgbImage::from_pixel(60, 60, image::Rgb([0, 255, 0]))),
        ])
    }

    fn table(width: u32, height: u32) -> Image {
        Image::from_rgb(image::RgbImage::from_pixel(width, height, image::Rgb([20, 80, 20])))
    }

    /// Fixed targets, for exercising the loop without randomness in placement
    struct Fixed(Vec<PlacementRequest>);

    impl PlacementPolicy for Fixed {
        fn attempts(&self) -> usize {
            self.0.len()
        }

        fn request(&self, attempt: usize, _rng: &mut dyn RngCore) -> PlacementRequest {
            self.0[attempt]
        }
    }

    #[test]
    fn test_overflowing_attempt_is_dropped() {
        let pool = pool();
        let builder = SceneBuilder::new(&pool);
        let policy = Fixed(vec![
            PlacementRequest::LabelGuided {
                target: PixelBox::new(10, 10, 60, 60),
                fit: (40.0, 40.0),
                angle: 0.0,
            },
            // centered on a box hanging off the right edge
            PlacementRequest::LabelGuided {
                target: PixelBox::new(180, 10, 230, 60),
                fit: (40.0, 40.0),
                angle: 0.0,
            },
        ]);

        let mut rng = StdRng::seed_from_u64(1);
        let scene = builder.build(&table(200, 200), &policy, &mut rng).unwrap();

        assert_eq!(scene.outcomes().len(), 2);
        assert_eq!(scene.boxes().len(), 1);
        assert!(matches!(
            scene.outcomes()[1],
            AttemptOutcome::Skipped(SkipReason::PlacementOverflow { .. })
        ));
        assert!(scene.boxes()[0].bbox.is_inside(200, 200));
    }

    #[test]
    fn test_region_too_small_is_skipped() {
        let pool = pool();
        let builder = SceneBuilder::new(&pool);
        let policy =
            FreePlacement::new(Region::new(0, 0, 120, 120), (100, 140), 3, AngleSet::upright());

        let mut rng = StdRng::seed_from_u64(2);
        let scene = builder.build(&table(400, 400), &policy, &mut rng).unwrap();

        assert!(scene.boxes().is_empty());
        assert_eq!(scene.stats().skipped.get("region_too_small"), Some(&3));
        assert_eq!(scene.canvas(), &table(400, 400));
    }

    #[test]
    fn test_class_id_applied() {
        let pool = pool();
        let builder = SceneBuilder::new(&pool).with_class_id(4);
        let policy = FreePlacement::new(
            Region::new(0, 0, 1000, 1000),
            (100, 140),
            5,
            AngleSet::new(-30, 30, 5),
        );

        let mut rng = StdRng::seed_from_u64(3);
        let scene = builder.build(&table(1000, 1000), &policy, &mut rng).unwrap();
        assert!(!scene.boxes().is_empty());
        assert!(scene.boxes().iter().all(|b| b.class_id == 4));
    }

    #[test]
    fn test_same_seed_same_scene() {
        let pool = pool();
        let builder = SceneBuilder::new(&pool);
        let config = SceneConfig::free();

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            builder
                .build_from_config(&table(640, 480), &config, &[], &mut rng)
                .unwrap()
        };
        let (a, b) = (run(17), run(17));
        assert_eq!(a.boxes(), b.boxes());
        assert_eq!(a.canvas(), b.canvas());
    }

    #[test]
    fn test_label_guided_from_config() {
        let pool = pool();
        let builder = SceneBuilder::new(&pool);
        let config = SceneConfig {
            cards_per_scene: CountRange::exactly(2),
            angles: AngleSet::upright(),
            ..SceneConfig::label_guided()
        };
        let labels = [
            NormalizedBox::new(0, 0.25, 0.25, 0.125, 0.25),
            NormalizedBox::new(0, 0.75, 0.75, 0.125, 0.25),
        ];

        let mut rng = StdRng::seed_from_u64(4);
        let scene = builder
            .build_from_config(&table(800, 600), &config, &labels, &mut rng)
            .unwrap();

        assert_eq!(scene.boxes().len(), 2);
        for b in scene.boxes() {
            // scaled into the 100x150 average footprint
            assert!(b.bbox.width() <= 100 && b.bbox.height() <= 150);
        }
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let pool = SpritePool::default();
        let policy =
            FreePlacement::new(Region::new(0, 0, 100, 100), (10, 10), 1, AngleSet::upright());
        let mut rng = StdRng::seed_from_u64(5);
        assert!(SceneBuilder::new(&pool)
            .build(&table(100, 100), &policy, &mut rng)
            .is_err());
    }
}

//! Burst emission.
//!
//! A burst field starts empty. Each [`BurstEmitter::trigger`] arms the
//! emitter for `waves` consecutive frames; every armed frame appends one wave
//! of `count` particles, never growing the store past `capacity`. The
//! particles then fade by the field's decay rate and are dropped by the
//! [`Stepper`](crate::Stepper) once invisible.
//!
//! | Config | Effect |
//! |--------|--------|
//! | `count` | Particles per wave |
//! | `waves` | Frames that each spawn a wave |
//! | `capacity` | Hard cap on live particles |
//! | `scatter` | Spawn anywhere on the surface instead of at the origin |
//! | `velocity` | Per-axis initial velocity span |
//!
//! # Example
//!
//! ```ignore
//! let mut engine = FieldEngine::new(FieldConfig::data_stream(), bounds, Some(7))?;
//! engine.trigger(Some(Vec2::new(400.0, 300.0)));
//! ```

use glam::Vec2;
use log::trace;
use rand::Rng;

use crate::config::{BurstConfig, FieldConfig};
use crate::particle::Particle;
use crate::store::ParticleStore;

/// Spawns waves of particles after a trigger.
#[derive(Debug, Clone)]
pub struct BurstEmitter {
    config: BurstConfig,
    origin: Option<Vec2>,
    waves_left: u32,
}

impl BurstEmitter {
    pub fn new(config: BurstConfig) -> Self {
        Self {
            config,
            origin: None,
            waves_left: 0,
        }
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    /// Arm the emitter. A trigger while a burst is running restarts the
    /// wave count at the new origin.
    ///
    /// `None` spawns at the surface centre unless the burst scatters.
    pub fn trigger(&mut self, origin: Option<Vec2>) {
        self.origin = origin;
        self.waves_left = self.config.waves;
    }

    /// Whether another wave is due.
    pub fn is_active(&self) -> bool {
        self.waves_left > 0
    }

    pub fn waves_left(&self) -> u32 {
        self.waves_left
    }

    /// Append one wave if armed. Returns the number of particles spawned.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        store: &mut ParticleStore,
        field: &FieldConfig,
        rng: &mut R,
    ) -> usize {
        if self.waves_left == 0 {
            return 0;
        }
        self.waves_left -= 1;

        let room = self.config.capacity.saturating_sub(store.len());
        let count = self.config.count.min(room);
        let bounds = store.bounds();
        let origin = self.origin.unwrap_or_else(|| bounds.center());

        for _ in 0..count {
            let position = if self.config.scatter {
                bounds.random_point(rng)
            } else {
                origin
            };
            let velocity = Vec2::new(
                self.config.velocity.sample(rng),
                self.config.velocity.sample(rng),
            );
            store.push(
                Particle::new(position, velocity)
                    .with_size(field.size.sample(rng))
                    .with_opacity(field.opacity.sample(rng)),
            );
        }

        trace!(
            "burst wave spawned {} particle(s), {} wave(s) left, {} live",
            count,
            self.waves_left,
            store.len()
        );
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use crate::store::Bounds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field() -> FieldConfig {
        FieldConfig::data_stream()
    }

    #[test]
    fn test_idle_emitter_spawns_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
        let mut emitter = BurstEmitter::new(BurstConfig::new(5));
        assert_eq!(emitter.emit(&mut store, &field(), &mut rng), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_wave_spawns_at_origin() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
        let mut emitter = BurstEmitter::new(BurstConfig::new(8));
        emitter.trigger(Some(Vec2::new(10.0, 20.0)));

        assert_eq!(emitter.emit(&mut store, &field(), &mut rng), 8);
        assert!(!emitter.is_active());
        for p in store.particles() {
            assert_eq!(p.position, Vec2::new(10.0, 20.0));
            assert_eq!(p.opacity, 1.0);
            assert!(Span::symmetric(2.0).contains(p.velocity.x));
        }
    }

    #[test]
    fn test_no_origin_uses_center() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut store = ParticleStore::new(Bounds::new(200.0, 100.0));
        let mut emitter = BurstEmitter::new(BurstConfig::new(1));
        emitter.trigger(None);
        emitter.emit(&mut store, &field(), &mut rng);
        assert_eq!(store.particles()[0].position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_waves_stop_after_count() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
        let mut emitter = BurstEmitter::new(BurstConfig::new(2).with_waves(3));
        emitter.trigger(None);
        let spawned: Vec<usize> = (0..5)
            .map(|_| emitter.emit(&mut store, &field(), &mut rng))
            .collect();
        assert_eq!(spawned, [2, 2, 2, 0, 0]);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
        let mut emitter =
            BurstEmitter::new(BurstConfig::new(10).with_waves(10).with_capacity(25));
        emitter.trigger(None);
        while emitter.is_active() {
            emitter.emit(&mut store, &field(), &mut rng);
        }
        assert_eq!(store.len(), 25);
    }

    #[test]
    fn test_scatter_spawns_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = Bounds::new(320.0, 240.0);
        let mut store = ParticleStore::new(bounds);
        let mut emitter = BurstEmitter::new(BurstConfig::new(50).scattered());
        emitter.trigger(Some(Vec2::ZERO));
        emitter.emit(&mut store, &field(), &mut rng);
        assert!(store.particles().iter().all(|p| bounds.contains(p.position)));
    }
}

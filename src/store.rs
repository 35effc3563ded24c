//! Particle storage for one effect instance.
//!
//! The store is created when a layer mounts, mutated in place by the
//! [`Stepper`](crate::Stepper) every frame, read by the
//! [`Renderer`](crate::Renderer), and dropped when the layer unmounts.
//! Nothing outside the owning layer holds on to individual particles.

use glam::Vec2;
use rand::Rng;

use crate::config::{FieldConfig, ResizePolicy};
use crate::particle::{Label, Particle};

/// Drawing-surface extent in pixels. The origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Whether both sides are positive.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Uniform random point inside the bounds.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen::<f32>() * self.width,
            rng.gen::<f32>() * self.height,
        )
    }
}

impl From<(u32, u32)> for Bounds {
    fn from((w, h): (u32, u32)) -> Self {
        Bounds::new(w as f32, h as f32)
    }
}

/// The authoritative particle state of one field.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    bounds: Bounds,
    /// Last bounds with area; positions are relative to these.
    scale_from: Bounds,
}

impl ParticleStore {
    /// An empty store.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            particles: Vec::new(),
            bounds,
            scale_from: bounds,
        }
    }

    /// Create `count` particles with uniform random position inside `bounds`
    /// and per-axis velocity, size and opacity drawn from the config spans.
    ///
    /// When the config drifts, every particle gets a label and a first
    /// target; labels are handed out in order and fall back to empty text.
    pub fn initialize<R: Rng + ?Sized>(
        count: usize,
        bounds: Bounds,
        config: &FieldConfig,
        rng: &mut R,
    ) -> Self {
        let particles = (0..count)
            .map(|i| {
                let position = bounds.random_point(rng);
                let velocity = Vec2::new(config.velocity.sample(rng), config.velocity.sample(rng));
                let mut particle = Particle::new(position, velocity)
                    .with_size(config.size.sample(rng))
                    .with_opacity(config.opacity.sample(rng));
                if config.drift.is_some() || !config.labels.is_empty() {
                    let text = config.labels.get(i).cloned().unwrap_or_default();
                    particle = particle.with_label(Label::new(text, bounds.random_point(rng)));
                }
                particle
            })
            .collect();

        Self {
            particles,
            bounds,
            scale_from: bounds,
        }
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Keep only particles matching `keep`, preserving order. Returns how
    /// many were dropped.
    pub fn retain<F: FnMut(&Particle) -> bool>(&mut self, keep: F) -> usize {
        let before = self.particles.len();
        self.particles.retain(keep);
        before - self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Adopt new surface bounds.
    ///
    /// Under [`ResizePolicy::Rescale`] positions and targets scale from the
    /// last bounds that had area. A zero-sized surface (a minimized window)
    /// is adopted without touching positions, so the next real size restores
    /// the layout.
    pub fn set_bounds(&mut self, bounds: Bounds, policy: ResizePolicy) {
        self.bounds = bounds;
        if !bounds.has_area() {
            return;
        }
        let from = std::mem::replace(&mut self.scale_from, bounds);
        if policy == ResizePolicy::Keep || !from.has_area() {
            return;
        }
        let scale = bounds.size() / from.size();
        for p in &mut self.particles {
            p.position *= scale;
            if let Some(label) = &mut p.label {
                label.target *= scale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_respects_spans() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = FieldConfig::particle_background();
        let bounds = Bounds::new(800.0, 600.0);
        let store = ParticleStore::initialize(100, bounds, &config, &mut rng);

        assert_eq!(store.len(), 100);
        for p in store.particles() {
            assert!(bounds.contains(p.position));
            assert!(config.velocity.contains(p.velocity.x));
            assert!(config.velocity.contains(p.velocity.y));
            assert!(config.size.contains(p.size));
            assert!(config.opacity.contains(p.opacity));
            assert!(p.label.is_none());
        }
    }

    #[test]
    fn test_seeded_initialize_is_reproducible() {
        let config = FieldConfig::neural_network();
        let bounds = Bounds::new(640.0, 480.0);
        let a = ParticleStore::initialize(15, bounds, &config, &mut StdRng::seed_from_u64(9));
        let b = ParticleStore::initialize(15, bounds, &config, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_labels_assigned_in_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = FieldConfig::label_stream(["DOCKER", "MLOPS"]).with_count(3);
        let store = ParticleStore::initialize(3, Bounds::new(100.0, 100.0), &config, &mut rng);
        let texts: Vec<_> = store
            .particles()
            .iter()
            .map(|p| p.label.as_ref().unwrap().text.as_str())
            .collect();
        assert_eq!(texts, ["DOCKER", "MLOPS", ""]);
    }

    #[test]
    fn test_rescale_keeps_relative_position() {
        let config = FieldConfig::new().with_velocity(Span::fixed(0.0));
        let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
        store.push(Particle::new(Vec2::new(50.0, 25.0), Vec2::ZERO));
        store.set_bounds(Bounds::new(200.0, 400.0), config.resize);
        assert_eq!(store.particles()[0].position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_zero_size_resize_restores_layout() {
        let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
        store.push(Particle::new(Vec2::new(50.0, 25.0), Vec2::ZERO));

        store.set_bounds(Bounds::new(0.0, 80.0), ResizePolicy::Rescale);
        assert_eq!(store.bounds(), Bounds::new(0.0, 80.0));
        assert_eq!(store.particles()[0].position, Vec2::new(50.0, 25.0));

        store.set_bounds(Bounds::new(200.0, 200.0), ResizePolicy::Rescale);
        assert_eq!(store.particles()[0].position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_keep_policy_leaves_positions() {
        let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
        store.push(Particle::new(Vec2::new(90.0, 90.0), Vec2::ZERO));
        store.set_bounds(Bounds::new(50.0, 50.0), ResizePolicy::Keep);
        assert_eq!(store.particles()[0].position, Vec2::new(90.0, 90.0));
        assert_eq!(store.bounds(), Bounds::new(50.0, 50.0));
    }

    #[test]
    fn test_retain_reports_removed() {
        let mut store = ParticleStore::new(Bounds::new(10.0, 10.0));
        store.push(Particle::new(Vec2::ZERO, Vec2::ZERO).with_opacity(0.0));
        store.push(Particle::new(Vec2::ZERO, Vec2::ZERO).with_opacity(0.5));
        assert_eq!(store.retain(Particle::is_alive), 1);
        assert_eq!(store.len(), 1);
    }
}

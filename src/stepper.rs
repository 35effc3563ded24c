//! Advances a field by one frame.

use glam::Vec2;
use rand::Rng;

use crate::config::{Boundary, FieldConfig};
use crate::particle::Particle;
use crate::rules::{Rule, StepContext};
use crate::store::ParticleStore;

/// What a single tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles still in the store.
    pub alive: usize,
    /// Particles dropped because their opacity ran out.
    pub expired: usize,
}

/// Ordered list of [`Rule`]s applied to every particle each tick.
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    rules: Vec<Rule>,
}

impl Stepper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules for a config, in the canonical order: move, walls, pointer,
    /// damping, fade, drift.
    pub fn from_config(config: &FieldConfig) -> Self {
        let mut stepper = Stepper::new().with_rule(Rule::Integrate);
        match config.boundary {
            Boundary::Reflect => stepper.rules.push(Rule::BounceWalls),
            Boundary::ReflectInset => stepper.rules.push(Rule::BounceWallsInset),
            Boundary::Unbounded => {}
        }
        if let Some(pointer) = config.pointer {
            stepper.rules.push(Rule::Repel {
                radius: pointer.radius,
                strength: pointer.strength,
            });
        }
        if let Some(damping) = config.damping {
            stepper.rules.push(Rule::Damping(damping));
        }
        if let Some(rate) = config.decay {
            stepper.rules.push(Rule::FadeOut(rate));
        }
        if let Some(drift) = config.drift {
            stepper.rules.push(Rule::Drift(drift));
        }
        stepper
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Apply every rule to every particle, then drop the ones whose opacity
    /// reached zero (only when a rule can fade them).
    pub fn step<R: Rng + ?Sized>(
        &self,
        store: &mut ParticleStore,
        pointer: Option<Vec2>,
        rng: &mut R,
    ) -> StepReport {
        let mut ctx = StepContext {
            bounds: store.bounds(),
            pointer,
            rng,
        };

        for particle in store.particles_mut() {
            for rule in &self.rules {
                rule.apply(particle, &mut ctx);
            }
        }

        let expired = if self.rules.iter().any(Rule::expires_particles) {
            store.retain(Particle::is_alive)
        } else {
            0
        };

        StepReport {
            alive: store.len(),
            expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PointerForce, Span};
    use crate::store::Bounds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rule_order_from_config() {
        let config = FieldConfig::particle_background();
        let stepper = Stepper::from_config(&config);
        assert_eq!(
            stepper.rules(),
            &[
                Rule::Integrate,
                Rule::BounceWalls,
                Rule::Repel {
                    radius: 150.0,
                    strength: 0.1
                },
                Rule::Damping(0.99),
            ]
        );
    }

    #[test]
    fn test_burst_config_has_no_walls() {
        let stepper = Stepper::from_config(&FieldConfig::data_stream());
        assert!(!stepper.rules().contains(&Rule::BounceWalls));
        assert!(stepper.rules().contains(&Rule::FadeOut(0.015)));
    }

    #[test]
    fn test_step_reports_expired() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut store = ParticleStore::new(Bounds::new(10.0, 10.0));
        store.push(Particle::new(Vec2::ZERO, Vec2::ZERO).with_opacity(0.1));
        store.push(Particle::new(Vec2::ZERO, Vec2::ZERO).with_opacity(0.9));
        let stepper = Stepper::new().with_rule(Rule::FadeOut(0.5));

        let report = stepper.step(&mut store, None, &mut rng);
        assert_eq!(report, StepReport { alive: 1, expired: 1 });
    }

    #[test]
    fn test_ambient_step_never_removes() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = FieldConfig::new()
            .with_opacity(Span::fixed(0.0))
            .with_size(Span::fixed(1.0))
            .with_pointer(PointerForce::default());
        let mut store = ParticleStore::initialize(10, Bounds::new(50.0, 50.0), &config, &mut rng);
        let report = Stepper::from_config(&config).step(&mut store, Some(Vec2::new(25.0, 25.0)), &mut rng);
        assert_eq!(report.alive, 10);
        assert_eq!(report.expired, 0);
    }
}

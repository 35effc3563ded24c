//! Per-particle behavior rules.
//!
//! A [`Stepper`](crate::Stepper) runs its rules in order on every particle,
//! once per frame. Time is measured in frames: velocities are in pixels per
//! frame and rates are per frame.
//!
//! | Rule | Effect |
//! |------|--------|
//! | [`Rule::Integrate`] | `position += velocity` |
//! | [`Rule::BounceWalls`] | Reflect and clamp at the surface edges |
//! | [`Rule::BounceWallsInset`] | Same, keeping the whole disc visible |
//! | [`Rule::Repel`] | Push away from the pointer |
//! | [`Rule::Damping`] | `velocity *= factor` |
//! | [`Rule::FadeOut`] | `opacity -= rate` |
//! | [`Rule::Drift`] | Wander toward the label target |
//!
//! Every rule that divides by a distance skips the particle when that
//! distance is zero or not finite, so no rule can introduce NaN.

use glam::Vec2;
use rand::Rng;

use crate::config::{DriftConfig, DriftStep};
use crate::particle::Particle;
use crate::store::Bounds;

/// Opacity below this after a fade counts as fully faded.
const FADE_EPSILON: f32 = 1e-5;

/// Drift steps shorter than this snap onto the target.
const MIN_DRIFT_STEP: f32 = 1e-3;

/// Per-tick inputs shared by every rule.
pub struct StepContext<'a, R: Rng + ?Sized> {
    pub bounds: Bounds,
    /// Last known pointer position, if the field tracks one.
    pub pointer: Option<Vec2>,
    pub rng: &'a mut R,
}

/// A behavior applied to each particle every tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Move by one frame of velocity.
    Integrate,

    /// Reflect off `[0, width] x [0, height]`.
    ///
    /// A particle found outside on an axis has that axis clamped back onto
    /// the edge and its velocity component pointed back inside.
    BounceWalls,

    /// Reflect off the edges inset by the particle size.
    BounceWallsInset,

    /// Repel from the pointer.
    ///
    /// Inside `radius` the velocity is pushed away from the pointer by
    /// `(radius - d) / radius * strength`.
    Repel { radius: f32, strength: f32 },

    /// Multiply velocity by this factor.
    Damping(f32),

    /// Subtract this much opacity, never going below zero.
    FadeOut(f32),

    /// Move toward the label target; pick a new random target on arrival.
    Drift(DriftConfig),
}

impl Rule {
    pub fn apply<R: Rng + ?Sized>(&self, p: &mut Particle, ctx: &mut StepContext<'_, R>) {
        match self {
            Rule::Integrate => {
                p.position += p.velocity;
            }
            Rule::BounceWalls => {
                reflect(p, Vec2::ZERO, ctx.bounds.size());
            }
            Rule::BounceWallsInset => {
                let inset = Vec2::splat(p.size.max(0.0));
                let size = ctx.bounds.size();
                let lo = inset.min(size * 0.5);
                let hi = (size - inset).max(size * 0.5);
                reflect(p, lo, hi);
            }
            &Rule::Repel { radius, strength } => {
                let Some(pointer) = ctx.pointer else {
                    return;
                };
                let delta = pointer - p.position;
                let distance = delta.length();
                if distance > 0.0 && distance < radius && distance.is_finite() {
                    let force = (radius - distance) / radius;
                    p.velocity -= delta / distance * force * strength;
                }
            }
            &Rule::Damping(factor) => {
                p.velocity *= factor;
            }
            &Rule::FadeOut(rate) => {
                let faded = (p.opacity - rate).clamp(0.0, 1.0);
                // Snap float residue so `1 / rate` ticks always finish the fade.
                p.opacity = if faded < FADE_EPSILON { 0.0 } else { faded };
            }
            Rule::Drift(drift) => {
                let Some(label) = &mut p.label else {
                    return;
                };
                let delta = label.target - p.position;
                let distance = delta.length();
                if !distance.is_finite() {
                    return;
                }
                if distance <= drift.arrive_radius || distance <= f32::EPSILON {
                    label.target = ctx.bounds.random_point(&mut *ctx.rng);
                    return;
                }
                let step = match drift.step {
                    DriftStep::Fraction(f) => delta * f,
                    DriftStep::Fixed(step) => delta / distance * step.min(distance),
                };
                let next = p.position + step;
                // A sub-pixel step (or one lost to f32 rounding) never arrives.
                if step.length() < MIN_DRIFT_STEP || next == p.position {
                    p.position = label.target;
                    label.target = ctx.bounds.random_point(&mut *ctx.rng);
                    return;
                }
                p.position = next;
            }
        }
    }

    /// Whether this rule can bring a particle's opacity to zero.
    pub fn expires_particles(&self) -> bool {
        matches!(self, Rule::FadeOut(_))
    }
}

fn reflect(p: &mut Particle, lo: Vec2, hi: Vec2) {
    if p.position.x < lo.x {
        p.position.x = lo.x;
        p.velocity.x = p.velocity.x.abs();
    } else if p.position.x > hi.x {
        p.position.x = hi.x;
        p.velocity.x = -p.velocity.x.abs();
    }

    if p.position.y < lo.y {
        p.position.y = lo.y;
        p.velocity.y = p.velocity.y.abs();
    } else if p.position.y > hi.y {
        p.position.y = hi.y;
        p.velocity.y = -p.velocity.y.abs();
    }
}

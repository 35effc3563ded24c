//! Visual configuration for particle rendering.
//!
//! These options control how particles appear, separate from the
//! [`Rule`](crate::Rule)s that control how they move.
//!
//! # Usage
//!
//! ```ignore
//! FieldConfig::particle_background()
//!     .with_color(Color::rgba(0, 255, 255, 1.0))
//!     .with_links(LinkStyle::new(120.0).with_alpha(0.2))
//!     .with_halo(Halo::default());
//! ```

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color, each channel in `0.0..=1.0`.
///
/// Channels are display values (the same space as CSS `rgba()`), not linear
/// light.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    /// HUD accent, `#00ffff`.
    pub const CYAN: Color = Color::new(0.0, 1.0, 1.0, 1.0);
    /// Dashboard backdrop, `rgb(10, 14, 39)`.
    pub const NAVY: Color = Color::new(10.0 / 255.0, 14.0 / 255.0, 39.0 / 255.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color the way CSS spells it: 8-bit channels, float alpha.
    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Multiply alpha by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::CYAN
    }
}

/// Which particle pairs are considered for connective lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkScope {
    /// Every unordered pair (constellation look).
    #[default]
    All,
    /// Each particle only looks at the next `n` particles in store order.
    ///
    /// Used by burst streams, where the store grows every frame and a full
    /// pairwise pass would be wasted on particles that are about to expire.
    Next(usize),
}

/// Connective lines between particles closer than `distance`.
///
/// Line alpha is `(1 - d / distance) * alpha`, or a flat `alpha` for every
/// pair in range when `falloff` is off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub distance: f32,
    pub alpha: f32,
    pub width: f32,
    #[serde(default)]
    pub scope: LinkScope,
    /// Scale line alpha by the opacity of the first particle of the pair.
    #[serde(default)]
    pub fade_with_particle: bool,
    /// Fade lines out toward `distance`.
    #[serde(default = "default_falloff")]
    pub falloff: bool,
}

fn default_falloff() -> bool {
    true
}

impl LinkStyle {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            alpha: 1.0,
            width: 1.0,
            scope: LinkScope::All,
            fade_with_particle: false,
            falloff: true,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_scope(mut self, scope: LinkScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn fading_with_particle(mut self) -> Self {
        self.fade_with_particle = true;
        self
    }

    /// Same alpha at every distance in range.
    pub fn flat(mut self) -> Self {
        self.falloff = false;
        self
    }

    /// Line alpha for a pair at distance `d`, or `None` when out of range.
    pub fn alpha_at(&self, d: f32) -> Option<f32> {
        if !(d < self.distance && d.is_finite()) {
            None
        } else if self.falloff {
            Some((1.0 - d / self.distance) * self.alpha)
        } else {
            Some(self.alpha)
        }
    }
}

/// Glow ring stroked around each particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Halo {
    /// Distance between the particle edge and the ring.
    pub gap: f32,
    pub width: f32,
    pub alpha: f32,
}

impl Default for Halo {
    fn default() -> Self {
        Self {
            gap: 8.0,
            width: 2.0,
            alpha: 0.2,
        }
    }
}

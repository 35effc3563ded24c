//! Particle records.

use glam::Vec2;

/// Text payload carried by a drifting particle, plus the point it is
/// currently wandering toward.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub target: Vec2,
}

impl Label {
    pub fn new(text: impl Into<String>, target: Vec2) -> Self {
        Self {
            text: text.into(),
            target,
        }
    }
}

/// One particle of a field.
///
/// `size` is fixed at creation. `opacity` stays in `0.0..=1.0`; burst
/// particles lose opacity every tick and are dropped once it reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub opacity: f32,
    pub label: Option<Label>,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            size: 1.0,
            opacity: 1.0,
            label: None,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.opacity > 0.0
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Position and velocity are both finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

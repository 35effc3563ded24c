//! Field configuration.
//!
//! One [`FieldConfig`] describes one effect: how many particles, how they
//! spawn, which rules move them and how they are painted. Every option drives
//! exactly one behavior. Configs are plain data and round-trip through JSON so
//! effects can be tuned without recompiling.
//!
//! # Presets
//!
//! | Preset | Effect |
//! |--------|--------|
//! | [`FieldConfig::particle_background`] | Constellation field that shies away from the pointer |
//! | [`FieldConfig::neural_network`] | Few large nodes with halos, slow trails |
//! | [`FieldConfig::data_stream`] | Click-triggered burst that fades out |
//! | [`FieldConfig::label_stream`] | Text markers wandering between random targets |
//! | [`FieldConfig::hologram`] | Rotating wireframe cube |
//! | [`FieldConfig::arc_reactor`] | Pulsing reactor rings |

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::overlay::Overlay;
use crate::visuals::{Color, Halo, LinkScope, LinkStyle};

/// Inclusive range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A span that always yields `value`.
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Span centered on zero, `-half..=half`.
    pub const fn symmetric(half: f32) -> Self {
        Self::new(-half, half)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// What happens at the surface edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Reflect the centre point off `[0, width] x [0, height]`.
    #[default]
    Reflect,
    /// Reflect while keeping the whole disc on screen.
    ReflectInset,
    /// No walls. Particles leave the screen and expire by opacity.
    Unbounded,
}

impl Boundary {
    pub fn is_bounded(self) -> bool {
        !matches!(self, Boundary::Unbounded)
    }
}

/// Repulsion away from the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerForce {
    pub radius: f32,
    pub strength: f32,
}

impl Default for PointerForce {
    fn default() -> Self {
        Self {
            radius: 150.0,
            strength: 0.1,
        }
    }
}

/// Particles spawned by [`FieldEngine::trigger`](crate::FieldEngine::trigger).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstConfig {
    /// Particles per wave.
    pub count: usize,
    /// Number of consecutive frames that each spawn a wave.
    pub waves: u32,
    /// Hard cap on live particles.
    pub capacity: usize,
    /// Spawn across the whole surface instead of at the trigger origin.
    #[serde(default)]
    pub scatter: bool,
    /// Per-axis initial velocity.
    pub velocity: Span,
}

impl BurstConfig {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            waves: 1,
            capacity: 4096,
            scatter: false,
            velocity: Span::symmetric(2.0),
        }
    }

    pub fn with_waves(mut self, waves: u32) -> Self {
        self.waves = waves;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn scattered(mut self) -> Self {
        self.scatter = true;
        self
    }

    pub fn with_velocity(mut self, velocity: Span) -> Self {
        self.velocity = velocity;
        self
    }
}

/// How far a drifting particle moves toward its target each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStep {
    /// This fraction of the remaining distance.
    Fraction(f32),
    /// A constant distance, never overshooting.
    Fixed(f32),
}

/// Perpetual wandering toward random targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    pub step: DriftStep,
    /// Closer than this counts as arrived and a new target is picked.
    pub arrive_radius: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            step: DriftStep::Fixed(2.0),
            arrive_radius: 5.0,
        }
    }
}

/// What happens to live particles when the surface is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Scale positions (and drift targets) with the surface.
    #[default]
    Rescale,
    /// Leave positions alone; walls pull strays back in on the next tick.
    Keep,
}

/// Complete description of one particle effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Particles created at mount.
    pub count: usize,
    /// Per-axis initial velocity.
    pub velocity: Span,
    /// Disc radius.
    pub size: Span,
    /// Initial opacity.
    pub opacity: Span,
    /// Velocity multiplier per tick.
    #[serde(default)]
    pub damping: Option<f32>,
    #[serde(default)]
    pub boundary: Boundary,
    #[serde(default)]
    pub pointer: Option<PointerForce>,
    /// Opacity lost per tick.
    #[serde(default)]
    pub decay: Option<f32>,
    #[serde(default)]
    pub burst: Option<BurstConfig>,
    #[serde(default)]
    pub drift: Option<DriftConfig>,
    /// Text handed out to drifting particles in order.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Particle fill color. Its alpha is ignored; particle opacity is used.
    pub color: Color,
    /// Multiplier applied to particle opacity when painting.
    pub alpha_scale: f32,
    /// Color used for the trail-fade overpaint.
    pub background: Color,
    /// Alpha of the overpaint. Higher means shorter trails.
    pub trail_fade: f32,
    #[serde(default)]
    pub links: Option<LinkStyle>,
    #[serde(default)]
    pub halo: Option<Halo>,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
    #[serde(default)]
    pub resize: ResizePolicy,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 100,
            velocity: Span::symmetric(0.25),
            size: Span::new(1.0, 3.0),
            opacity: Span::new(0.3, 0.8),
            damping: None,
            boundary: Boundary::Reflect,
            pointer: None,
            decay: None,
            burst: None,
            drift: None,
            labels: Vec::new(),
            color: Color::CYAN,
            alpha_scale: 1.0,
            background: Color::NAVY,
            trail_fade: 0.1,
            links: None,
            halo: None,
            overlays: Vec::new(),
            resize: ResizePolicy::Rescale,
        }
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Full-screen constellation: 100 slow particles, links under 120px,
    /// repelled by the pointer, with a faint grid and a slowly turning hexagon.
    pub fn particle_background() -> Self {
        Self {
            count: 100,
            velocity: Span::symmetric(0.25),
            size: Span::new(1.0, 3.0),
            opacity: Span::new(0.3, 0.8),
            damping: Some(0.99),
            pointer: Some(PointerForce::default()),
            trail_fade: 0.1,
            links: Some(LinkStyle::new(120.0).with_alpha(0.2).with_width(0.5)),
            overlays: vec![
                Overlay::hex_ring(300.0),
                Overlay::grid(50.0),
            ],
            ..Self::default()
        }
    }

    /// Fifteen large nodes with glow rings and long trails.
    pub fn neural_network() -> Self {
        Self {
            count: 15,
            velocity: Span::symmetric(0.15),
            size: Span::new(2.0, 5.0),
            opacity: Span::fixed(0.6),
            boundary: Boundary::ReflectInset,
            trail_fade: 0.02,
            links: Some(LinkStyle::new(150.0).with_alpha(0.1)),
            halo: Some(Halo::default()),
            ..Self::default()
        }
    }

    /// Burst stream: each trigger sprays ten particles per frame for a
    /// hundred frames; they fade out in about a second.
    pub fn data_stream() -> Self {
        Self {
            count: 0,
            size: Span::fixed(2.0),
            opacity: Span::fixed(1.0),
            boundary: Boundary::Unbounded,
            decay: Some(0.015),
            burst: Some(
                BurstConfig::new(10)
                    .with_waves(100)
                    .scattered()
                    .with_velocity(Span::symmetric(2.0)),
            ),
            alpha_scale: 0.8,
            trail_fade: 0.15,
            links: Some(
                LinkStyle::new(100.0)
                    .with_alpha(0.3)
                    .with_scope(LinkScope::Next(4))
                    .fading_with_particle()
                    .flat(),
            ),
            ..Self::default()
        }
    }

    /// One wandering marker per label.
    pub fn label_stream<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        Self {
            count: labels.len(),
            velocity: Span::fixed(0.0),
            size: Span::fixed(4.0),
            opacity: Span::new(0.2, 0.7),
            drift: Some(DriftConfig::default()),
            labels,
            trail_fade: 0.2,
            ..Self::default()
        }
    }

    /// No particles, just the rotating wireframe cube.
    pub fn hologram() -> Self {
        Self {
            count: 0,
            trail_fade: 0.1,
            overlays: vec![Overlay::cube(60.0)],
            ..Self::default()
        }
    }

    /// No particles, just the pulsing reactor.
    pub fn arc_reactor() -> Self {
        Self {
            count: 0,
            trail_fade: 0.2,
            overlays: vec![Overlay::reactor(128.0)],
            ..Self::default()
        }
    }

    // =========================================================================
    // BUILDER
    // =========================================================================

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_velocity(mut self, velocity: Span) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_size(mut self, size: Span) -> Self {
        self.size = size;
        self
    }

    pub fn with_opacity(mut self, opacity: Span) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = Some(damping);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_pointer(mut self, pointer: PointerForce) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = Some(decay);
        self
    }

    pub fn with_burst(mut self, burst: BurstConfig) -> Self {
        self.burst = Some(burst);
        self
    }

    pub fn with_drift(mut self, drift: DriftConfig) -> Self {
        self.drift = Some(drift);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_trail_fade(mut self, alpha: f32) -> Self {
        self.trail_fade = alpha;
        self
    }

    pub fn with_links(mut self, links: LinkStyle) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_halo(mut self, halo: Halo) -> Self {
        self.halo = Some(halo);
        self
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn with_resize(mut self, resize: ResizePolicy) -> Self {
        self.resize = resize;
        self
    }

    // =========================================================================
    // VALIDATION / PERSISTENCE
    // =========================================================================

    /// Check every option against the range its behavior accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, span) in [
            ("velocity", &self.velocity),
            ("size", &self.size),
            ("opacity", &self.opacity),
        ] {
            if !span.is_valid() {
                return Err(ConfigError::invalid(name, "min must be <= max and both finite"));
            }
        }
        if self.size.min <= 0.0 && self.count > 0 {
            return Err(ConfigError::invalid("size", "particle size must be positive"));
        }
        if self.opacity.min < 0.0 || self.opacity.max > 1.0 {
            return Err(ConfigError::invalid("opacity", "must lie within [0, 1]"));
        }
        if let Some(d) = self.damping {
            if !(d > 0.0 && d <= 1.0) {
                return Err(ConfigError::invalid("damping", format!("{} is not in (0, 1]", d)));
            }
        }
        if let Some(p) = &self.pointer {
            if !(p.radius > 0.0) || !p.strength.is_finite() {
                return Err(ConfigError::invalid("pointer", "radius must be positive and strength finite"));
            }
        }
        if let Some(rate) = self.decay {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::invalid("decay", format!("{} is not in (0, 1]", rate)));
            }
        }
        if let Some(burst) = &self.burst {
            if self.decay.is_none() {
                return Err(ConfigError::invalid("burst", "bursts need a decay rate to expire"));
            }
            if burst.count > burst.capacity {
                return Err(ConfigError::invalid("burst", "wave size exceeds capacity"));
            }
            if !burst.velocity.is_valid() {
                return Err(ConfigError::invalid("burst", "velocity span is invalid"));
            }
        }
        if let Some(drift) = &self.drift {
            let ok = match drift.step {
                DriftStep::Fraction(f) => f > 0.0 && f <= 1.0,
                DriftStep::Fixed(s) => s > 0.0 && s.is_finite(),
            };
            if !ok || !(drift.arrive_radius >= 0.0) {
                return Err(ConfigError::invalid("drift", "step must be positive and arrive_radius non-negative"));
            }
        }
        if !(0.0..=1.0).contains(&self.trail_fade) {
            return Err(ConfigError::invalid("trail_fade", "must lie within [0, 1]"));
        }
        if !(self.alpha_scale >= 0.0) {
            return Err(ConfigError::invalid("alpha_scale", "must be non-negative"));
        }
        if let Some(links) = &self.links {
            if !(links.distance > 0.0) {
                return Err(ConfigError::invalid("links", "distance must be positive"));
            }
        }
        for overlay in &self.overlays {
            if let Overlay::Grid { spacing, .. } = overlay {
                if !(*spacing >= 1.0) {
                    return Err(ConfigError::invalid("overlays", "grid spacing must be at least 1 px"));
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FieldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_presets_validate() {
        for config in [
            FieldConfig::particle_background(),
            FieldConfig::neural_network(),
            FieldConfig::data_stream(),
            FieldConfig::label_stream(["PYTHON", "NLP"]),
            FieldConfig::hologram(),
            FieldConfig::arc_reactor(),
        ] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_span_sampling_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let span = Span::new(-0.5, 0.5);
        for _ in 0..1000 {
            assert!(span.contains(span.sample(&mut rng)));
        }
        assert_eq!(Span::fixed(3.0).sample(&mut rng), 3.0);
    }

    #[test]
    fn test_damping_out_of_range_rejected() {
        let err = FieldConfig::new().with_damping(1.5).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "damping", .. }));
    }

    #[test]
    fn test_degenerate_grid_rejected() {
        let config = FieldConfig::new().with_overlay(Overlay::grid(0.0));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "overlays", .. }));
    }

    #[test]
    fn test_burst_without_decay_rejected() {
        let config = FieldConfig::new().with_burst(BurstConfig::new(5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_label_stream_sizes_count_to_labels() {
        let config = FieldConfig::label_stream(["A", "B", "C"]);
        assert_eq!(config.count, 3);
        assert!(config.drift.is_some());
    }

    #[test]
    fn test_json_uses_defaults_for_missing_options() {
        let json = r#"{
            "count": 5,
            "velocity": { "min": -1.0, "max": 1.0 },
            "size": { "min": 1.0, "max": 2.0 },
            "opacity": { "min": 0.5, "max": 0.5 },
            "color": { "r": 0.0, "g": 1.0, "b": 1.0, "a": 1.0 },
            "alpha_scale": 1.0,
            "background": { "r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0 },
            "trail_fade": 0.1
        }"#;
        let config = FieldConfig::from_json(json).unwrap();
        assert_eq!(config.count, 5);
        assert_eq!(config.boundary, Boundary::Reflect);
        assert_eq!(config.resize, ResizePolicy::Rescale);
        assert!(config.overlays.is_empty());
    }

    #[test]
    fn test_malformed_json_is_reported() {
        assert!(matches!(
            FieldConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }
}

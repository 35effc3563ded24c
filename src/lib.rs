//! # B-HUD FX - particle fields for a holographic dashboard
//!
//! Configurable 2D particle effects that run as independent layers: drifting
//! background dust, a linked neural-network graph, bursts of data packets,
//! a rotating hologram and a pulsing arc reactor. All of them are the same
//! engine with a different [`FieldConfig`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use bhud_fx::prelude::*;
//!
//! fn main() -> Result<(), StageError> {
//!     env_logger::init();
//!     Stage::new()
//!         .with_title("B-HUD")
//!         .with_layer(LayerSpec::new("background", FieldConfig::particle_background()))
//!         .with_layer(LayerSpec::new("network", FieldConfig::neural_network()).with_z(1))
//!         .with_layer(LayerSpec::new("stream", FieldConfig::data_stream()).with_z(2))
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Frames
//!
//! Motion is measured in frames, not seconds. Each frame a layer:
//!
//! 1. steps its particles through the rule list built from its config
//!    (integrate, walls, pointer repel, damping, fade, drift);
//! 2. removes particles whose opacity reached zero;
//! 3. spawns the next burst wave, if one is running;
//! 4. paints itself onto its own [`Surface`] through the [`Canvas`] trait.
//!
//! ### Layers
//!
//! A [`FrameScheduler`] mounts layers, runs their frame requests, fans the
//! pointer out to the layers that react to it and composites the surfaces
//! bottom to top. Unmounting cancels the pending frame and drops the
//! layer's store and pointer subscription.
//!
//! ### Presets
//!
//! | Preset | Effect |
//! |--------|--------|
//! | [`FieldConfig::particle_background`] | 100 drifting dots, pointer repel, links under 120 px |
//! | [`FieldConfig::neural_network`] | 15 glowing nodes linked under 150 px |
//! | [`FieldConfig::data_stream`] | Bursts of fading packets |
//! | [`FieldConfig::label_stream`] | One wandering marker per label |
//! | [`FieldConfig::hologram`] | Rotating wireframe cube |
//! | [`FieldConfig::arc_reactor`] | Pulsing reactor rings |
//!
//! Configs serialize to JSON; see [`FieldConfig::load`] and
//! [`FieldConfig::save`].
//!
//! ## Headless use
//!
//! Nothing but [`Stage`] needs a window:
//!
//! ```ignore
//! let mut engine = FieldEngine::new(FieldConfig::neural_network(), Bounds::new(640.0, 480.0), Some(7))?;
//! let mut surface = Surface::filled(640, 480, Color::NAVY);
//! for _ in 0..120 {
//!     engine.tick(1.0 / 60.0, &mut surface);
//! }
//! surface.save_png("network.png")?;
//! ```
//!
//! ## Sound
//!
//! Interface cues are synthesized ([`Cue`]) and played through a
//! [`SoundBoard`]. Enable the `audio` feature for a `rodio` backend.

pub mod audio;
pub mod boot;
pub mod canvas;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod overlay;
pub mod particle;
pub mod render;
pub mod rules;
pub mod scheduler;
pub mod spatial;
pub mod stepper;
pub mod store;
pub mod surface;
pub mod time;
pub mod visuals;
pub mod window;

pub use audio::{AudioBackend, Cue, SoundBoard, Tone, Waveform};
pub use boot::{BootEvent, BootScript, BootSequence, BootStage, ScriptLine};
pub use canvas::{Canvas, DrawCommand, DrawList};
pub use config::{
    Boundary, BurstConfig, DriftConfig, DriftStep, FieldConfig, PointerForce, ResizePolicy, Span,
};
pub use emitter::BurstEmitter;
pub use engine::FieldEngine;
pub use error::{AudioError, ConfigError, ExportError, GpuError, StageError};
pub use glam::Vec2;
pub use input::{PointerHub, PointerSubscription};
pub use overlay::Overlay;
pub use particle::{Label, Particle};
pub use render::{FrameInfo, FrameStats, Link, Renderer};
pub use rules::Rule;
pub use scheduler::{FrameId, FrameQueue, FrameScheduler, LayerId, LayerSpec};
pub use spatial::SpatialGrid;
pub use stepper::{StepReport, Stepper};
pub use store::{Bounds, ParticleStore};
pub use surface::Surface;
pub use time::FrameClock;
pub use visuals::{Color, Halo, LinkScope, LinkStyle};
pub use window::Stage;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use bhud_fx::prelude::*;
/// ```
///
/// This imports:
/// - [`Stage`] and [`LayerSpec`] - the window host and what it mounts
/// - [`FieldConfig`] and its parts - presets and builders
/// - [`FieldEngine`], [`FrameScheduler`] - headless drivers
/// - [`Surface`], [`Canvas`], [`DrawList`] - render targets
/// - [`BootScript`], [`SoundBoard`], [`Cue`] - boot sequence and sound
/// - [`Vec2`] - glam vector type
pub mod prelude {
    pub use crate::audio::{Cue, SoundBoard};
    pub use crate::boot::{BootEvent, BootScript, BootSequence, BootStage};
    pub use crate::canvas::{Canvas, DrawList};
    pub use crate::config::{Boundary, BurstConfig, DriftConfig, DriftStep, FieldConfig, PointerForce, ResizePolicy, Span};
    pub use crate::engine::FieldEngine;
    pub use crate::error::{ConfigError, ExportError, StageError};
    pub use crate::overlay::Overlay;
    pub use crate::particle::{Label, Particle};
    pub use crate::scheduler::{FrameScheduler, LayerId, LayerSpec};
    pub use crate::store::Bounds;
    pub use crate::surface::Surface;
    pub use crate::time::FrameClock;
    pub use crate::visuals::{Color, Halo, LinkScope, LinkStyle};
    pub use crate::window::Stage;
    pub use crate::Vec2;
}

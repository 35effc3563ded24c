//! One configurable effect instance.
//!
//! Every dashboard effect is a `FieldEngine` built from a [`FieldConfig`].
//! The engine owns the particle store, the rule list derived from the config,
//! the burst emitter (if any), a frame clock for overlays and its own random
//! source.
//!
//! # Example
//!
//! ```ignore
//! use bhud_fx::prelude::*;
//!
//! let mut engine = FieldEngine::new(FieldConfig::particle_background(), Bounds::new(800.0, 600.0), Some(42))?;
//! let mut surface = Surface::new(800, 600);
//!
//! engine.set_pointer(Some(Vec2::new(400.0, 300.0)));
//! engine.tick(1.0 / 60.0, &mut surface);
//! surface.save_png("frame.png")?;
//! ```

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::canvas::Canvas;
use crate::config::FieldConfig;
use crate::emitter::BurstEmitter;
use crate::error::ConfigError;
use crate::render::{FrameInfo, FrameStats, Renderer};
use crate::stepper::{StepReport, Stepper};
use crate::store::{Bounds, ParticleStore};
use crate::time::FrameClock;

#[derive(Debug)]
pub struct FieldEngine {
    config: FieldConfig,
    store: ParticleStore,
    stepper: Stepper,
    renderer: Renderer,
    emitter: Option<BurstEmitter>,
    clock: FrameClock,
    rng: StdRng,
    pointer: Option<Vec2>,
}

impl FieldEngine {
    /// Validate `config` and populate the store.
    ///
    /// A `seed` makes the run reproducible; `None` seeds from the OS.
    pub fn new(config: FieldConfig, bounds: Bounds, seed: Option<u64>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let store = ParticleStore::initialize(config.count, bounds, &config, &mut rng);

        Ok(Self {
            stepper: Stepper::from_config(&config),
            renderer: Renderer::new(),
            emitter: config.burst.map(BurstEmitter::new),
            clock: FrameClock::new(),
            config,
            store,
            rng,
            pointer: None,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn bounds(&self) -> Bounds {
        self.store.bounds()
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Pointer position used by the repel rule; `None` disables it.
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer;
    }

    /// Whether a triggered burst still has waves to spawn.
    pub fn is_bursting(&self) -> bool {
        self.emitter.as_ref().is_some_and(BurstEmitter::is_active)
    }

    /// Start a burst and spawn its first wave now.
    ///
    /// Returns the particles spawned; zero when the config has no burst.
    pub fn trigger(&mut self, origin: Option<Vec2>) -> usize {
        let Some(emitter) = &mut self.emitter else {
            return 0;
        };
        emitter.trigger(origin);
        emitter.emit(&mut self.store, &self.config, &mut self.rng)
    }

    /// Advance the particles one frame, then spawn the next burst wave.
    pub fn step(&mut self) -> StepReport {
        let mut report = self.stepper.step(&mut self.store, self.pointer, &mut self.rng);
        if let Some(emitter) = &mut self.emitter {
            if emitter.emit(&mut self.store, &self.config, &mut self.rng) > 0 {
                report.alive = self.store.len();
            }
        }
        report
    }

    /// Paint the current state.
    pub fn render<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> FrameStats {
        let frame = FrameInfo {
            elapsed: self.clock.elapsed(),
            frame: self.clock.frame(),
        };
        self.renderer.render(&self.store, &self.config, frame, canvas)
    }

    /// One frame: advance the clock by `dt` seconds, step, render.
    pub fn tick<C: Canvas + ?Sized>(&mut self, dt: f32, canvas: &mut C) -> (StepReport, FrameStats) {
        self.clock.advance(dt);
        let report = self.step();
        let stats = self.render(canvas);
        (report, stats)
    }

    /// Adopt new surface bounds using the config's resize policy.
    pub fn resize(&mut self, bounds: Bounds) {
        self.store.set_bounds(bounds, self.config.resize);
    }
}

//! Frame loop and layer lifecycle.
//!
//! The scheduler follows `requestAnimationFrame` semantics. A layer renders
//! only when it has a pending frame request; running the request re-requests
//! the next one. Unmounting cancels the pending request, so after
//! [`FrameScheduler::unmount`] returns no frame for that layer can run, and
//! its store, surface and pointer subscription are gone.
//!
//! ```text
//! mount ──► request ──► pump: step + render ──► request ──► ...
//!                                   unmount ──► cancel, drop
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut scheduler = FrameScheduler::new(1280, 720);
//! let bg = scheduler.mount(LayerSpec::new("background", FieldConfig::particle_background()))?;
//! let burst = scheduler.mount(LayerSpec::new("stream", FieldConfig::data_stream()).with_z(2))?;
//!
//! scheduler.pointer_moved(Some(Vec2::new(640.0, 360.0)));
//! scheduler.trigger(None);
//! scheduler.pump(1.0 / 60.0);
//!
//! let mut frame = Surface::filled(1280, 720, Color::NAVY);
//! scheduler.composite(&mut frame);
//! ```

use glam::Vec2;
use log::debug;

use crate::config::FieldConfig;
use crate::engine::FieldEngine;
use crate::error::ConfigError;
use crate::input::{PointerHub, PointerSubscription};
use crate::store::Bounds;
use crate::surface::Surface;

/// Handle of one frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// Handle of one mounted layer. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// Pending frame requests in request order.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next: u64,
    pending: Vec<(FrameId, LayerId)>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, layer: LayerId) -> FrameId {
        self.next += 1;
        let id = FrameId(self.next);
        self.pending.push((id, layer));
        id
    }

    /// Withdraw a request. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, id: FrameId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(frame, _)| *frame != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: FrameId) -> bool {
        self.pending.iter().any(|(frame, _)| *frame == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every request made so far. Requests made while handling the
    /// drained ones wait for the next drain.
    pub fn drain(&mut self) -> Vec<(FrameId, LayerId)> {
        std::mem::take(&mut self.pending)
    }
}

/// What to mount.
#[derive(Debug, Clone)]
pub struct LayerSpec {
    pub name: String,
    pub config: FieldConfig,
    /// Stacking order; higher draws on top.
    pub z: i32,
    /// Opacity applied when compositing.
    pub opacity: f32,
    pub seed: Option<u64>,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, config: FieldConfig) -> Self {
        Self {
            name: name.into(),
            config,
            z: 0,
            opacity: 1.0,
            seed: None,
        }
    }

    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug)]
struct Layer {
    id: LayerId,
    name: String,
    z: i32,
    opacity: f32,
    engine: FieldEngine,
    surface: Surface,
    pointer: Option<PointerSubscription>,
    pending: Option<FrameId>,
}

/// Owns every mounted layer, the frame queue and the pointer hub.
#[derive(Debug)]
pub struct FrameScheduler {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    queue: FrameQueue,
    hub: PointerHub,
    next_layer: u64,
}

impl FrameScheduler {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            queue: FrameQueue::new(),
            hub: PointerHub::new(),
            next_layer: 0,
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn hub(&self) -> &PointerHub {
        &self.hub
    }

    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    /// Create the layer's surface and store, subscribe it to the pointer if
    /// its config reacts to one, and request its first frame.
    pub fn mount(&mut self, spec: LayerSpec) -> Result<LayerId, ConfigError> {
        let bounds = Bounds::from((self.width, self.height));
        let engine = FieldEngine::new(spec.config, bounds, spec.seed)?;

        self.next_layer += 1;
        let id = LayerId(self.next_layer);
        let pointer = engine.config().pointer.map(|_| self.hub.subscribe());
        let pending = Some(self.queue.request(id));

        debug!(
            "mounted layer {:?} '{}' ({} particles, z {})",
            id,
            spec.name,
            engine.store().len(),
            spec.z
        );

        self.layers.push(Layer {
            id,
            name: spec.name,
            z: spec.z,
            opacity: spec.opacity,
            engine,
            surface: Surface::new(self.width, self.height),
            pointer,
            pending,
        });
        // Stable, so equal z keeps mount order.
        self.layers.sort_by_key(|l| l.z);
        Ok(id)
    }

    /// Cancel the layer's pending frame and drop everything it owns.
    /// Returns `false` for an unknown id.
    pub fn unmount(&mut self, id: LayerId) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.id == id) else {
            return false;
        };
        let layer = self.layers.remove(index);
        if let Some(frame) = layer.pending {
            self.queue.cancel(frame);
        }
        debug!("unmounted layer {:?} '{}'", id, layer.name);
        true
    }

    pub fn is_mounted(&self, id: LayerId) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    /// Mounted layers, bottom to top.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn name(&self, id: LayerId) -> Option<&str> {
        self.layer(id).map(|l| l.name.as_str())
    }

    pub fn engine(&self, id: LayerId) -> Option<&FieldEngine> {
        self.layer(id).map(|l| &l.engine)
    }

    pub fn engine_mut(&mut self, id: LayerId) -> Option<&mut FieldEngine> {
        self.layers.iter_mut().find(|l| l.id == id).map(|l| &mut l.engine)
    }

    pub fn surface(&self, id: LayerId) -> Option<&Surface> {
        self.layer(id).map(|l| &l.surface)
    }

    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Run every due frame: step, render, request the next one. Returns the
    /// number of frames run.
    pub fn pump(&mut self, dt: f32) -> usize {
        let mut ran = 0;
        for (frame, id) in self.queue.drain() {
            let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
                continue;
            };
            if layer.pending != Some(frame) {
                continue;
            }
            if let Some(sub) = &layer.pointer {
                layer.engine.set_pointer(sub.position());
            }
            layer.engine.tick(dt, &mut layer.surface);
            layer.pending = Some(self.queue.request(id));
            ran += 1;
        }
        ran
    }

    /// Resize every surface and store bounds to the new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        let bounds = Bounds::from((width, height));
        for layer in &mut self.layers {
            layer.surface.resize(width, height);
            layer.engine.resize(bounds);
        }
        debug!("viewport resized to {}x{}", width, height);
    }

    /// Publish a pointer position (`None` when it leaves the viewport).
    pub fn pointer_moved(&mut self, position: Option<Vec2>) {
        self.hub.publish(position);
    }

    /// Trigger every layer that bursts. Returns the particles spawned.
    pub fn trigger(&mut self, origin: Option<Vec2>) -> usize {
        self.layers
            .iter_mut()
            .map(|l| l.engine.trigger(origin))
            .sum()
    }

    /// Blend all layers onto `target`, bottom to top.
    pub fn composite(&self, target: &mut Surface) {
        for layer in &self.layers {
            target.composite_over(&layer.surface, layer.opacity);
        }
    }

    fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }
}

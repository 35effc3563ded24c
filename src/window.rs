//! Native window host.
//!
//! [`Stage`] opens a winit window, runs every mounted layer through a
//! [`FrameScheduler`], composites the layers onto a solid background and
//! presents the result with [`GpuState`].
//!
//! | Input | Action |
//! |-------|--------|
//! | Mouse move | publish the pointer to every layer that reacts to it |
//! | Left click | burst at the pointer, play [`Cue::Click`] |
//! | `Space` | burst at the centre, or skip the boot sequence |
//! | `1`-`9` | mount or unmount the n-th layer |
//! | `M` | mute / unmute |
//! | `P` | pause / resume |
//! | `Escape` | quit |
//!
//! With a boot script the layers stay unmounted until the sequence
//! completes. Meanwhile the arc reactor is shown and each transcript line is
//! written to the window title and the log.
//!
//! # Example
//!
//! ```ignore
//! use bhud_fx::prelude::*;
//!
//! Stage::new()
//!     .with_title("B-HUD")
//!     .with_layer(LayerSpec::new("background", FieldConfig::particle_background()))
//!     .with_layer(LayerSpec::new("stream", FieldConfig::data_stream()).with_z(1))
//!     .with_boot(BootScript::standard("TONY"))
//!     .run()?;
//! ```

use std::sync::Arc;

use glam::Vec2;
use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::audio::{Cue, SoundBoard};
use crate::boot::{BootEvent, BootScript, BootSequence, BootStage};
use crate::config::FieldConfig;
use crate::error::{ConfigError, StageError};
use crate::gpu::GpuState;
use crate::input::{Input, KeyCode, MouseButton};
use crate::scheduler::{FrameScheduler, LayerId, LayerSpec};
use crate::surface::Surface;
use crate::time::FrameClock;
use crate::visuals::Color;

const REACTOR_LAYER: &str = "arc_reactor";

/// Builder for the native dashboard window.
pub struct Stage {
    title: String,
    width: u32,
    height: u32,
    background: Color,
    layers: Vec<LayerSpec>,
    boot: Option<BootScript>,
    sound: SoundBoard,
}

impl Stage {
    pub fn new() -> Self {
        Self {
            title: "B-HUD".to_string(),
            width: 1280,
            height: 720,
            background: Color::NAVY,
            layers: Vec::new(),
            boot: None,
            sound: SoundBoard::silent(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Add a layer. The n-th layer added is toggled by digit key `n`.
    pub fn with_layer(mut self, spec: LayerSpec) -> Self {
        self.layers.push(spec);
        self
    }

    /// Play a boot sequence before mounting the layers.
    pub fn with_boot(mut self, script: BootScript) -> Self {
        self.boot = Some(script);
        self
    }

    pub fn with_sound(mut self, sound: SoundBoard) -> Self {
        self.sound = sound;
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), StageError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Show: everything the window drives, minus the window
// ============================================================================

struct Slot {
    spec: LayerSpec,
    id: Option<LayerId>,
}

struct Show {
    scheduler: FrameScheduler,
    slots: Vec<Slot>,
    boot: Option<BootSequence>,
    reactor: Option<LayerId>,
    sound: SoundBoard,
    clock: FrameClock,
    frame: Surface,
    background: Color,
    caption: Option<String>,
}

impl Show {
    fn new(stage: Stage) -> Self {
        Self {
            scheduler: FrameScheduler::new(stage.width, stage.height),
            slots: stage
                .layers
                .into_iter()
                .map(|spec| Slot { spec, id: None })
                .collect(),
            boot: stage.boot.map(BootSequence::new),
            reactor: None,
            sound: stage.sound,
            clock: FrameClock::new(),
            frame: Surface::filled(stage.width, stage.height, stage.background),
            background: stage.background,
            caption: None,
        }
    }

    /// Mount the layers now, unless a boot sequence will do it later.
    fn start(&mut self) -> Result<(), ConfigError> {
        if self.boot.is_none() {
            self.mount_all()?;
        }
        Ok(())
    }

    fn is_booting(&self) -> bool {
        self.boot.as_ref().is_some_and(|b| !b.is_complete())
    }

    fn mount_all(&mut self) -> Result<(), ConfigError> {
        for slot in &mut self.slots {
            if slot.id.is_none() {
                slot.id = Some(self.scheduler.mount(slot.spec.clone())?);
            }
        }
        Ok(())
    }

    /// Mount or unmount the layer in `index`. Returns whether it is mounted
    /// afterwards.
    fn toggle(&mut self, index: usize) -> Result<bool, ConfigError> {
        if self.is_booting() {
            return Ok(false);
        }
        let Some(slot) = self.slots.get_mut(index) else {
            return Ok(false);
        };
        match slot.id.take() {
            Some(id) => {
                self.scheduler.unmount(id);
                info!("layer '{}' off", slot.spec.name);
                Ok(false)
            }
            None => {
                slot.id = Some(self.scheduler.mount(slot.spec.clone())?);
                info!("layer '{}' on", slot.spec.name);
                Ok(true)
            }
        }
    }

    /// Burst every layer that can. Returns the particles spawned.
    fn burst(&mut self, origin: Option<Vec2>) -> usize {
        if self.is_booting() {
            return 0;
        }
        let spawned = self.scheduler.trigger(origin);
        self.play(Cue::Click);
        spawned
    }

    fn toggle_mute(&mut self) -> bool {
        let muted = self.sound.toggle_mute();
        info!("sound {}", if muted { "muted" } else { "on" });
        muted
    }

    fn skip_boot(&mut self) -> Result<(), ConfigError> {
        let events = self.boot.as_mut().map(BootSequence::skip).unwrap_or_default();
        self.apply(events)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.scheduler.resize(width, height);
        self.frame.resize(width, height);
    }

    /// Frame driven by the wall clock.
    fn tick(&mut self) -> Result<(), ConfigError> {
        let dt = self.clock.tick();
        self.run_frame(dt)
    }

    /// Frame of `raw` seconds.
    fn advance(&mut self, raw: f32) -> Result<(), ConfigError> {
        let dt = self.clock.advance(raw);
        self.run_frame(dt)
    }

    fn run_frame(&mut self, dt: f32) -> Result<(), ConfigError> {
        if self.clock.is_paused() {
            return Ok(());
        }
        let events = self
            .boot
            .as_mut()
            .map(|boot| boot.advance(dt))
            .unwrap_or_default();
        self.apply(events)?;

        self.scheduler.pump(dt);
        self.frame.clear(self.background);
        self.scheduler.composite(&mut self.frame);
        Ok(())
    }

    fn apply(&mut self, events: Vec<BootEvent>) -> Result<(), ConfigError> {
        for event in events {
            match event {
                BootEvent::ShowReactor => {
                    if self.reactor.is_none() {
                        let spec = LayerSpec::new(REACTOR_LAYER, FieldConfig::arc_reactor()).with_z(i32::MAX);
                        self.reactor = Some(self.scheduler.mount(spec)?);
                    }
                    self.play(Cue::Boot);
                }
                BootEvent::Speak(phrase) => info!("\"{}\"", phrase),
                BootEvent::Line(text) => {
                    if !text.is_empty() {
                        info!("{}", text);
                        self.caption = Some(text);
                    }
                }
                BootEvent::ScanStarted => debug!("biometric scan started"),
                BootEvent::ScanProgress(percent) => {
                    self.caption = Some(format!("BIOMETRIC SCAN {}%", percent));
                }
                BootEvent::StageEntered(BootStage::Ready) => self.play(Cue::Confirm),
                BootEvent::StageEntered(_) => {}
                BootEvent::Complete => {
                    if let Some(id) = self.reactor.take() {
                        self.scheduler.unmount(id);
                    }
                    self.caption = None;
                    self.mount_all()?;
                }
            }
        }
        Ok(())
    }

    fn play(&mut self, cue: Cue) {
        if let Err(e) = self.sound.play(cue) {
            debug!("cue {:?} not played: {}", cue, e);
        }
    }
}

// ============================================================================
// winit glue
// ============================================================================

struct App {
    title: String,
    width: u32,
    height: u32,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    show: Show,
    input: Input,
    shown_caption: Option<String>,
    error: Option<StageError>,
}

impl App {
    fn new(stage: Stage) -> Self {
        Self {
            title: stage.title.clone(),
            width: stage.width,
            height: stage.height,
            window: None,
            gpu: None,
            show: Show::new(stage),
            input: Input::new(),
            shown_caption: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: StageError) {
        error!("{}", e);
        self.error = Some(e);
        event_loop.exit();
    }

    fn handle_presses(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ConfigError> {
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return Ok(());
        }
        if self.input.key_pressed(KeyCode::Space) {
            if self.show.is_booting() {
                self.show.skip_boot()?;
            } else {
                self.show.burst(None);
            }
        }
        if self.input.mouse_pressed(MouseButton::Left) {
            self.show.burst(self.input.cursor());
        }
        for digit in self.input.digits_pressed() {
            self.show.toggle(usize::from(digit) - 1)?;
        }
        if self.input.key_pressed(KeyCode::M) {
            self.show.toggle_mute();
        }
        if self.input.key_pressed(KeyCode::P) {
            self.show.clock.toggle_pause();
        }
        self.input.end_frame();
        Ok(())
    }

    fn sync_title(&mut self) {
        if self.shown_caption == self.show.caption {
            return;
        }
        self.shown_caption = self.show.caption.clone();
        if let Some(window) = &self.window {
            match &self.shown_caption {
                Some(caption) => window.set_title(&format!("{} - {}", self.title, caption)),
                None => window.set_title(&self.title),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.width, self.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => return self.fail(event_loop, e.into()),
        }

        let size = window.inner_size();
        self.show.resize(size.width, size.height);
        if let Err(e) = self.show.start() {
            return self.fail(event_loop, e.into());
        }
        info!("stage open at {}x{}", size.width, size.height);

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.input.handle_event(&event) {
            self.show.scheduler.pointer_moved(self.input.cursor());
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                self.show.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.handle_presses(event_loop).and_then(|()| self.show.tick()) {
                    return self.fail(event_loop, e.into());
                }
                self.sync_title();

                if let Some(gpu) = &mut self.gpu {
                    match gpu.present(&self.show.frame) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            warn!("surface lost, reconfiguring");
                            let size = winit::dpi::PhysicalSize::new(gpu.config.width, gpu.config.height);
                            gpu.resize(size);
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => warn!("render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBackend;
    use crate::error::AudioError;

    struct NullBackend;

    impl AudioBackend for NullBackend {
        fn play(&mut self, _samples: Vec<f32>, _sample_rate: u32) -> Result<(), AudioError> {
            Ok(())
        }
    }

    fn stage() -> Stage {
        Stage::new()
            .with_size(48, 32)
            .with_layer(LayerSpec::new("nn", FieldConfig::neural_network()).with_seed(1))
            .with_layer(LayerSpec::new("stream", FieldConfig::data_stream()).with_seed(2))
    }

    #[test]
    fn test_layers_mount_without_boot() {
        let mut show = Show::new(stage());
        show.start().unwrap();
        assert_eq!(show.scheduler.len(), 2);
        show.advance(0.016).unwrap();
        assert!(show.frame.pixel(0, 0).is_some());
    }

    #[test]
    fn test_toggle_unmounts_and_remounts() {
        let mut show = Show::new(stage());
        show.start().unwrap();
        assert!(!show.toggle(0).unwrap());
        assert_eq!(show.scheduler.len(), 1);
        assert!(show.toggle(0).unwrap());
        assert_eq!(show.scheduler.len(), 2);
        assert!(!show.toggle(7).unwrap());
    }

    #[test]
    fn test_boot_shows_reactor_then_layers() {
        let mut show = Show::new(stage().with_boot(BootScript::default()));
        show.start().unwrap();
        assert!(show.scheduler.is_empty());

        for _ in 0..6 {
            show.advance(0.1).unwrap();
        }
        let ids = show.scheduler.layer_ids();
        assert_eq!(ids.len(), 1);
        assert_eq!(show.scheduler.name(ids[0]), Some(REACTOR_LAYER));
        assert_eq!(show.burst(None), 0);

        for _ in 0..150 {
            show.advance(0.1).unwrap();
        }
        assert!(!show.is_booting());
        assert_eq!(show.scheduler.len(), 2);
        assert!(show.caption.is_none());
        assert!(show
            .scheduler
            .layer_ids()
            .iter()
            .all(|&id| show.scheduler.name(id) != Some(REACTOR_LAYER)));
    }

    #[test]
    fn test_skip_boot_mounts_layers() {
        let mut show = Show::new(stage().with_boot(BootScript::default()));
        show.start().unwrap();
        show.skip_boot().unwrap();
        assert_eq!(show.scheduler.len(), 2);
    }

    #[test]
    fn test_transcript_sets_caption() {
        let mut show = Show::new(stage().with_boot(BootScript::default()));
        show.start().unwrap();
        for _ in 0..15 {
            show.advance(0.1).unwrap();
        }
        assert!(show.caption.is_some());
    }

    #[test]
    fn test_burst_plays_click() {
        let sound = SoundBoard::new(|| Ok(Box::new(NullBackend) as Box<dyn AudioBackend>));
        let mut show = Show::new(stage().with_sound(sound));
        show.start().unwrap();
        assert!(!show.sound.is_open());
        assert_eq!(show.burst(Some(Vec2::new(10.0, 10.0))), 10);
        assert!(show.sound.is_open());
    }

    #[test]
    fn test_muted_burst_keeps_device_closed() {
        let sound = SoundBoard::new(|| Ok(Box::new(NullBackend) as Box<dyn AudioBackend>));
        let mut show = Show::new(stage().with_sound(sound));
        show.start().unwrap();
        assert!(show.toggle_mute());
        show.burst(None);
        assert!(!show.sound.is_open());
    }

    #[test]
    fn test_pause_freezes_layers() {
        let mut show = Show::new(stage());
        show.start().unwrap();
        show.advance(0.016).unwrap();
        let id = show.scheduler.layer_ids()[0];
        let before = show.scheduler.engine(id).unwrap().clock().frame();

        show.clock.pause();
        show.advance(0.016).unwrap();
        assert_eq!(show.scheduler.engine(id).unwrap().clock().frame(), before);

        show.clock.resume();
        show.advance(0.016).unwrap();
        assert_eq!(show.scheduler.engine(id).unwrap().clock().frame(), before + 1);
    }
}

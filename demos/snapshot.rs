//! # Snapshot
//!
//! Renders a few seconds of the dashboard without a window and writes the
//! final frame to a PNG. A config file given as the first argument replaces
//! the network layer; the output path is the second argument.
//!
//! Run with: `cargo run --example snapshot -- network.json frame.png`

use std::error::Error;

use bhud_fx::prelude::*;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const FRAMES: usize = 180;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let network = match args.next() {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::neural_network(),
    };
    let output = args.next().unwrap_or_else(|| "snapshot.png".to_string());

    let mut scheduler = FrameScheduler::new(WIDTH, HEIGHT);
    scheduler.mount(LayerSpec::new("background", FieldConfig::particle_background()).with_seed(1))?;
    scheduler.mount(LayerSpec::new("network", network).with_z(1).with_seed(2))?;
    scheduler.mount(LayerSpec::new("stream", FieldConfig::data_stream()).with_z(2).with_seed(3))?;

    scheduler.pointer_moved(Some(Vec2::new(WIDTH as f32 * 0.5, HEIGHT as f32 * 0.5)));
    for frame in 0..FRAMES {
        if frame % 60 == 0 {
            scheduler.trigger(None);
        }
        scheduler.pump(1.0 / 60.0);
    }

    let mut surface = Surface::filled(WIDTH, HEIGHT, Color::NAVY);
    scheduler.composite(&mut surface);
    surface.save_png(&output)?;
    log::info!("wrote {}", output);
    Ok(())
}

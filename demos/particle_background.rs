//! # Particle Background
//!
//! The dashboard's ambient layer: a hundred cyan dots drifting around the
//! window, linked to every neighbour closer than 120 px. Move the mouse
//! through the field to push the dots away.
//!
//! Run with: `cargo run --example particle_background`

use bhud_fx::prelude::*;

fn main() -> Result<(), StageError> {
    env_logger::init();

    Stage::new()
        .with_title("B-HUD - particle background")
        .with_layer(LayerSpec::new("background", FieldConfig::particle_background()))
        .run()
}

//! # Neural Network
//!
//! Fifteen slow nodes with glowing halos, linked to every node closer than
//! 150 px. Long trails make the links smear into a web.
//!
//! Press `1` to hide and show the layer.
//!
//! Run with: `cargo run --example neural_network`

use bhud_fx::prelude::*;

fn main() -> Result<(), StageError> {
    env_logger::init();

    Stage::new()
        .with_title("B-HUD - neural network")
        .with_size(960, 640)
        .with_layer(LayerSpec::new("network", FieldConfig::neural_network()).with_seed(7))
        .run()
}

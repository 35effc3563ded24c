//! # Dashboard
//!
//! The full B-HUD: boot sequence, then every effect stacked in one window.
//!
//! | Key | Layer |
//! |-----|-------|
//! | `1` | background dust |
//! | `2` | neural network |
//! | `3` | hologram cube |
//! | `4` | data stream |
//!
//! `Space` skips the boot sequence, `M` mutes, `P` pauses, `Escape` quits.
//! Pass a name as the first argument to be greeted by it.
//!
//! Run with: `cargo run --example dashboard --features audio -- TONY`

use bhud_fx::prelude::*;

fn main() -> Result<(), StageError> {
    env_logger::init();

    let identity = std::env::args().nth(1).unwrap_or_else(|| "OPERATOR".to_string());

    #[cfg(feature = "audio")]
    let sound = SoundBoard::rodio();
    #[cfg(not(feature = "audio"))]
    let sound = SoundBoard::silent();

    Stage::new()
        .with_title("B-HUD")
        .with_boot(BootScript::standard(&identity.to_uppercase()))
        .with_sound(sound)
        .with_layer(LayerSpec::new("background", FieldConfig::particle_background()))
        .with_layer(LayerSpec::new("network", FieldConfig::neural_network()).with_z(1).with_opacity(0.9))
        .with_layer(LayerSpec::new("hologram", FieldConfig::hologram()).with_z(2).with_opacity(0.7))
        .with_layer(LayerSpec::new("stream", FieldConfig::data_stream()).with_z(3))
        .run()
}

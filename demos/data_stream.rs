//! # Data Stream
//!
//! Click or press `Space` to start a stream: for a hundred frames, ten data
//! packets appear somewhere in the window each frame and fade out.
//! A second layer shows labelled markers wandering through the window.
//!
//! Build with `--features audio` to hear the click cue.
//!
//! Run with: `cargo run --example data_stream`

use bhud_fx::prelude::*;

fn main() -> Result<(), StageError> {
    env_logger::init();

    #[cfg(feature = "audio")]
    let sound = SoundBoard::rodio();
    #[cfg(not(feature = "audio"))]
    let sound = SoundBoard::silent();

    let labels = FieldConfig::label_stream(["SYS", "NET", "CPU", "MEM", "I/O", "GPU"]);

    Stage::new()
        .with_title("B-HUD - data stream")
        .with_sound(sound)
        .with_layer(LayerSpec::new("stream", FieldConfig::data_stream()))
        .with_layer(LayerSpec::new("labels", labels).with_z(-1).with_opacity(0.8))
        .run()
}

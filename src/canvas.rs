//! Drawing seam between the renderer and whatever shows the pixels.
//!
//! The [`Renderer`](crate::Renderer) only speaks [`Canvas`]. Two
//! implementations ship with the crate:
//!
//! | Canvas | Use |
//! |--------|-----|
//! | [`Surface`](crate::Surface) | Software rasterizer, uploaded by the native host or saved as PNG |
//! | [`DrawList`] | Records commands for tests and for hosts that draw themselves |

use glam::Vec2;

use crate::visuals::Color;

/// A 2D drawing target with a canvas-style immediate API.
///
/// Colors are straight alpha and blended source-over. Coordinates are pixels
/// with the origin at the top-left corner.
pub trait Canvas {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Overpaint the whole canvas with `color`.
    ///
    /// With a low alpha this darkens what is already there instead of
    /// clearing it, which leaves motion trails.
    fn fade(&mut self, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Text anchored at `anchor`. Canvases without a text path may ignore it.
    fn label(&mut self, anchor: Vec2, text: &str, color: Color);
}

/// One recorded [`Canvas`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fade {
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Label {
        anchor: Vec2,
        text: String,
        color: Color,
    },
}

/// A [`Canvas`] that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Recorded line segments as `(from, to, color)`.
    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2, Color)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::StrokeLine { from, to, color, .. } => Some((*from, *to, *color)),
            _ => None,
        })
    }

    /// Recorded filled discs as `(center, radius, color)`.
    pub fn discs(&self) -> impl Iterator<Item = (Vec2, f32, Color)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillCircle { center, radius, color } => Some((*center, *radius, *color)),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Play the recording onto another canvas.
    pub fn replay<C: Canvas + ?Sized>(&self, target: &mut C) {
        for command in &self.commands {
            match command {
                DrawCommand::Fade { color } => target.fade(*color),
                DrawCommand::FillCircle { center, radius, color } => {
                    target.fill_circle(*center, *radius, *color)
                }
                DrawCommand::StrokeCircle {
                    center,
                    radius,
                    width,
                    color,
                } => target.stroke_circle(*center, *radius, *width, *color),
                DrawCommand::StrokeLine { from, to, width, color } => {
                    target.stroke_line(*from, *to, *width, *color)
                }
                DrawCommand::Label { anchor, text, color } => target.label(*anchor, text, *color),
            }
        }
    }
}

impl Canvas for DrawList {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fade(&mut self, color: Color) {
        self.commands.push(DrawCommand::Fade { color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeLine { from, to, width, color });
    }

    fn label(&mut self, anchor: Vec2, text: &str, color: Color) {
        self.commands.push(DrawCommand::Label {
            anchor,
            text: text.to_owned(),
            color,
        });
    }
}

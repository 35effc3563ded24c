//! Decorative line-art painted on top of the particles.
//!
//! Overlays are stateless: every frame they are drawn from the elapsed time
//! alone, so a layer can be paused, resized or remounted without anything to
//! reset.
//!
//! | Overlay | Look |
//! |---------|------|
//! | [`Overlay::Grid`] | Faint square grid across the whole canvas |
//! | [`Overlay::HexRing`] | Large hexagon turning slowly about the centre |
//! | [`Overlay::Cube`] | Wireframe cube tumbling on three axes |
//! | [`Overlay::Reactor`] | Concentric rings pulsing out of phase around a glowing core |

use std::f32::consts::{FRAC_PI_3, TAU};

use glam::{EulerRot, Mat3, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::visuals::Color;

/// Ring radii of the reactor, as fractions of its outer radius.
const REACTOR_RINGS: [f32; 3] = [1.0, 0.75, 0.5];
/// Pulse delay of each reactor ring in seconds.
const REACTOR_PHASES: [f32; 3] = [0.0, 0.3, 0.6];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    Grid {
        spacing: f32,
        width: f32,
        color: Color,
    },
    HexRing {
        radius: f32,
        /// Radians per second.
        spin: f32,
        width: f32,
        color: Color,
    },
    Cube {
        /// Edge length.
        size: f32,
        /// Degrees per second about x, y and z.
        spin: [f32; 3],
        width: f32,
        color: Color,
    },
    Reactor {
        radius: f32,
        /// Seconds per pulse.
        period: f32,
        color: Color,
    },
}

impl Overlay {
    pub fn grid(spacing: f32) -> Self {
        Overlay::Grid {
            spacing,
            width: 0.5,
            color: Color::CYAN.with_alpha(0.02),
        }
    }

    pub fn hex_ring(radius: f32) -> Self {
        Overlay::HexRing {
            radius,
            spin: 0.1,
            width: 1.0,
            color: Color::CYAN.with_alpha(0.05),
        }
    }

    pub fn cube(size: f32) -> Self {
        Overlay::Cube {
            size,
            spin: [10.0, 14.0, 6.0],
            width: 2.0,
            color: Color::CYAN.with_alpha(0.4),
        }
    }

    pub fn reactor(radius: f32) -> Self {
        Overlay::Reactor {
            radius,
            period: 2.0,
            color: Color::CYAN,
        }
    }

    /// Paint the overlay as it looks `elapsed` seconds after mount.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, elapsed: f32) {
        let (w, h) = canvas.size();
        let size = Vec2::new(w as f32, h as f32);
        let center = size * 0.5;

        match *self {
            Overlay::Grid { spacing, width, color } => {
                if !(spacing >= 1.0) {
                    return;
                }
                let mut x = 0.0;
                while x < size.x {
                    canvas.stroke_line(Vec2::new(x, 0.0), Vec2::new(x, size.y), width, color);
                    x += spacing;
                }
                let mut y = 0.0;
                while y < size.y {
                    canvas.stroke_line(Vec2::new(0.0, y), Vec2::new(size.x, y), width, color);
                    y += spacing;
                }
            }
            Overlay::HexRing {
                radius,
                spin,
                width,
                color,
            } => {
                let angle = spin * elapsed;
                let corner = |i: usize| center + Vec2::from_angle(angle + FRAC_PI_3 * i as f32) * radius;
                for i in 0..6 {
                    canvas.stroke_line(corner(i), corner(i + 1), width, color);
                }
            }
            Overlay::Cube {
                size: edge,
                spin,
                width,
                color,
            } => {
                let [ax, ay, az] = spin.map(|deg| (deg * elapsed).to_radians());
                let rotation = Mat3::from_euler(EulerRot::XYZ, ax, ay, az);
                let half = edge * 0.5;
                let corners: [Vec2; 8] = std::array::from_fn(|i| {
                    let local = Vec3::new(
                        if i & 1 == 0 { -half } else { half },
                        if i & 2 == 0 { -half } else { half },
                        if i & 4 == 0 { -half } else { half },
                    );
                    center + (rotation * local).truncate()
                });
                for a in 0..8usize {
                    for b in a + 1..8 {
                        if (a ^ b).count_ones() == 1 {
                            canvas.stroke_line(corners[a], corners[b], width, color);
                        }
                    }
                }
            }
            Overlay::Reactor {
                radius,
                period,
                color,
            } => {
                let period = period.max(f32::EPSILON);
                let core = pulse(elapsed, 0.0, period);
                for k in (1..=3).rev() {
                    let r = radius * 0.12 * k as f32;
                    canvas.fill_circle(center, r, color.fade(0.08 * (0.6 + 0.4 * core)));
                }
                canvas.fill_circle(center, radius * 0.1, Color::WHITE.fade(0.6 + 0.4 * core));

                for (scale, phase) in REACTOR_RINGS.into_iter().zip(REACTOR_PHASES) {
                    let p = pulse(elapsed, phase, period);
                    let r = radius * scale * (1.0 + 0.04 * p);
                    canvas.stroke_circle(center, r, 2.0, color.fade(0.3 + 0.5 * p));
                }
            }
        }
    }
}

/// `0..=1` sine pulse delayed by `phase` seconds.
fn pulse(t: f32, phase: f32, period: f32) -> f32 {
    0.5 + 0.5 * (TAU * (t - phase) / period).sin()
}

//! Paints one field onto a [`Canvas`].
//!
//! Each frame is drawn in a fixed order:
//!
//! 1. Trail fade: the background color overpaints everything at low alpha.
//! 2. Particle discs, alpha `opacity * alpha_scale`.
//! 3. Links between close pairs.
//! 4. Halo rings.
//! 5. Label markers and text.
//! 6. Overlays.
//!
//! The renderer only reads the store. It keeps scratch buffers between
//! frames so steady-state rendering does not allocate.

use glam::Vec2;

use crate::canvas::Canvas;
use crate::config::FieldConfig;
use crate::particle::Particle;
use crate::spatial::SpatialGrid;
use crate::store::ParticleStore;
use crate::visuals::{Color, LinkScope, LinkStyle};

/// Above this many particles, all-pairs link search goes through a
/// [`SpatialGrid`]. Below it the plain double loop is faster.
pub const GRID_THRESHOLD: usize = 256;

/// Timing passed to [`Renderer::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInfo {
    /// Seconds since the layer mounted.
    pub elapsed: f32,
    /// Frames rendered since the layer mounted.
    pub frame: u64,
}

/// Counts from one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub links: usize,
    pub labels: usize,
}

/// A line to draw between particles `a` and `b` (`a < b`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

#[derive(Debug, Default)]
pub struct Renderer {
    grid: SpatialGrid,
    positions: Vec<Vec2>,
    links: Vec<Link>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<C: Canvas + ?Sized>(
        &mut self,
        store: &ParticleStore,
        config: &FieldConfig,
        frame: FrameInfo,
        canvas: &mut C,
    ) -> FrameStats {
        let particles = store.particles();
        let mut stats = FrameStats {
            particles: particles.len(),
            ..FrameStats::default()
        };

        if config.trail_fade > 0.0 {
            canvas.fade(config.background.with_alpha(config.trail_fade));
        }

        for p in particles {
            let alpha = p.opacity * config.alpha_scale;
            canvas.fill_circle(p.position, p.size, config.color.with_alpha(alpha));
        }

        if let Some(style) = &config.links {
            let links = self.find_links(particles, style);
            stats.links = links.len();
            for link in links {
                canvas.stroke_line(
                    particles[link.a].position,
                    particles[link.b].position,
                    style.width,
                    config.color.with_alpha(link.alpha),
                );
            }
        }

        if let Some(halo) = &config.halo {
            for p in particles {
                canvas.stroke_circle(
                    p.position,
                    p.size + halo.gap,
                    halo.width,
                    config.color.with_alpha(halo.alpha * p.opacity.min(1.0)),
                );
            }
        }

        for p in particles {
            let Some(label) = &p.label else {
                continue;
            };
            let color = config.color.with_alpha(p.opacity * config.alpha_scale);
            draw_diamond(canvas, p.position, p.size, color);
            if !label.text.is_empty() {
                canvas.label(p.position + Vec2::new(p.size + 4.0, 0.0), &label.text, color);
                stats.labels += 1;
            }
        }

        for overlay in &config.overlays {
            overlay.draw(canvas, frame.elapsed);
        }

        stats
    }

    /// Pairs closer than `style.distance`, ordered by `(a, b)`.
    pub fn find_links(&mut self, particles: &[Particle], style: &LinkStyle) -> &[Link] {
        self.links.clear();
        let n = particles.len();

        match style.scope {
            LinkScope::Next(window) => {
                for a in 0..n {
                    for b in a + 1..n.min(a + 1 + window) {
                        self.push_link(particles, style, a, b);
                    }
                }
            }
            LinkScope::All if n <= GRID_THRESHOLD => {
                for a in 0..n {
                    for b in a + 1..n {
                        self.push_link(particles, style, a, b);
                    }
                }
            }
            LinkScope::All => {
                self.positions.clear();
                self.positions.extend(particles.iter().map(|p| p.position));
                self.grid.rebuild(&self.positions, style.distance);

                let links = &mut self.links;
                self.grid
                    .for_each_pair_within(&self.positions, style.distance, |a, b, d| {
                        if let Some(alpha) = link_alpha(particles, style, a, d) {
                            links.push(Link { a, b, alpha });
                        }
                    });
                links.sort_unstable_by_key(|l| (l.a, l.b));
            }
        }

        &self.links
    }

    fn push_link(&mut self, particles: &[Particle], style: &LinkStyle, a: usize, b: usize) {
        let d = particles[a].position.distance(particles[b].position);
        if let Some(alpha) = link_alpha(particles, style, a, d) {
            self.links.push(Link { a, b, alpha });
        }
    }
}

fn link_alpha(particles: &[Particle], style: &LinkStyle, a: usize, d: f32) -> Option<f32> {
    let alpha = style.alpha_at(d)?;
    Some(if style.fade_with_particle {
        alpha * particles[a].opacity
    } else {
        alpha
    })
}

fn draw_diamond<C: Canvas + ?Sized>(canvas: &mut C, at: Vec2, r: f32, color: Color) {
    let corners = [
        at + Vec2::new(0.0, -r),
        at + Vec2::new(r, 0.0),
        at + Vec2::new(0.0, r),
        at + Vec2::new(-r, 0.0),
    ];
    for i in 0..4 {
        canvas.stroke_line(corners[i], corners[(i + 1) % 4], 1.0, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, DrawList};
    use crate::particle::Label;
    use crate::store::Bounds;
    use crate::visuals::Halo;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn store_with(particles: Vec<Particle>) -> ParticleStore {
        let mut store = ParticleStore::new(Bounds::new(400.0, 400.0));
        for p in particles {
            store.push(p);
        }
        store
    }

    #[test]
    fn test_two_particles_one_link() {
        let store = store_with(vec![
            Particle::new(Vec2::ZERO, Vec2::ZERO),
            Particle::new(Vec2::new(10.0, 0.0), Vec2::ZERO),
        ]);
        let config = FieldConfig::new()
            .with_trail_fade(0.0)
            .with_links(LinkStyle::new(150.0).with_alpha(0.1));
        let mut list = DrawList::new(400, 400);
        let stats = Renderer::new().render(&store, &config, FrameInfo::default(), &mut list);

        assert_eq!(stats.links, 1);
        let lines: Vec<_> = list.lines().collect();
        assert_eq!(lines.len(), 1);
        let expected = (1.0 - 10.0 / 150.0) * 0.1;
        assert!((lines[0].2.a - expected).abs() < 1e-6);
    }

    #[test]
    fn test_draw_order() {
        let store = store_with(vec![
            Particle::new(Vec2::ZERO, Vec2::ZERO),
            Particle::new(Vec2::new(5.0, 0.0), Vec2::ZERO),
        ]);
        let config = FieldConfig::new()
            .with_links(LinkStyle::new(50.0))
            .with_halo(Halo::default());
        let mut list = DrawList::new(100, 100);
        Renderer::new().render(&store, &config, FrameInfo::default(), &mut list);

        let kinds: Vec<&str> = list
            .commands()
            .iter()
            .map(|c| match c {
                DrawCommand::Fade { .. } => "fade",
                DrawCommand::FillCircle { .. } => "disc",
                DrawCommand::StrokeLine { .. } => "line",
                DrawCommand::StrokeCircle { .. } => "halo",
                DrawCommand::Label { .. } => "label",
            })
            .collect();
        assert_eq!(kinds, ["fade", "disc", "disc", "line", "halo", "halo"]);
    }

    #[test]
    fn test_disc_alpha_uses_alpha_scale() {
        let store = store_with(vec![Particle::new(Vec2::ZERO, Vec2::ZERO).with_opacity(0.5)]);
        let mut config = FieldConfig::new().with_trail_fade(0.0);
        config.alpha_scale = 0.8;
        let mut list = DrawList::new(10, 10);
        Renderer::new().render(&store, &config, FrameInfo::default(), &mut list);
        let (_, _, color) = list.discs().next().unwrap();
        assert!((color.a - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_windowed_scope_limits_pairs() {
        let particles: Vec<Particle> = (0..10)
            .map(|i| Particle::new(Vec2::new(i as f32, 0.0), Vec2::ZERO))
            .collect();
        let style = LinkStyle::new(100.0).with_scope(LinkScope::Next(4));
        let mut renderer = Renderer::new();
        let links = renderer.find_links(&particles, &style);
        // 6 particles see 4 successors, then 3, 2, 1, 0
        assert_eq!(links.len(), 6 * 4 + 3 + 2 + 1);
        assert!(links.iter().all(|l| l.b - l.a <= 4));
    }

    #[test]
    fn test_link_fades_with_first_particle() {
        let particles = vec![
            Particle::new(Vec2::ZERO, Vec2::ZERO).with_opacity(0.5),
            Particle::new(Vec2::ZERO, Vec2::ZERO),
        ];
        let style = LinkStyle::new(100.0).with_alpha(0.3).fading_with_particle();
        let mut renderer = Renderer::new();
        let links = renderer.find_links(&particles, &style);
        assert_eq!(links.len(), 1);
        assert!((links[0].alpha - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_data_stream_links_ignore_distance() {
        let particles = vec![
            Particle::new(Vec2::ZERO, Vec2::ZERO).with_opacity(0.5),
            Particle::new(Vec2::new(90.0, 0.0), Vec2::ZERO),
        ];
        let config = FieldConfig::data_stream();
        let style = config.links.unwrap();
        let mut renderer = Renderer::new();
        let links = renderer.find_links(&particles, &style);
        assert_eq!(links.len(), 1);
        assert!((links[0].alpha - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_grid_and_brute_force_agree() {
        let mut rng = StdRng::seed_from_u64(11);
        let particles: Vec<Particle> = (0..GRID_THRESHOLD * 3)
            .map(|_| {
                let pos = Vec2::new(rng.gen_range(0.0..1200.0), rng.gen_range(0.0..800.0));
                Particle::new(pos, Vec2::ZERO)
            })
            .collect();
        let style = LinkStyle::new(80.0).with_alpha(0.2);

        let mut renderer = Renderer::new();
        let via_grid = renderer.find_links(&particles, &style).to_vec();

        let mut brute = Vec::new();
        for a in 0..particles.len() {
            for b in a + 1..particles.len() {
                let d = particles[a].position.distance(particles[b].position);
                if let Some(alpha) = style.alpha_at(d) {
                    brute.push(Link { a, b, alpha });
                }
            }
        }
        assert_eq!(via_grid, brute);
    }

    #[test]
    fn test_labels_draw_marker_and_text() {
        let store = store_with(vec![
            Particle::new(Vec2::new(50.0, 50.0), Vec2::ZERO)
                .with_size(4.0)
                .with_label(Label::new("DOCKER", Vec2::ZERO)),
            Particle::new(Vec2::new(80.0, 50.0), Vec2::ZERO).with_label(Label::new("", Vec2::ZERO)),
        ]);
        let config = FieldConfig::new().with_trail_fade(0.0).with_color(Color::WHITE);
        let mut list = DrawList::new(100, 100);
        let stats = Renderer::new().render(&store, &config, FrameInfo::default(), &mut list);

        assert_eq!(stats.labels, 1);
        assert_eq!(list.labels().collect::<Vec<_>>(), ["DOCKER"]);
        // two diamonds
        assert_eq!(list.lines().count(), 8);
    }

    #[test]
    fn test_zero_trail_fade_skips_overpaint() {
        let store = store_with(Vec::new());
        let config = FieldConfig::new().with_trail_fade(0.0);
        let mut list = DrawList::new(10, 10);
        Renderer::new().render(&store, &config, FrameInfo::default(), &mut list);
        assert!(list.commands().is_empty());
    }
}

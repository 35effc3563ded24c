//! Integration tests for the per-frame invariants of the particle engine.
//!
//! Every test drives the public API only: configs, engines, stores, the
//! stepper and the renderer.

use bhud_fx::prelude::*;
use bhud_fx::{Particle as Dot, ParticleStore, Renderer, Rule, Stepper};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_bounded_presets_stay_inside() {
    let bounds = Bounds::new(320.0, 240.0);
    let presets = [
        ("particle_background", FieldConfig::particle_background()),
        ("neural_network", FieldConfig::neural_network()),
        ("label_stream", FieldConfig::label_stream(["CPU", "NET", "MEM", "GPU"])),
    ];

    for (name, config) in presets {
        let mut engine = FieldEngine::new(config, bounds, Some(11)).unwrap();
        for i in 0..600 {
            let t = i as f32 * 0.05;
            engine.set_pointer(Some(Vec2::new(160.0 + 100.0 * t.cos(), 120.0 + 80.0 * t.sin())));
            engine.step();
            for p in engine.store().particles() {
                assert!(bounds.contains(p.position), "{} left the bounds at {:?}", name, p.position);
            }
        }
    }
}

#[test]
fn test_bounds_hold_after_shrink() {
    let config = FieldConfig::particle_background().with_resize(ResizePolicy::Keep);
    let mut engine = FieldEngine::new(config, Bounds::new(800.0, 600.0), Some(5)).unwrap();
    let small = Bounds::new(200.0, 150.0);
    engine.resize(small);
    engine.step();
    assert!(engine.store().particles().iter().all(|p| small.contains(p.position)));
}

// ============================================================================
// Opacity and expiry
// ============================================================================

#[test]
fn test_opacity_in_range_and_expired_removed() {
    let config = FieldConfig::new()
        .with_count(200)
        .with_opacity(Span::new(0.05, 1.0))
        .with_decay(0.07);
    let mut engine = FieldEngine::new(config, Bounds::new(100.0, 100.0), Some(3)).unwrap();

    let mut removed = 0;
    let mut previous = engine.store().len();
    for _ in 0..20 {
        let report = engine.step();
        assert_eq!(report.alive, engine.store().len());
        assert_eq!(previous - report.alive, report.expired);
        removed += report.expired;
        previous = report.alive;
        for p in engine.store().particles() {
            assert!(p.opacity > 0.0 && p.opacity <= 1.0);
        }
    }
    assert_eq!(removed, 200);
    assert!(engine.store().is_empty());
}

// ============================================================================
// Zero-distance guards
// ============================================================================

#[test]
fn test_coincident_particles_and_pointer_stay_finite() {
    let at = Vec2::new(50.0, 50.0);
    let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
    store.push(Dot::new(at, Vec2::ZERO));
    store.push(Dot::new(at, Vec2::ZERO));

    let stepper = Stepper::new().with_rule(Rule::Repel {
        radius: 150.0,
        strength: 0.1,
    });
    let mut rng = StdRng::seed_from_u64(0);
    stepper.step(&mut store, Some(at), &mut rng);
    assert!(store.particles().iter().all(Dot::is_finite));

    let mut renderer = Renderer::new();
    let links = renderer.find_links(store.particles(), &LinkStyle::new(150.0).with_alpha(0.5));
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].alpha, 0.5);

    let config = FieldConfig::new().with_count(0).with_links(LinkStyle::new(150.0));
    let mut list = DrawList::new(100, 100);
    renderer.render(&store, &config, Default::default(), &mut list);
    for (from, to, color) in list.lines() {
        assert!(from.is_finite() && to.is_finite() && color.a.is_finite());
    }
}

// ============================================================================
// Damping and reflection
// ============================================================================

#[test]
fn test_damping_never_speeds_up() {
    let config = FieldConfig::new()
        .with_count(30)
        .with_velocity(Span::symmetric(3.0))
        .with_boundary(Boundary::Unbounded)
        .with_damping(0.95);
    let mut engine = FieldEngine::new(config, Bounds::new(100.0, 100.0), Some(9)).unwrap();

    let mut speeds: Vec<f32> = engine.store().particles().iter().map(|p| p.velocity.length()).collect();
    for _ in 0..100 {
        engine.step();
        for (p, last) in engine.store().particles().iter().zip(speeds.iter_mut()) {
            let speed = p.velocity.length();
            assert!(speed <= *last);
            *last = speed;
        }
    }
}

#[test]
fn test_reflection_flips_axis_and_clamps() {
    let mut store = ParticleStore::new(Bounds::new(100.0, 100.0));
    store.push(Dot::new(Vec2::new(1.0, 99.0), Vec2::new(-2.0, 4.0)));

    let stepper = Stepper::from_config(&FieldConfig::new());
    let mut rng = StdRng::seed_from_u64(0);
    stepper.step(&mut store, None, &mut rng);

    let p = &store.particles()[0];
    assert_eq!(p.position, Vec2::new(0.0, 100.0));
    assert_eq!(p.velocity, Vec2::new(2.0, -4.0));
}

// ============================================================================
// Links
// ============================================================================

#[test]
fn test_two_particles_draw_one_line() {
    let mut store = ParticleStore::new(Bounds::new(200.0, 200.0));
    store.push(Dot::new(Vec2::ZERO, Vec2::ZERO).with_opacity(1.0));
    store.push(Dot::new(Vec2::new(10.0, 0.0), Vec2::ZERO).with_opacity(1.0));

    let style = LinkStyle::new(150.0).with_alpha(0.1);
    let config = FieldConfig::new().with_trail_fade(0.0).with_links(style);

    let mut renderer = Renderer::new();
    let mut list = DrawList::new(200, 200);
    let stats = renderer.render(&store, &config, Default::default(), &mut list);
    assert_eq!(stats.links, 1);

    let lines: Vec<_> = list.lines().collect();
    assert_eq!(lines.len(), 1);
    let expected = (1.0 - 10.0 / 150.0) * 0.1;
    assert!((lines[0].2.a - expected).abs() < 1e-6);
}

// ============================================================================
// Bursts
// ============================================================================

#[test]
fn test_burst_at_origin_expires_on_schedule() {
    let decay = 0.02;
    let config = FieldConfig::new()
        .with_count(0)
        .with_opacity(Span::fixed(1.0))
        .with_boundary(Boundary::Unbounded)
        .with_decay(decay)
        .with_burst(BurstConfig::new(25).with_velocity(Span::fixed(0.0)));
    let mut engine = FieldEngine::new(config, Bounds::new(300.0, 300.0), Some(1)).unwrap();

    let origin = Vec2::new(40.0, 60.0);
    assert_eq!(engine.trigger(Some(origin)), 25);
    assert!(engine.store().particles().iter().all(|p| p.position == origin));

    let ticks = (1.0 / decay).ceil() as usize;
    for _ in 0..ticks - 1 {
        engine.step();
    }
    assert_eq!(engine.store().len(), 25);
    engine.step();
    assert!(engine.store().is_empty());
}

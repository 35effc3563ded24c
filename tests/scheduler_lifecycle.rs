//! Integration tests for mounting, pumping and tearing down layers.

use bhud_fx::prelude::*;

fn background(seed: u64) -> LayerSpec {
    LayerSpec::new("background", FieldConfig::particle_background()).with_seed(seed)
}

#[test]
fn test_unmount_cancels_pending_frame_and_listeners() {
    let mut scheduler = FrameScheduler::new(120, 80);
    let id = scheduler.mount(background(1)).unwrap();
    assert_eq!(scheduler.hub().listener_count(), 1);
    assert_eq!(scheduler.queue().len(), 1);

    assert!(scheduler.unmount(id));
    assert!(!scheduler.is_mounted(id));
    assert!(scheduler.queue().is_empty());
    assert_eq!(scheduler.hub().listener_count(), 0);
    assert!(scheduler.engine(id).is_none());
    assert!(scheduler.surface(id).is_none());

    assert_eq!(scheduler.pump(1.0 / 60.0), 0);
    assert!(!scheduler.unmount(id));
}

#[test]
fn test_unmount_leaves_other_layers_running() {
    let mut scheduler = FrameScheduler::new(120, 80);
    let a = scheduler.mount(background(1)).unwrap();
    let b = scheduler
        .mount(LayerSpec::new("network", FieldConfig::neural_network()).with_z(1).with_seed(2))
        .unwrap();

    assert_eq!(scheduler.pump(0.016), 2);
    scheduler.unmount(a);
    for _ in 0..5 {
        assert_eq!(scheduler.pump(0.016), 1);
    }
    assert_eq!(scheduler.engine(b).unwrap().clock().frame(), 6);
}

#[test]
fn test_pointer_reaches_only_subscribed_layers() {
    let mut scheduler = FrameScheduler::new(200, 200);
    let bg = scheduler.mount(background(3)).unwrap();
    let nn = scheduler
        .mount(LayerSpec::new("network", FieldConfig::neural_network()).with_seed(4))
        .unwrap();

    scheduler.pointer_moved(Some(Vec2::new(100.0, 100.0)));
    scheduler.pump(0.016);
    assert_eq!(scheduler.engine(bg).unwrap().pointer(), Some(Vec2::new(100.0, 100.0)));
    assert_eq!(scheduler.engine(nn).unwrap().pointer(), None);

    scheduler.pointer_moved(None);
    scheduler.pump(0.016);
    assert_eq!(scheduler.engine(bg).unwrap().pointer(), None);
}

#[test]
fn test_layers_composite_in_z_order() {
    let mut scheduler = FrameScheduler::new(40, 40);
    let top = scheduler
        .mount(LayerSpec::new("top", FieldConfig::hologram()).with_z(5))
        .unwrap();
    let bottom = scheduler
        .mount(LayerSpec::new("bottom", FieldConfig::arc_reactor()).with_z(-5))
        .unwrap();
    assert_eq!(scheduler.layer_ids(), vec![bottom, top]);

    scheduler.pump(0.016);
    let mut frame = Surface::filled(40, 40, Color::NAVY);
    scheduler.composite(&mut frame);
    assert_eq!(frame.width(), 40);
}

#[test]
fn test_resize_follows_viewport() {
    let mut scheduler = FrameScheduler::new(100, 100);
    let id = scheduler.mount(background(5)).unwrap();
    scheduler.resize(300, 50);

    assert_eq!(scheduler.viewport(), (300, 50));
    let surface = scheduler.surface(id).unwrap();
    assert_eq!((surface.width(), surface.height()), (300, 50));

    let engine = scheduler.engine(id).unwrap();
    assert_eq!(engine.bounds(), Bounds::new(300.0, 50.0));
    assert!(engine.store().particles().iter().all(|p| engine.bounds().contains(p.position)));
}

#[test]
fn test_trigger_reaches_bursting_layers() {
    let mut scheduler = FrameScheduler::new(100, 100);
    scheduler.mount(background(6)).unwrap();
    let stream = scheduler
        .mount(LayerSpec::new("stream", FieldConfig::data_stream()).with_seed(7))
        .unwrap();

    assert_eq!(scheduler.trigger(None), 10);
    assert_eq!(scheduler.engine(stream).unwrap().store().len(), 10);
    assert!(scheduler.engine(stream).unwrap().is_bursting());
}

#[test]
fn test_invalid_layer_is_not_mounted() {
    let mut scheduler = FrameScheduler::new(100, 100);
    let bad = LayerSpec::new("bad", FieldConfig::new().with_decay(2.0));
    assert!(scheduler.mount(bad).is_err());
    assert!(scheduler.is_empty());
    assert!(scheduler.queue().is_empty());
}

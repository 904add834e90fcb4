use std::sync::Arc;

use super::*;
use crate::{animation::ease::Ease, encode::sink::InMemorySink};

#[rustfmt::skip]
fn center_block_mask() -> MaskBuffer {
    MaskBuffer::from_luma(4, 4, vec![
        0,   0,   0, 0,
        0, 255, 255, 0,
        0, 255, 255, 0,
        0,   0,   0, 0,
    ]).unwrap()
}

fn background(w: u32, h: u32) -> PreparedImage {
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new([30, 40, 50, 255].repeat((w * h) as usize)),
    }
}

fn config() -> SceneConfig {
    SceneConfig {
        mask_decode_scale: 1.0,
        speed_scale: 0.01,
        point_scale: 6.0,
        seed: Some(3),
        viewport: Canvas {
            width: 24,
            height: 16,
        },
        ..SceneConfig::new("mask.png", "bg.png")
    }
}

fn scene(cfg: SceneConfig, mask: MaskBuffer) -> Scene {
    Scene::from_parts(cfg, mask, &background(8, 8), &mut SeededRandom::new(1)).unwrap()
}

#[test]
fn four_by_four_scenario_spawns_at_block_centers() {
    let s = scene(config(), center_block_mask());
    let f = s.field();
    assert_eq!(f.len(), 4);
    let xy: Vec<(f32, f32)> = f.positions().chunks_exact(3).map(|p| (p[0], p[1])).collect();
    assert_eq!(
        xy,
        vec![(-0.25, 0.25), (-0.25, 0.0), (0.0, 0.25), (0.0, 0.0)]
    );
}

#[test]
fn each_tick_steps_once_and_renders_once() {
    let mut s = scene(config(), center_block_mask());
    for i in 1..=5u64 {
        let frame = s.tick(0.1).unwrap();
        assert_eq!((frame.width, frame.height), (24, 16));
        assert_eq!(s.field().steps(), i);
    }
    assert_eq!(s.clock().ticks(), 5);
    assert!((s.clock().elapsed_secs() - 0.5).abs() < 1e-12);
    assert_eq!(s.compositor().surface_allocations(), 2);
}

#[test]
fn zero_progress_skips_stepping_but_still_renders() {
    let mut s = scene(config(), center_block_mask());
    s.set_progress(0.0).unwrap();
    let before = s.field().clone();
    let frame = s.tick(0.1).unwrap();
    assert_eq!(s.field(), &before);
    assert_eq!(frame.data.len(), 24 * 16 * 4);
    assert!(s.compositor().particle_layer().unwrap().iter().all(|&b| b == 0));
}

#[test]
fn zero_speed_scene_is_static() {
    let cfg = SceneConfig {
        speed_scale: 0.0,
        reflection_jitter: 0.4,
        ..config()
    };
    let mut s = scene(cfg, center_block_mask());
    let before = s.field().positions().to_vec();
    for _ in 0..20 {
        s.tick(1.0 / 30.0).unwrap();
    }
    assert_eq!(s.field().positions(), before.as_slice());
}

#[test]
fn empty_mask_renders_without_particles() {
    let mask = MaskBuffer::from_luma(4, 4, vec![0; 16]).unwrap();
    let mut s = scene(config(), mask);
    assert!(s.field().is_empty());
    let frame = s.tick(0.1).unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn serial_and_parallel_scenes_agree() {
    let parallel = SceneConfig {
        reflection_jitter: 0.2,
        ..config()
    };
    let serial = SceneConfig {
        parallel: false,
        ..parallel.clone()
    };
    let mut a = scene(parallel, center_block_mask());
    let mut b = scene(serial, center_block_mask());
    for _ in 0..30 {
        a.step();
        b.step();
    }
    assert_eq!(a.field(), b.field());
}

#[test]
fn progress_is_clamped_and_nan_rejected() {
    let mut s = scene(config(), center_block_mask());
    s.set_progress(3.0).unwrap();
    assert_eq!(s.progress(), 1.0);
    s.set_progress(-1.0).unwrap();
    assert_eq!(s.progress(), 0.0);
    assert!(s.set_progress(f32::NAN).is_err());
}

#[test]
fn viewport_changes_resize_output() {
    let mut s = scene(config(), center_block_mask());
    s.render().unwrap();
    s.set_viewport(Canvas::new(24, 16).unwrap()).unwrap();
    s.render().unwrap();
    assert_eq!(s.compositor().surface_allocations(), 2);

    s.set_viewport(Canvas::new(10, 30).unwrap()).unwrap();
    let frame = s.render().unwrap();
    assert_eq!((frame.width, frame.height), (10, 30));
    assert_eq!(s.compositor().surface_allocations(), 3);
    assert!(
        s.set_viewport(Canvas {
            width: 0,
            height: 1
        })
        .is_err()
    );
}

#[test]
fn render_range_follows_ramp_into_sink() {
    let mut s = scene(config(), center_block_mask());
    let mut sink = InMemorySink::new();
    let ramp = ProgressRamp::fade_in(4, Ease::Linear);
    s.render_range(6, Fps::new(30, 1).unwrap(), &mut sink, Some(&ramp))
        .unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.frames().len(), 6);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!((frame.width, frame.height), (24, 16));
    }
    assert_eq!(s.progress(), 1.0);
    // Frame 0 has progress 0 and does not step.
    assert_eq!(s.field().steps(), 5);
    let cfg = sink.config().unwrap();
    assert_eq!(cfg.fps, Fps::new(30, 1).unwrap());
}

#[test]
fn replace_mask_rebuilds_field() {
    let mut s = scene(config(), center_block_mask());
    let full = MaskBuffer::from_luma(3, 3, vec![255; 9]).unwrap();
    s.replace_mask(full, &mut SeededRandom::new(2)).unwrap();
    assert_eq!(s.field().len(), 9);
    assert_eq!(s.field().steps(), 0);
    assert_eq!(s.mask().width(), 3);
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = SceneConfig {
        supersample: 9,
        ..config()
    };
    let err = Scene::from_parts(
        cfg,
        center_block_mask(),
        &background(8, 8),
        &mut SeededRandom::new(0),
    )
    .unwrap_err();
    assert!(matches!(err, MaskflowError::Validation(_)));
}

use std::f32::consts::PI;

use super::*;
use crate::{
    foundation::core::Stride,
    mask::sampler::{InsidePredicate, sample},
    particles::{boundary::MaskBoundary, random::SeededRandom},
};

/// Scripted source cycling through a fixed list.
struct Script {
    values: Vec<f32>,
    at: usize,
}

impl RandomSource for Script {
    fn next_unit(&mut self) -> f32 {
        let v = self.values[self.at % self.values.len()];
        self.at += 1;
        v
    }
}

fn half_plane_mask() -> MaskBuffer {
    // 20x20, left half inside.
    let mut px = vec![0u8; 400];
    for y in 0..20 {
        for x in 0..10 {
            px[y * 20 + x] = 255;
        }
    }
    MaskBuffer::from_luma(20, 20, px).unwrap()
}

fn field_for(mask: &MaskBuffer, params: &SpawnParams, seed: u64) -> ParticleField {
    let space = MaskSpace::for_mask(mask);
    let seeds = space.seeds_to_local(&sample(mask, Stride::default(), InsidePredicate::Opaque));
    ParticleField::build(&seeds, space, params, &mut SeededRandom::new(seed)).unwrap()
}

#[test]
fn build_is_deterministic_for_equal_inputs() {
    let mask = half_plane_mask();
    let params = SpawnParams::default();
    let a = field_for(&mask, &params, 11);
    let b = field_for(&mask, &params, 11);
    assert_eq!(a, b);
    assert_eq!(a.len(), 200);

    let c = field_for(&mask, &params, 12);
    assert_ne!(a.headings(), c.headings());
}

#[test]
fn build_draws_within_ranges() {
    let mask = half_plane_mask();
    let params = SpawnParams {
        speed_scale: 0.001,
        palette_size: 2,
        ranges: SpawnRanges::soft(),
        jitter_seed: 0,
    };
    let f = field_for(&mask, &params, 3);
    for i in 0..f.len() {
        let p = f.particle(i).unwrap();
        assert!((0.4..=1.0).contains(&p.position[2]));
        assert_eq!(p.position[2], p.start_position[2]);
        assert!((0.1..=0.8).contains(&p.alpha));
        assert!(p.color_index < 2);
        assert!((0.0..=2.0 * PI).contains(&p.heading));
        assert!(p.speed >= 0.001 && p.speed < 0.0015 + 1e-9);
        let dx = p.start_position[0] - p.position[0];
        let dy = p.start_position[1] - p.position[1];
        assert!((dx * dx + dy * dy).sqrt() <= 0.5 + 1e-5);
    }
    assert!(f.particle(f.len()).is_none());
}

#[test]
fn scripted_source_controls_every_attribute() {
    let space = MaskSpace::new(4, 4);
    let params = SpawnParams {
        speed_scale: 1.0,
        palette_size: 2,
        ranges: SpawnRanges {
            depth: [1.0, 2.0],
            alpha: [0.0, 1.0],
            scatter_radius: 0.0,
        },
        jitter_seed: 0,
    };
    let mut rng = Script {
        values: vec![0.5],
        at: 0,
    };
    let f = ParticleField::build(&[(0.1, -0.2)], space, &params, &mut rng).unwrap();
    let p = f.particle(0).unwrap();
    assert_eq!(p.position, [0.1, -0.2, 1.5]);
    assert_eq!(p.start_position, [0.1, -0.2, 1.5]);
    assert_eq!(p.alpha, 0.5);
    assert_eq!(p.color_index, 1);
    assert_eq!(p.heading, PI);
    assert_eq!(p.speed, 1.25);
    assert_eq!(p.phase, PI);
}

#[test]
fn build_rejects_bad_params() {
    let space = MaskSpace::new(4, 4);
    let mut rng = SeededRandom::new(0);
    let bad_speed = SpawnParams {
        speed_scale: -1.0,
        ..SpawnParams::default()
    };
    assert!(ParticleField::build(&[], space, &bad_speed, &mut rng).is_err());
    let bad_palette = SpawnParams {
        palette_size: 0,
        ..SpawnParams::default()
    };
    assert!(ParticleField::build(&[], space, &bad_palette, &mut rng).is_err());
    let bad_alpha = SpawnParams {
        ranges: SpawnRanges {
            alpha: [0.5, 1.5],
            ..SpawnRanges::standard()
        },
        ..SpawnParams::default()
    };
    assert!(ParticleField::build(&[], space, &bad_alpha, &mut rng).is_err());
}

#[test]
fn write_once_attributes_survive_steps() {
    let mask = half_plane_mask();
    let mut f = field_for(&mask, &SpawnParams::default(), 5);
    let before = f.clone();
    let policy = MaskBoundary::with_jitter(0.2);
    for _ in 0..200 {
        f.step(&policy, &mask);
    }
    assert_eq!(f.speeds(), before.speeds());
    assert_eq!(f.alphas(), before.alphas());
    assert_eq!(f.phases(), before.phases());
    assert_eq!(f.color_indices(), before.color_indices());
    assert_eq!(f.start_positions(), before.start_positions());
    for i in 0..f.len() {
        assert_eq!(f.positions()[i * 3 + 2], before.positions()[i * 3 + 2]);
    }
    assert_ne!(f.positions(), before.positions());
    assert_eq!(f.steps(), 200);
    assert_eq!(f.len(), before.len());
}

#[test]
fn blocked_particle_flips_and_moves_back_inside() {
    let mask = half_plane_mask();
    let space = MaskSpace::for_mask(&mask);
    let mut f = field_for(&mask, &SpawnParams::default(), 1);

    // Grid (10.5, 10) is just across the edge at x = 10, heading outward (+x).
    let (x, y) = space.to_local(10.5, 10.0);
    f.set_motion(0, x, y, 0.0).unwrap();
    f.step(&MaskBoundary::new(), &mask);

    let p = f.particle(0).unwrap();
    assert!((p.heading - PI).abs() < 1e-6);
    // Inward normal of the edge is -x.
    let inward = (-1.0f32, 0.0f32);
    assert!(p.heading.cos() * inward.0 + p.heading.sin() * inward.1 > 0.0);
    assert!(p.position[0] < x);
    assert!((p.position[1] - y).abs() < 1e-6);
}

#[test]
fn jittered_reflection_stays_near_half_turn() {
    let mask = half_plane_mask();
    let space = MaskSpace::for_mask(&mask);
    let mut f = field_for(&mask, &SpawnParams::default(), 1);
    let (x, y) = space.to_local(10.5, 10.0);
    f.set_motion(0, x, y, 0.0).unwrap();
    f.step(&MaskBoundary::with_jitter(0.1), &mask);

    let h = f.particle(0).unwrap().heading;
    assert!(h >= PI - 1e-6 && h <= 1.1 * PI + 1e-5);
}

#[test]
fn interior_particle_keeps_heading() {
    let mask = half_plane_mask();
    let space = MaskSpace::for_mask(&mask);
    let mut f = field_for(&mask, &SpawnParams::default(), 1);
    let (x, y) = space.to_local(5.0, 10.0);
    f.set_motion(0, x, y, 0.3).unwrap();
    f.step(&MaskBoundary::new(), &mask);
    assert_eq!(f.particle(0).unwrap().heading, 0.3);
    assert!(f.set_motion(f.len(), 0.0, 0.0, 0.0).is_err());
}

#[test]
fn zero_speed_means_stasis() {
    #[rustfmt::skip]
    let mask = MaskBuffer::from_luma(4, 4, vec![
        0,   0,   0, 0,
        0, 255, 255, 0,
        0, 255, 255, 0,
        0,   0,   0, 0,
    ]).unwrap();
    let params = SpawnParams {
        speed_scale: 0.0,
        ..SpawnParams::default()
    };
    let mut f = field_for(&mask, &params, 2);
    assert_eq!(f.len(), 4);
    let before = f.positions().to_vec();
    for _ in 0..100 {
        f.step(&MaskBoundary::with_jitter(0.5), &mask);
    }
    assert_eq!(f.positions(), before.as_slice());
}

#[test]
fn parallel_step_matches_serial_step() {
    let mask = half_plane_mask();
    let params = SpawnParams {
        speed_scale: 0.01,
        jitter_seed: 77,
        ..SpawnParams::default()
    };
    let mut serial = field_for(&mask, &params, 8);
    let mut parallel = serial.clone();
    let policy = MaskBoundary::with_jitter(0.3);
    for _ in 0..64 {
        serial.step(&policy, &mask);
        parallel.step_parallel(&policy, &mask);
    }
    assert_eq!(serial, parallel);
}

#[test]
fn particles_stay_near_silhouette() {
    let mask = half_plane_mask();
    let params = SpawnParams {
        speed_scale: 0.005,
        ..SpawnParams::default()
    };
    let mut f = field_for(&mask, &params, 4);
    let policy = MaskBoundary::new();
    for _ in 0..500 {
        f.step(&policy, &mask);
    }
    let space = f.space();
    // Max speed is 1.5 * 0.005 units = 0.15 cells; allow one step of overshoot.
    for i in 0..f.len() {
        let p = f.particle(i).unwrap();
        let (gx, _) = space.to_grid(p.position[0], p.position[1]);
        assert!(gx <= 10.0 + 0.3, "particle {i} escaped to gx={gx}");
    }
}

#[test]
fn empty_seeds_build_empty_field() {
    let mask = MaskBuffer::from_luma(3, 3, vec![0; 9]).unwrap();
    let mut f = field_for(&mask, &SpawnParams::default(), 0);
    assert!(f.is_empty());
    f.step(&MaskBoundary::new(), &mask);
    f.step_parallel(&MaskBoundary::new(), &mask);
    assert_eq!(f.steps(), 2);
}

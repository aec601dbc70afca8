//! Unit tests for tf-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EntityId, PhysicsHandle, TaskId};

    #[test]
    fn ordering() {
        assert!(EntityId(0) < EntityId(1));
        assert!(TaskId(100) > TaskId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(EntityId::INVALID.0, u32::MAX);
        assert_eq!(PhysicsHandle::INVALID.0, u32::MAX);
        assert_eq!(TaskId::INVALID.0, u64::MAX);
        assert!(!EntityId::default().is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(EntityId(7).to_string(), "EntityId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Vec2;

    #[test]
    fn distance_is_euclidean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_squared(b), 25.0);
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let n = Vec2::new(10.0, 0.0).normalized();
        assert_eq!(n, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn clamp_length_only_shrinks() {
        let v = Vec2::new(30.0, 40.0);
        assert!((v.clamp_length(5.0).length() - 5.0).abs() < 1e-5);
        assert_eq!(Vec2::new(1.0, 0.0).clamp_length(5.0), Vec2::new(1.0, 0.0));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_offset_and_since() {
        assert_eq!(Tick(10).offset(3), Tick(13));
        assert_eq!(Tick(13).since(Tick(10)), 3);
        assert_eq!(Tick(3).since(Tick(10)), 0);
    }

    #[test]
    fn cadence_due_respects_offset() {
        // every 4 ticks, offset 1 → due at ticks 3, 7, 11, …
        let due: Vec<u64> = (0..12).filter(|&t| Tick(t).is_due(4, 1)).collect();
        assert_eq!(due, vec![3, 7, 11]);
        // period 1 is always due
        assert!((0..5).all(|t| Tick(t).is_due(1, 99)));
    }

    #[test]
    fn clock_never_goes_backwards() {
        let mut clock = SimClock::new(50);
        clock.advance_to(Tick(10));
        clock.advance_to(Tick(4));
        assert_eq!(clock.current_tick, Tick(10));
        assert_eq!(clock.elapsed_ms(), 500);
    }

    #[test]
    fn secs_for_ticks_scales_by_interval() {
        let clock = SimClock::new(50);
        assert!((clock.secs_for_ticks(2) - 0.1).abs() < 1e-6);
        assert_eq!(clock.ticks_for_ms(120), 3);
    }
}

#[cfg(test)]
mod config {
    use crate::SimConfig;

    #[test]
    fn default_validates() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_cadence_rejected() {
        let mut cfg = SimConfig::default();
        cfg.cadence.targeting = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_movement_thresholds_rejected() {
        let mut cfg = SimConfig::default();
        cfg.movement.direct_threshold = 10_000.0;
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod fault {
    use crate::{Fault, guard};

    #[test]
    fn guard_passes_through_ok_and_err() {
        assert_eq!(guard(|| Ok::<_, Fault>(5)), Ok(5));
        assert_eq!(
            guard(|| Err::<(), _>(Fault::failed("boom"))),
            Err(Fault::Failed("boom".into()))
        );
    }

    #[test]
    fn guard_contains_panics() {
        let r: Result<(), Fault> = guard(|| panic!("agent exploded"));
        assert_eq!(r, Err(Fault::Panicked("agent exploded".into())));
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentRng, EntityId, SimRng, Vec2};

    #[test]
    fn same_seed_same_stream() {
        let mut a = AgentRng::new(42, EntityId(3));
        let mut b = AgentRng::new(42, EntityId(3));
        let xs: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_entities_diverge() {
        let mut a = AgentRng::new(42, EntityId(3));
        let mut b = AgentRng::new(42, EntityId(4));
        let xs: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn jitter_and_ranges_stay_bounded() {
        let mut rng = AgentRng::new(1, EntityId(9));
        for _ in 0..200 {
            let j = rng.jitter(0.5);
            assert!((-0.5..=0.5).contains(&j));
            let r = rng.gen_range(2.0..3.0);
            assert!((2.0..3.0).contains(&r));
        }
        assert_eq!(rng.jitter(0.0), 0.0);
        assert_eq!(rng.gen_range(4.0..4.0), 4.0);
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.5));
    }

    #[test]
    fn ring_points_sit_on_the_ring() {
        let mut rng = SimRng::new(5);
        let center = Vec2::new(10.0, -10.0);
        for _ in 0..50 {
            let p = rng.point_on_ring(center, 100.0);
            assert!((p.distance(center) - 100.0).abs() < 1e-2);
        }
    }

    #[test]
    fn children_are_reproducible() {
        let mut a = SimRng::new(11);
        let mut b = SimRng::new(11);
        let mut ca = a.child(3);
        let mut cb = b.child(3);
        assert_eq!(ca.gen_range(0.0..1.0), cb.gen_range(0.0..1.0));
    }
}

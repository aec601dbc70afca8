//! Unit tests for tf-mobility.

use tf_core::{EntityId, MovementConfig, Vec2};
use tf_spatial::Pathfinder;

use crate::{MovementPlanner, MovementRequest};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Pathfinder with canned answers that records invalidations.
#[derive(Default)]
struct Scripted {
    path:        Option<Vec2>,
    los:         bool,
    requests:    u32,
    invalidated: Vec<EntityId>,
}

impl Pathfinder for Scripted {
    fn request_path(&mut self, _: EntityId, _: Vec2, _: Vec2, _: f32, _: f32) -> Option<Vec2> {
        self.requests += 1;
        self.path
    }

    fn has_line_of_sight(&self, _: Vec2, _: Vec2) -> bool {
        self.los
    }

    fn invalidate_path(&mut self, agent: EntityId) {
        self.invalidated.push(agent);
    }
}

fn planner(path: Option<Vec2>, los: bool) -> MovementPlanner<Scripted> {
    MovementPlanner::new(Scripted { path, los, ..Scripted::default() }, MovementConfig::default())
}

/// Agent 1 at the origin, speed 100, 0.1 s cadence, target on the +x axis.
fn request(target_x: Option<f32>) -> MovementRequest {
    MovementRequest {
        agent:        EntityId(1),
        position:     Vec2::ZERO,
        target:       target_x.map(|x| Vec2::new(x, 0.0)),
        attack_range: 40.0,
        speed:        100.0,
        width:        32.0,
        height:       32.0,
        cadence_secs: 0.1,
        steering:     Vec2::ZERO,
    }
}

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 1e-4
}

// ── Fallback policy ───────────────────────────────────────────────────────────

#[cfg(test)]
mod policy {
    use tf_core::{EntityId, Tick, Vec2};

    use super::{close, planner, request};
    use crate::{MobilityError, MovementDecision, MovementMode, MovementRequest};

    #[test]
    fn no_target_is_idle_with_steering() {
        let mut p = planner(None, false);
        let req = MovementRequest { steering: Vec2::new(3.0, -1.0), ..request(None) };
        assert_eq!(p.plan(&req, Tick(0)).unwrap(), MovementDecision::Idle { force: Vec2::new(3.0, -1.0) });
        assert_eq!(p.pathfinder.requests, 0);
    }

    #[test]
    fn in_attack_range_does_not_move() {
        let mut p = planner(Some(Vec2::new(1.0, 1.0)), true);
        assert_eq!(p.plan(&request(Some(40.0)), Tick(0)).unwrap(), MovementDecision::InRange);
        assert_eq!(p.pathfinder.requests, 0);
        assert_eq!(p.store.get(EntityId(1)).unwrap().mode, MovementMode::InRange);
    }

    #[test]
    fn waypoint_is_followed() {
        let mut p = planner(Some(Vec2::new(0.0, 200.0)), false);
        match p.plan(&request(Some(500.0)), Tick(4)).unwrap() {
            MovementDecision::Move { force, waypoint, direct } => {
                assert!(!direct);
                assert_eq!(waypoint, Vec2::new(0.0, 200.0));
                // speed * cadence = 10 along +y.
                assert!(close(force, Vec2::new(0.0, 10.0)), "{force}");
            }
            other => panic!("expected move, got {other:?}"),
        }
        let s = p.store.get(EntityId(1)).unwrap();
        assert_eq!(s.mode, MovementMode::Pathing);
        assert_eq!(s.waypoint, Some(Vec2::new(0.0, 200.0)));
    }

    #[test]
    fn steering_is_added_to_force() {
        let mut p = planner(Some(Vec2::new(500.0, 0.0)), false);
        let req = MovementRequest { steering: Vec2::new(0.0, 2.0), ..request(Some(500.0)) };
        let d = p.plan(&req, Tick(0)).unwrap();
        assert!(close(d.force(), Vec2::new(10.0, 2.0)));
    }

    #[test]
    fn short_distance_goes_direct_without_path() {
        let mut p = planner(None, false);
        let d = p.plan(&request(Some(80.0)), Tick(0)).unwrap();
        assert!(matches!(d, MovementDecision::Move { direct: true, .. }));
        assert_eq!(p.store.get(EntityId(1)).unwrap().mode, MovementMode::Direct);
    }

    #[test]
    fn medium_distance_needs_line_of_sight() {
        let mut seen = planner(None, true);
        assert!(matches!(
            seen.plan(&request(Some(200.0)), Tick(0)).unwrap(),
            MovementDecision::Move { direct: true, waypoint, .. } if waypoint == Vec2::new(200.0, 0.0)
        ));

        let mut blocked = planner(None, false);
        assert_eq!(blocked.plan(&request(Some(200.0)), Tick(0)).unwrap(), MovementDecision::Hold);
        assert_eq!(blocked.plan(&request(Some(200.0)), Tick(2)).unwrap(), MovementDecision::Hold);
        let s = blocked.store.get(EntityId(1)).unwrap();
        assert_eq!(s.mode, MovementMode::Holding);
        assert_eq!(s.since, Tick(0));
    }

    #[test]
    fn beyond_line_of_sight_threshold_holds() {
        let mut p = planner(None, true);
        assert_eq!(p.plan(&request(Some(800.0)), Tick(0)).unwrap(), MovementDecision::Hold);
    }

    #[test]
    fn far_without_path_gives_up() {
        let mut p = planner(None, true);
        assert_eq!(p.plan(&request(Some(1500.0)), Tick(0)).unwrap(), MovementDecision::GiveUp);
        assert_eq!(p.pathfinder.invalidated, vec![EntityId(1)]);
        assert_eq!(p.store.get(EntityId(1)).unwrap().mode, MovementMode::Idle);
    }

    #[test]
    fn far_with_path_still_moves() {
        let mut p = planner(Some(Vec2::new(100.0, 0.0)), false);
        assert!(p.plan(&request(Some(1500.0)), Tick(0)).unwrap().is_move());
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut p = planner(None, false);
        let req = MovementRequest { position: Vec2::new(f32::NAN, 0.0), ..request(Some(100.0)) };
        assert_eq!(p.plan(&req, Tick(0)), Err(MobilityError::NonFinite(EntityId(1))));
        let req = MovementRequest { target: Some(Vec2::new(f32::INFINITY, 0.0)), ..request(None) };
        assert_eq!(p.plan(&req, Tick(0)), Err(MobilityError::NonFinite(EntityId(1))));
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use tf_core::{EntityId, Tick, Vec2};

    use super::{planner, request};
    use crate::{MobilityStore, MovementMode, MovementState};

    #[test]
    fn since_only_moves_on_mode_change() {
        let mut s = MovementState::idle(Tick(0));
        s.enter(MovementMode::Direct, Tick(5), Some(Vec2::new(1.0, 0.0)));
        s.enter(MovementMode::Direct, Tick(7), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(s.since, Tick(5));
        assert_eq!(s.ticks_in_mode(Tick(9)), 4);
        assert_eq!(s.waypoint, Some(Vec2::new(2.0, 0.0)));
        assert!(s.is_moving());
    }

    #[test]
    fn entries_are_lazy_and_counted() {
        let mut store = MobilityStore::new();
        assert!(store.is_empty());
        store.entry(EntityId(3), Tick(0)).enter(MovementMode::Holding, Tick(0), None);
        store.entry(EntityId(1), Tick(0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.count_in(MovementMode::Holding), 1);
        assert_eq!(store.count_in(MovementMode::Idle), 1);
    }

    #[test]
    fn despawn_forgets_agent() {
        let mut p = planner(None, false);
        p.plan(&request(Some(80.0)), Tick(0)).unwrap();
        p.despawn(EntityId(1));
        assert!(p.store.get(EntityId(1)).is_none());
        assert_eq!(p.pathfinder.invalidated, vec![EntityId(1)]);
    }
}

// ── With the reference pathfinder ─────────────────────────────────────────────

#[cfg(test)]
mod direct_pathfinder {
    use tf_core::{EntityId, MovementConfig, Tick, Vec2};
    use tf_spatial::{DirectPathfinder, Obstacle, ObstacleMap, Pathfinder};

    use crate::{MovementDecision, MovementPlanner, MovementRequest};

    #[test]
    fn detours_around_wall_through_boxed_pathfinder() {
        let wall = Obstacle::new(Vec2::new(-10.0, -100.0), Vec2::new(10.0, 100.0));
        let pf: Box<dyn Pathfinder> = Box::new(DirectPathfinder::new(ObstacleMap::new(vec![wall])));
        let mut p = MovementPlanner::new(pf, MovementConfig::default());
        let req = MovementRequest {
            agent:        EntityId(1),
            position:     Vec2::new(-200.0, 0.0),
            target:       Some(Vec2::new(200.0, 0.0)),
            attack_range: 40.0,
            speed:        100.0,
            width:        10.0,
            height:       10.0,
            cadence_secs: 0.1,
            steering:     Vec2::ZERO,
        };
        match p.plan(&req, Tick(0)).unwrap() {
            MovementDecision::Move { waypoint, direct, .. } => {
                assert!(!direct);
                assert!(waypoint.y.abs() > 100.0);
            }
            other => panic!("expected detour, got {other:?}"),
        }
    }
}

//! Unit tests for tf-behavior.

use std::sync::Arc;

use tf_agent::{Agent, AgentTemplate, TargetRef};
use tf_core::{EntityId, PhysicsHandle, TargetType, Tick, Vec2};

use crate::{Candidate, CandidatePool, DecisionContext};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn template(behavior: &str, abilities: &[&str]) -> AgentTemplate {
    AgentTemplate {
        kind:                  format!("{behavior}-kind"),
        behavior:              behavior.into(),
        max_health:            100.0,
        speed:                 100.0,
        attack_range:          40.0,
        detection_range:       600.0,
        attack_damage:         10.0,
        attack_cooldown_ticks: 10,
        armor:                 0.0,
        width:                 32.0,
        height:                32.0,
        base_priority:         10.0,
        abilities:             abilities.iter().map(|s| s.to_string()).collect(),
    }
}

fn agent_at(id: u32, pos: Vec2) -> Agent {
    Agent::new(EntityId(id), PhysicsHandle(id), Arc::new(template("melee", &[])), 1, pos)
}

fn player(id: u32, x: f32, y: f32) -> Candidate {
    Candidate {
        id:              EntityId(id),
        target_type:     TargetType::Player,
        position:        Vec2::new(x, y),
        base_priority:   10.0,
        health_fraction: 1.0,
    }
}

fn ctx<'a>(
    agent:      &'a Agent,
    pool:       &'a CandidatePool,
    target:     Option<(TargetRef, Vec2)>,
) -> DecisionContext<'a> {
    DecisionContext {
        tick:            Tick(100),
        tick_secs:       0.05,
        agent,
        target:          target.map(|(t, _)| t),
        target_position: target.map(|(_, p)| p),
        candidates:      pool,
        neighbours:      &[],
    }
}

// ── Targeting ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod targeting {
    use tf_agent::TargetRef;
    use tf_core::{EntityId, TargetType, Vec2};

    use super::player;
    use crate::{Candidate, CandidatePool, TargetDecision, TargetQuery, TargetSelector, TargetStrategy};

    const CLOSEST: TargetStrategy = TargetStrategy::Closest(TargetType::Player);
    const PRIORITY: TargetStrategy = TargetStrategy::Priority(TargetType::Player);

    fn pool(cands: &[Candidate]) -> CandidatePool {
        let mut p = CandidatePool::new();
        for &c in cands {
            p.push(c);
        }
        p
    }

    fn query(strategy: TargetStrategy, max_distance: f32) -> TargetQuery {
        TargetQuery { seeker: EntityId(999), strategy, position: Vec2::ZERO, max_distance }
    }

    #[test]
    fn closest_within_max_distance() {
        let p = pool(&[player(3, 300.0, 0.0), player(1, 50.0, 0.0), player(2, 0.0, 120.0)]);
        let t = TargetSelector::default().find_target(CLOSEST, Vec2::ZERO, 200.0, &p).unwrap();
        assert_eq!(t.id, EntityId(1));
        assert_eq!(t.target_type, TargetType::Player);
    }

    #[test]
    fn nothing_in_range() {
        let p = pool(&[player(1, 250.0, 0.0)]);
        assert!(TargetSelector::default().find_target(CLOSEST, Vec2::ZERO, 200.0, &p).is_none());
        assert!(TargetSelector::default().find_target(CLOSEST, Vec2::ZERO, 200.0, &CandidatePool::new()).is_none());
    }

    #[test]
    fn max_distance_is_inclusive() {
        let p = pool(&[player(1, 200.0, 0.0)]);
        assert!(TargetSelector::default().find_target(CLOSEST, Vec2::ZERO, 200.0, &p).is_some());
    }

    #[test]
    fn exact_ties_go_to_lowest_id() {
        let p = pool(&[player(9, 50.0, 0.0), player(4, -50.0, 0.0), player(6, 0.0, 50.0)]);
        let t = TargetSelector::default().find_target(CLOSEST, Vec2::ZERO, 200.0, &p).unwrap();
        assert_eq!(t.id, EntityId(4));

        let t = TargetSelector::default().find_target(PRIORITY, Vec2::ZERO, 200.0, &p).unwrap();
        assert_eq!(t.id, EntityId(4));
    }

    #[test]
    fn priority_prefers_wounded_targets() {
        let healthy = Candidate { base_priority: 20.0, ..player(1, 10.0, 0.0) };
        let wounded = Candidate { base_priority: 10.0, health_fraction: 0.2, ..player(2, 150.0, 0.0) };
        let p = pool(&[healthy, wounded]);
        // 10 + 0.8 * 50 = 50 beats 20.
        let t = TargetSelector::default().find_target(PRIORITY, Vec2::ZERO, 200.0, &p).unwrap();
        assert_eq!(t.id, EntityId(2));
        assert!((t.priority - 50.0).abs() < 1e-4);
    }

    #[test]
    fn typed_strategies_ignore_other_types_any_variants_do_not() {
        let tower = Candidate { target_type: TargetType::Structure, ..player(5, 10.0, 0.0) };
        let p = pool(&[player(1, 100.0, 0.0), tower]);
        let sel = TargetSelector::default();

        assert_eq!(sel.find_target(CLOSEST, Vec2::ZERO, 200.0, &p).unwrap().id, EntityId(1));
        let any = sel.find_target(TargetStrategy::ClosestAny, Vec2::ZERO, 200.0, &p).unwrap();
        assert_eq!(any.id, EntityId(5));
        assert_eq!(any.target_type, TargetType::Structure);
    }

    #[test]
    fn seeker_never_targets_itself() {
        let me = Candidate { target_type: TargetType::Agent, ..player(999, 0.0, 0.0) };
        let other = Candidate { target_type: TargetType::Agent, ..player(7, 60.0, 0.0) };
        let p = pool(&[me, other]);
        let d = TargetSelector::default().decide_target(&query(TargetStrategy::ClosestAny, 200.0), None, &p);
        assert!(matches!(d, TargetDecision::Adopt(t) if t.id == EntityId(7)));
    }

    #[test]
    fn no_current_target_adopts_any_qualifier() {
        let sel = TargetSelector::default();
        let p = pool(&[player(1, 150.0, 0.0)]);
        assert!(matches!(sel.decide_target(&query(CLOSEST, 200.0), None, &p), TargetDecision::Adopt(_)));
        assert_eq!(sel.decide_target(&query(CLOSEST, 200.0), None, &CandidatePool::new()), TargetDecision::Keep);
    }

    #[test]
    fn distance_hysteresis_band() {
        let sel = TargetSelector::default();
        let current = TargetRef::new(EntityId(1), TargetType::Player, 10.0);
        let cur = Some((&current, Some(Vec2::new(100.0, 0.0))));

        let near_equal = pool(&[player(1, 100.0, 0.0), player(2, 81.0, 0.0)]);
        assert_eq!(sel.decide_target(&query(CLOSEST, 500.0), cur, &near_equal), TargetDecision::Keep);

        let clearly_closer = pool(&[player(1, 100.0, 0.0), player(2, 79.0, 0.0)]);
        match sel.decide_target(&query(CLOSEST, 500.0), cur, &clearly_closer) {
            TargetDecision::Switch(t) => assert_eq!(t.id, EntityId(2)),
            other => panic!("expected switch, got {other:?}"),
        }

        // Exactly 0.8 of the current distance is enough.
        let at_boundary = pool(&[player(1, 100.0, 0.0), player(2, 80.0, 0.0)]);
        assert!(matches!(
            sel.decide_target(&query(CLOSEST, 500.0), cur, &at_boundary),
            TargetDecision::Switch(t) if t.id == EntityId(2)
        ));
    }

    #[test]
    fn priority_hysteresis_band() {
        let sel = TargetSelector::default();
        let current = TargetRef::new(EntityId(1), TargetType::Player, 10.0);
        let cur = Some((&current, Some(Vec2::new(50.0, 0.0))));

        let slightly_better = pool(&[player(1, 50.0, 0.0), Candidate { base_priority: 11.9, ..player(2, 60.0, 0.0) }]);
        assert_eq!(sel.decide_target(&query(PRIORITY, 500.0), cur, &slightly_better), TargetDecision::Keep);

        let much_better = pool(&[player(1, 50.0, 0.0), Candidate { base_priority: 12.5, ..player(2, 60.0, 0.0) }]);
        assert!(matches!(
            sel.decide_target(&query(PRIORITY, 500.0), cur, &much_better),
            TargetDecision::Switch(t) if t.id == EntityId(2)
        ));

        // Exactly 1.2 times the current priority is enough.
        let at_boundary = pool(&[player(1, 50.0, 0.0), Candidate { base_priority: 12.0, ..player(2, 60.0, 0.0) }]);
        assert!(matches!(
            sel.decide_target(&query(PRIORITY, 500.0), cur, &at_boundary),
            TargetDecision::Switch(t) if t.id == EntityId(2)
        ));
    }

    #[test]
    fn adoption_tie_goes_to_lowest_id() {
        let sel = TargetSelector::default();
        let p = pool(&[player(8, 0.0, 70.0), player(3, 70.0, 0.0)]);
        assert!(matches!(
            sel.decide_target(&query(CLOSEST, 500.0), None, &p),
            TargetDecision::Adopt(t) if t.id == EntityId(3)
        ));

        // Lost current target: replacement tie also resolves to the lowest id.
        let current = TargetRef::new(EntityId(1), TargetType::Player, 10.0);
        let gone = Some((&current, None));
        assert!(matches!(
            sel.decide_target(&query(CLOSEST, 500.0), gone, &p),
            TargetDecision::Switch(t) if t.id == EntityId(3)
        ));
    }

    #[test]
    fn current_priority_is_read_live_from_pool() {
        // Current target has been wounded since it was chosen: 10 + 0.9 * 50 = 55.
        let sel = TargetSelector::default();
        let current = TargetRef::new(EntityId(1), TargetType::Player, 10.0);
        let cur = Some((&current, Some(Vec2::new(50.0, 0.0))));
        let p = pool(&[
            Candidate { health_fraction: 0.1, ..player(1, 50.0, 0.0) },
            Candidate { base_priority: 30.0, ..player(2, 60.0, 0.0) },
        ]);
        assert_eq!(sel.decide_target(&query(PRIORITY, 500.0), cur, &p), TargetDecision::Keep);
    }

    #[test]
    fn lost_target_switches_or_clears() {
        let sel = TargetSelector::default();
        let current = TargetRef::new(EntityId(1), TargetType::Player, 10.0);

        // Gone entirely, nothing else around.
        let gone = Some((&current, None));
        assert_eq!(sel.decide_target(&query(CLOSEST, 200.0), gone, &CandidatePool::new()), TargetDecision::Clear);

        // Walked out of detection range; a worse-by-hysteresis candidate is still taken.
        let far = Some((&current, Some(Vec2::new(500.0, 0.0))));
        let p = pool(&[player(1, 500.0, 0.0), player(2, 190.0, 0.0)]);
        assert!(matches!(
            sel.decide_target(&query(CLOSEST, 200.0), far, &p),
            TargetDecision::Switch(t) if t.id == EntityId(2)
        ));
        assert_eq!(sel.decide_target(&query(CLOSEST, 200.0), far, &pool(&[player(1, 500.0, 0.0)])), TargetDecision::Clear);
    }

    #[test]
    fn current_without_challenger_is_kept() {
        let sel = TargetSelector::default();
        let current = TargetRef::new(EntityId(1), TargetType::Player, 10.0);
        let cur = Some((&current, Some(Vec2::new(100.0, 0.0))));
        let p = pool(&[player(1, 100.0, 0.0)]);
        assert_eq!(sel.decide_target(&query(CLOSEST, 200.0), cur, &p), TargetDecision::Keep);
    }

    #[test]
    fn pool_grouping() {
        let mut p = pool(&[player(1, 0.0, 0.0), Candidate { target_type: TargetType::Agent, ..player(2, 0.0, 0.0) }]);
        assert_eq!(p.len(), 2);
        assert_eq!(p.of_type(TargetType::Player).len(), 1);
        assert!(p.get(EntityId(2), TargetType::Agent).is_some());
        assert!(p.get(EntityId(2), TargetType::Player).is_none());
        p.clear();
        assert!(p.is_empty());
    }
}

// ── Steering ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod steering {
    use std::cell::Cell;
    use std::rc::Rc;

    use tf_core::{AgentRng, EntityId, Vec2};

    use crate::{
        Separation, SteeringBehavior, SteeringComposer, SteeringForce, SteeringInput, Wander,
    };

    struct Constant(Vec2, &'static str);

    impl SteeringForce for Constant {
        fn name(&self) -> &'static str {
            self.1
        }
        fn compute(&mut self, _: &SteeringInput<'_>, _: &mut AgentRng) -> Vec2 {
            self.0
        }
    }

    struct Counting(Rc<Cell<u32>>);

    impl SteeringForce for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn compute(&mut self, input: &SteeringInput<'_>, _: &mut AgentRng) -> Vec2 {
            self.0.set(self.0.get() + 1);
            Vec2::new(input.now_ms as f32, 0.0)
        }
    }

    fn input(neighbours: &[(EntityId, Vec2)], now_ms: u64) -> SteeringInput<'_> {
        SteeringInput {
            agent: EntityId(1),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            neighbours,
            target: None,
            now_ms,
        }
    }

    fn rng() -> AgentRng {
        AgentRng::new(7, EntityId(1))
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn no_enabled_behaviors_is_zero() {
        let mut empty = SteeringComposer::new();
        assert_eq!(empty.calculate(&input(&[], 0), &mut rng()), Vec2::ZERO);

        let mut disabled = SteeringComposer::new().with(SteeringBehavior::new(Constant(Vec2::new(5.0, 0.0), "c"), 1.0));
        assert!(disabled.set_enabled("c", false));
        assert_eq!(disabled.calculate(&input(&[], 0), &mut rng()), Vec2::ZERO);
    }

    #[test]
    fn zero_total_weight_is_zero() {
        let mut c = SteeringComposer::new().with(SteeringBehavior::new(Constant(Vec2::new(5.0, 0.0), "c"), 0.0));
        assert_eq!(c.calculate(&input(&[], 0), &mut rng()), Vec2::ZERO);
    }

    #[test]
    fn output_is_weighted_average() {
        let mut c = SteeringComposer::new()
            .with(SteeringBehavior::new(Constant(Vec2::new(4.0, 0.0), "a"), 1.0))
            .with(SteeringBehavior::new(Constant(Vec2::new(0.0, 4.0), "b"), 3.0));
        assert!(close(c.calculate(&input(&[], 0), &mut rng()), Vec2::new(1.0, 3.0)));
    }

    #[test]
    fn separation_pushes_away_from_neighbour() {
        let mut sep = Separation { radius: 50.0, strength: 5.0, max_force: 100.0 };
        let ns = [(EntityId(2), Vec2::new(10.0, 0.0))];
        let v = sep.compute(&input(&ns, 0), &mut rng());
        assert!(close(v, Vec2::new(-5.0, 0.0)), "{v}");
    }

    #[test]
    fn separation_ignores_self_coincident_and_distant() {
        let mut sep = Separation { radius: 50.0, strength: 5.0, max_force: 100.0 };
        let ns = [
            (EntityId(1), Vec2::new(1.0, 1.0)),
            (EntityId(2), Vec2::ZERO),
            (EntityId(3), Vec2::new(80.0, 0.0)),
        ];
        assert_eq!(sep.compute(&input(&ns, 0), &mut rng()), Vec2::ZERO);
    }

    #[test]
    fn separation_is_capped_at_max_force() {
        let mut sep = Separation { radius: 50.0, strength: 10.0, max_force: 3.0 };
        let ns = [(EntityId(2), Vec2::new(0.0, 5.0)), (EntityId(3), Vec2::new(5.0, 0.0))];
        let v = sep.compute(&input(&ns, 0), &mut rng());
        assert!((v.length() - 3.0).abs() < 1e-4);
        assert!(v.x < 0.0 && v.y < 0.0);
    }

    #[test]
    fn throttled_behavior_reuses_cached_result() {
        let calls = Rc::new(Cell::new(0));
        let mut c = SteeringComposer::new()
            .with(SteeringBehavior::new(Counting(Rc::clone(&calls)), 1.0).throttled(100));
        let mut r = rng();

        assert_eq!(c.calculate(&input(&[], 0), &mut r), Vec2::new(0.0, 0.0));
        assert_eq!(c.calculate(&input(&[], 50), &mut r), Vec2::new(0.0, 0.0));
        assert_eq!(calls.get(), 1);
        assert_eq!(c.calculate(&input(&[], 100), &mut r), Vec2::new(100.0, 0.0));
        assert_eq!(calls.get(), 2);
        assert_eq!(c.get("counting").unwrap().last_update(), Some(100));
    }

    #[test]
    fn neighbour_radius_tracks_enabled_behaviors() {
        let mut c = SteeringComposer::new()
            .with(SteeringBehavior::new(Separation { radius: 48.0, strength: 1.0, max_force: 1.0 }, 1.0))
            .with(SteeringBehavior::new(Wander::new(0.5, 1.0), 1.0));
        assert_eq!(c.neighbour_radius(), 48.0);
        c.set_enabled("separation", false);
        assert_eq!(c.neighbour_radius(), 0.0);
        assert!(!c.set_enabled("missing", true));
    }

    #[test]
    fn wander_replays_with_same_seed() {
        let run = || {
            let mut w = Wander::new(0.5, 10.0);
            let mut r = rng();
            (0..5).map(|t| w.compute(&input(&[], t), &mut r)).collect::<Vec<_>>()
        };
        let a = run();
        assert_eq!(a, run());
        assert!(a.iter().all(|v| (v.length() - 10.0).abs() < 1e-3));
    }
}

// ── Abilities ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod abilities {
    use tf_agent::TargetRef;
    use tf_core::{AgentRng, EntityId, TargetType, Tick, Vec2};

    use super::{agent_at, ctx, player};
    use crate::{Ability, Candidate, CandidatePool, Charge, Cooldowns, Intent, SelfHeal, Shockwave};

    fn rng() -> AgentRng {
        AgentRng::new(1, EntityId(1))
    }

    #[test]
    fn cooldown_slots() {
        let mut cd = Cooldowns::new();
        assert!(cd.is_ready(Cooldowns::ATTACK, Tick(0)));
        assert!(cd.is_ready(Cooldowns::ability_slot(3), Tick(0)));

        cd.trigger(Cooldowns::ability_slot(1), Tick(10), 5);
        assert!(!cd.is_ready(Cooldowns::ability_slot(1), Tick(14)));
        assert_eq!(cd.remaining(Cooldowns::ability_slot(1), Tick(12)), 3);
        assert!(cd.is_ready(Cooldowns::ability_slot(1), Tick(15)));
        assert!(cd.is_ready(Cooldowns::ATTACK, Tick(11)));
    }

    #[test]
    fn self_heal_below_threshold() {
        let pool = CandidatePool::new();
        let mut a = agent_at(1, Vec2::ZERO);
        let heal = SelfHeal { fraction: 0.25, ..SelfHeal::default() };
        assert!(!heal.can_use(&ctx(&a, &pool, None)));

        a.set_health(40.0);
        let c = ctx(&a, &pool, None);
        assert!(heal.can_use(&c));
        assert_eq!(heal.execute(&c, &mut rng()).unwrap(), vec![Intent::Heal(25.0)]);
    }

    #[test]
    fn charge_window_and_missing_target() {
        let pool = CandidatePool::new();
        let a = agent_at(1, Vec2::ZERO);
        let charge = Charge::default();
        let t = TargetRef::new(EntityId(9), TargetType::Player, 10.0);

        assert!(!charge.can_use(&ctx(&a, &pool, Some((t, Vec2::new(50.0, 0.0))))));
        assert!(!charge.can_use(&ctx(&a, &pool, Some((t, Vec2::new(900.0, 0.0))))));

        let c = ctx(&a, &pool, Some((t, Vec2::new(200.0, 0.0))));
        assert!(charge.can_use(&c));
        let intents = charge.execute(&c, &mut rng()).unwrap();
        assert_eq!(intents, vec![Intent::InvalidatePath, Intent::ApplyImpulse(Vec2::new(200.0, 0.0))]);

        assert!(charge.execute(&ctx(&a, &pool, None), &mut rng()).is_err());
    }

    #[test]
    fn shockwave_hits_players_in_radius_only() {
        let mut pool = CandidatePool::new();
        pool.push(player(2, 30.0, 0.0));
        pool.push(player(3, 0.0, -90.0));
        pool.push(player(4, 200.0, 0.0));
        pool.push(Candidate { target_type: TargetType::Structure, ..player(5, 10.0, 0.0) });

        let a = agent_at(1, Vec2::ZERO);
        let sw = Shockwave::default();
        let c = ctx(&a, &pool, None);
        assert!(sw.can_use(&c));
        let hit: Vec<EntityId> = sw
            .execute(&c, &mut rng())
            .unwrap()
            .into_iter()
            .map(|i| match i {
                Intent::Attack { target, damage, .. } => {
                    assert_eq!(damage, 15.0);
                    target
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(hit, vec![EntityId(2), EntityId(3)]);

        assert!(!sw.can_use(&ctx(&a, &CandidatePool::new(), None)));
    }
}

// ── AI behaviors ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod ai {
    use tf_agent::{AnimationState, TargetRef};
    use tf_core::{EntityId, TargetType, Vec2};

    use super::{agent_at, ctx};
    use crate::{Activity, AiBehavior, CandidatePool, Intent, MeleeAi, RangedAi, SwarmAi, TargetStrategy};

    #[test]
    fn default_attack_targets_current() {
        let pool = CandidatePool::new();
        let a = agent_at(1, Vec2::ZERO);
        let t = TargetRef::new(EntityId(4), TargetType::Structure, 0.0);
        let intents = MeleeAi.attack(&ctx(&a, &pool, Some((t, Vec2::new(10.0, 0.0)))));
        assert_eq!(
            intents,
            vec![Intent::Attack { target: EntityId(4), target_type: TargetType::Structure, damage: 10.0 }]
        );
        assert!(MeleeAi.attack(&ctx(&a, &pool, None)).is_empty());
    }

    #[test]
    fn animation_mapping() {
        let moving = Activity { moving: true, ..Activity::default() };
        let attacking = Activity { moving: true, attacked: true, cast: false };
        assert_eq!(MeleeAi.animation(Activity::default()), AnimationState::Idle);
        assert_eq!(MeleeAi.animation(moving), AnimationState::Moving);
        assert_eq!(MeleeAi.animation(attacking), AnimationState::Attacking);
        assert_eq!(RangedAi.animation(attacking), AnimationState::Casting);
    }

    #[test]
    fn builtin_strategies_and_steering() {
        assert_eq!(MeleeAi.strategy(), TargetStrategy::Closest(TargetType::Player));
        assert_eq!(RangedAi.strategy(), TargetStrategy::PriorityAny);
        assert_eq!(SwarmAi.strategy(), TargetStrategy::ClosestAny);
        assert_eq!(SwarmAi.steering().len(), 3);
        assert!(MeleeAi.steering().neighbour_radius() > 0.0);
    }
}

// ── Kind registry ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod kinds {
    use std::sync::Arc;

    use tf_agent::TemplateSet;

    use super::template;
    use crate::{BehaviorError, KindRegistryBuilder, SwarmAi};

    #[test]
    fn builtins_resolve_templates() {
        let mut set = TemplateSet::new();
        set.insert(template("melee", &["charge", "shockwave"]));
        set.insert(template("ranged", &["self_heal"]));

        let reg = KindRegistryBuilder::with_builtins().build(&set).unwrap();
        assert_eq!(reg.len(), 2);
        let brute = reg.require("melee-kind").unwrap();
        assert_eq!(brute.ai.name(), "melee");
        let names: Vec<&str> = brute.abilities.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["charge", "shockwave"]);
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["melee-kind", "ranged-kind"]);
    }

    #[test]
    fn unknown_behavior_fails_build() {
        let mut set = TemplateSet::new();
        set.insert(template("sniper", &[]));
        let err = KindRegistryBuilder::with_builtins().build(&set).unwrap_err();
        assert_eq!(
            err,
            BehaviorError::MissingBehavior { kind: "sniper-kind".into(), behavior: "sniper".into() }
        );
    }

    #[test]
    fn unknown_ability_fails_build() {
        let mut set = TemplateSet::new();
        set.insert(template("melee", &["teleport"]));
        let err = KindRegistryBuilder::with_builtins().build(&set).unwrap_err();
        assert!(matches!(err, BehaviorError::MissingAbility { ability, .. } if ability == "teleport"));
    }

    #[test]
    fn custom_factories_and_missing_kind() {
        let mut set = TemplateSet::new();
        set.insert(template("pack", &[]));
        let reg = KindRegistryBuilder::new().behavior("pack", |_| Arc::new(SwarmAi)).build(&set).unwrap();
        assert_eq!(reg.require("pack-kind").unwrap().ai.name(), "swarm");
        assert_eq!(reg.require("ghost").unwrap_err(), BehaviorError::MissingKind("ghost".into()));
        assert!(reg.get("ghost").is_none());
    }
}

//! `TargetSelector`: pure target resolution plus switch hysteresis.
//!
//! # Strategies
//!
//! | Strategy            | Pool              | Best candidate                          |
//! |---------------------|-------------------|-----------------------------------------|
//! | `Closest(t)`        | type `t`          | minimum distance                        |
//! | `Priority(t)`       | type `t`          | maximum `base + (1 - health) * bonus`   |
//! | `ClosestAny`        | every type        | minimum distance                        |
//! | `PriorityAny`       | every type        | maximum effective priority              |
//!
//! Only candidates within `max_distance` (inclusive) qualify.  Exact ties go
//! to the lowest `EntityId`, independent of pool order.
//!
//! # Hysteresis
//!
//! [`TargetSelector::decide_target`] keeps the current target unless a candidate is
//! clearly better: at most `distance_switch_ratio` (0.8) of the current
//! distance for distance strategies, or at least `priority_switch_ratio`
//! (1.2) times the current priority for priority strategies.  A current
//! target that is gone or outside `max_distance` counts as lost.

use std::cmp::Ordering;

use tf_agent::TargetRef;
use tf_core::{EntityId, TargetType, TargetingConfig, Vec2};

// ── Strategy ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TargetStrategy {
    Closest(TargetType),
    Priority(TargetType),
    ClosestAny,
    PriorityAny,
}

impl TargetStrategy {
    #[inline]
    pub fn is_distance_based(self) -> bool {
        matches!(self, TargetStrategy::Closest(_) | TargetStrategy::ClosestAny)
    }

    /// Whether candidates of type `t` are considered.
    #[inline]
    pub fn accepts(self, t: TargetType) -> bool {
        match self {
            TargetStrategy::Closest(want) | TargetStrategy::Priority(want) => want == t,
            TargetStrategy::ClosestAny | TargetStrategy::PriorityAny => true,
        }
    }
}

// ── Candidates ────────────────────────────────────────────────────────────────

/// One targetable object as seen this tick.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Candidate {
    pub id:              EntityId,
    pub target_type:     TargetType,
    pub position:        Vec2,
    pub base_priority:   f32,
    /// `health / max_health` in `[0, 1]`.
    pub health_fraction: f32,
}

impl Candidate {
    /// `base_priority + (1 - health_fraction) * health_bonus`.  Wounded
    /// targets are more attractive.
    #[inline]
    pub fn effective_priority(&self, health_bonus: f32) -> f32 {
        self.base_priority + (1.0 - self.health_fraction.clamp(0.0, 1.0)) * health_bonus
    }
}

/// Candidates grouped by target type.  Rebuilt once per tick.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    by_type: [Vec<Candidate>; 3],
}

#[inline]
fn slot(t: TargetType) -> usize {
    match t {
        TargetType::Player    => 0,
        TargetType::Structure => 1,
        TargetType::Agent     => 2,
    }
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.by_type[slot(candidate.target_type)].push(candidate);
    }

    /// Empty every group, keeping allocations.
    pub fn clear(&mut self) {
        for v in &mut self.by_type {
            v.clear();
        }
    }

    pub fn of_type(&self, t: TargetType) -> &[Candidate] {
        &self.by_type[slot(t)]
    }

    /// Candidates accepted by `strategy`.
    pub fn for_strategy(&self, strategy: TargetStrategy) -> impl Iterator<Item = &Candidate> {
        TargetType::ALL
            .into_iter()
            .filter(move |&t| strategy.accepts(t))
            .flat_map(move |t| self.by_type[slot(t)].iter())
    }

    pub fn get(&self, id: EntityId, t: TargetType) -> Option<&Candidate> {
        self.by_type[slot(t)].iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.by_type.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.iter().all(Vec::is_empty)
    }
}

// ── Decisions ─────────────────────────────────────────────────────────────────

/// What the targeting phase wants done with the agent's target.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum TargetDecision {
    /// Leave the current target (or lack of one) as is.
    Keep,
    /// No target before; take this one.
    Adopt(TargetRef),
    /// Replace the current target.
    Switch(TargetRef),
    /// Current target lost and nothing qualifies.
    Clear,
}

/// Who is looking, from where, and how.
#[derive(Copy, Clone, Debug)]
pub struct TargetQuery {
    /// Never selected as its own target.
    pub seeker:       EntityId,
    pub strategy:     TargetStrategy,
    pub position:     Vec2,
    pub max_distance: f32,
}

// ── Selector ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct TargetSelector {
    distance_switch_ratio: f32,
    priority_switch_ratio: f32,
    health_bonus:          f32,
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(&TargetingConfig::default())
    }
}

impl TargetSelector {
    pub fn new(cfg: &TargetingConfig) -> Self {
        Self {
            distance_switch_ratio: cfg.distance_switch_ratio,
            priority_switch_ratio: cfg.priority_switch_ratio,
            health_bonus:          cfg.health_priority_bonus,
        }
    }

    /// Best qualifying candidate, or `None`.
    pub fn find_target(
        &self,
        strategy:     TargetStrategy,
        position:     Vec2,
        max_distance: f32,
        pool:         &CandidatePool,
    ) -> Option<TargetRef> {
        self.best(strategy, position, max_distance, pool, &[])
            .map(|(c, _)| self.to_ref(c))
    }

    /// Like [`find_target`](Self::find_target) but never returns an id in
    /// `exclude`.
    pub fn find_target_excluding(
        &self,
        strategy:     TargetStrategy,
        position:     Vec2,
        max_distance: f32,
        pool:         &CandidatePool,
        exclude:      &[EntityId],
    ) -> Option<TargetRef> {
        self.best(strategy, position, max_distance, pool, exclude)
            .map(|(c, _)| self.to_ref(c))
    }

    /// Apply the switching rules.
    ///
    /// `current` is the agent's target with its live position (`None` when
    /// the target no longer exists).
    pub fn decide_target(
        &self,
        query:   &TargetQuery,
        current: Option<(&TargetRef, Option<Vec2>)>,
        pool:    &CandidatePool,
    ) -> TargetDecision {
        let Some((cur, cur_pos)) = current else {
            return match self.find_target_excluding(
                query.strategy, query.position, query.max_distance, pool, &[query.seeker],
            ) {
                Some(t) => TargetDecision::Adopt(t),
                None => TargetDecision::Keep,
            };
        };

        let exclude = [query.seeker, cur.id];
        let best = self.best(query.strategy, query.position, query.max_distance, pool, &exclude);

        let cur_distance = cur_pos.map(|p| query.position.distance(p));
        let lost = match cur_distance {
            None => true,
            Some(d) => d > query.max_distance,
        };
        if lost {
            return match best {
                Some((c, _)) => TargetDecision::Switch(self.to_ref(c)),
                None => TargetDecision::Clear,
            };
        }

        let Some((cand, cand_distance)) = best else {
            return TargetDecision::Keep;
        };

        let better = if query.strategy.is_distance_based() {
            let cur_d = cur_distance.unwrap_or(f32::INFINITY);
            cand_distance <= cur_d * self.distance_switch_ratio
        } else {
            let cur_priority = pool
                .get(cur.id, cur.target_type)
                .map(|c| c.effective_priority(self.health_bonus))
                .unwrap_or(cur.priority);
            cand.effective_priority(self.health_bonus) >= cur_priority * self.priority_switch_ratio
        };

        if better {
            TargetDecision::Switch(self.to_ref(cand))
        } else {
            TargetDecision::Keep
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn to_ref(&self, c: &Candidate) -> TargetRef {
        TargetRef::new(c.id, c.target_type, c.effective_priority(self.health_bonus))
    }

    /// Best candidate and its distance.
    fn best<'p>(
        &self,
        strategy:     TargetStrategy,
        position:     Vec2,
        max_distance: f32,
        pool:         &'p CandidatePool,
        exclude:      &[EntityId],
    ) -> Option<(&'p Candidate, f32)> {
        let bonus = self.health_bonus;
        let by_distance = strategy.is_distance_based();
        pool.for_strategy(strategy)
            .filter(|c| !exclude.contains(&c.id))
            .map(|c| (c, position.distance(c.position)))
            .filter(|&(_, d)| d.is_finite() && d <= max_distance)
            .min_by(|(a, da), (b, db)| {
                let primary = if by_distance {
                    da.total_cmp(db)
                } else {
                    // Higher priority sorts first.
                    b.effective_priority(bonus).total_cmp(&a.effective_priority(bonus))
                };
                primary.then_with(|| a.id.cmp(&b.id)).then(Ordering::Equal)
            })
    }
}

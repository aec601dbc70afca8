//! Weighted steering composition.
//!
//! A [`SteeringComposer`] owns an ordered list of [`SteeringBehavior`] slots.
//! Each slot wraps one [`SteeringForce`] with its weight, an enabled flag and
//! a throttle window: the force is only recomputed once `update_interval_ms`
//! has elapsed since its last sample, otherwise the cached vector is reused.
//!
//! The composed output is the weighted *average* of the enabled forces, so
//! adding behaviors never inflates the magnitude beyond the largest single
//! contribution.

use std::fmt;

use tf_core::{AgentRng, EntityId, Vec2};

/// Everything a steering force may look at for one agent.
#[derive(Copy, Clone, Debug)]
pub struct SteeringInput<'a> {
    pub agent:      EntityId,
    pub position:   Vec2,
    pub velocity:   Vec2,
    /// Nearby agents; may include `agent` itself.
    pub neighbours: &'a [(EntityId, Vec2)],
    /// Live position of the current target, if any.
    pub target:     Option<Vec2>,
    /// Simulation time in milliseconds.
    pub now_ms:     u64,
}

/// One source of movement influence.
pub trait SteeringForce {
    fn name(&self) -> &'static str;

    fn compute(&mut self, input: &SteeringInput<'_>, rng: &mut AgentRng) -> Vec2;

    /// Neighbour query radius this force needs.  `0.0` means none.
    fn radius(&self) -> f32 {
        0.0
    }
}

// ── Slot ──────────────────────────────────────────────────────────────────────

pub struct SteeringBehavior {
    pub enabled:        bool,
    pub weight:         f32,
    update_interval_ms: u64,
    last_update:        Option<u64>,
    cached:             Vec2,
    force:              Box<dyn SteeringForce>,
}

impl SteeringBehavior {
    /// Enabled, recomputed on every call.
    pub fn new(force: impl SteeringForce + 'static, weight: f32) -> Self {
        Self {
            enabled:            true,
            weight,
            update_interval_ms: 0,
            last_update:        None,
            cached:             Vec2::ZERO,
            force:              Box::new(force),
        }
    }

    /// Reuse the cached result until `interval_ms` has elapsed.
    pub fn throttled(mut self, interval_ms: u64) -> Self {
        self.update_interval_ms = interval_ms;
        self
    }

    pub fn name(&self) -> &'static str {
        self.force.name()
    }

    pub fn radius(&self) -> f32 {
        self.force.radius()
    }

    /// Last computed contribution (unweighted).
    pub fn cached(&self) -> Vec2 {
        self.cached
    }

    pub fn last_update(&self) -> Option<u64> {
        self.last_update
    }

    fn sample(&mut self, input: &SteeringInput<'_>, rng: &mut AgentRng) -> Vec2 {
        let fresh = match self.last_update {
            Some(last) => input.now_ms.saturating_sub(last) < self.update_interval_ms,
            None => false,
        };
        if !fresh {
            let v = self.force.compute(input, rng);
            self.cached = if v.is_finite() { v } else { Vec2::ZERO };
            self.last_update = Some(input.now_ms);
        }
        self.cached
    }
}

impl fmt::Debug for SteeringBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteeringBehavior")
            .field("name", &self.name())
            .field("enabled", &self.enabled)
            .field("weight", &self.weight)
            .field("update_interval_ms", &self.update_interval_ms)
            .field("cached", &self.cached)
            .finish()
    }
}

// ── Composer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SteeringComposer {
    behaviors: Vec<SteeringBehavior>,
}

impl SteeringComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, behavior: SteeringBehavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn add(&mut self, behavior: SteeringBehavior) {
        self.behaviors.push(behavior);
    }

    pub fn get(&self, name: &str) -> Option<&SteeringBehavior> {
        self.behaviors.iter().find(|b| b.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SteeringBehavior> {
        self.behaviors.iter_mut().find(|b| b.name() == name)
    }

    /// Returns `false` if no behavior has that name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.get_mut(name) {
            Some(b) => {
                b.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Largest neighbour radius among enabled behaviors.
    pub fn neighbour_radius(&self) -> f32 {
        self.behaviors
            .iter()
            .filter(|b| b.enabled)
            .map(SteeringBehavior::radius)
            .fold(0.0, f32::max)
    }

    /// Weighted average of every enabled contribution.  Zero when nothing is
    /// enabled or the enabled weights sum to zero or less.
    pub fn calculate(&mut self, input: &SteeringInput<'_>, rng: &mut AgentRng) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut total_weight = 0.0_f32;
        for b in self.behaviors.iter_mut().filter(|b| b.enabled) {
            let v = b.sample(input, rng);
            sum += v * b.weight;
            total_weight += b.weight;
        }
        if total_weight <= 0.0 {
            return Vec2::ZERO;
        }
        sum / total_weight
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

// ── Built-in forces ───────────────────────────────────────────────────────────

/// Push away from neighbours inside `radius`, closer ones harder.
#[derive(Copy, Clone, Debug)]
pub struct Separation {
    pub radius:    f32,
    pub strength:  f32,
    pub max_force: f32,
}

impl SteeringForce for Separation {
    fn name(&self) -> &'static str {
        "separation"
    }

    fn compute(&mut self, input: &SteeringInput<'_>, _rng: &mut AgentRng) -> Vec2 {
        if self.radius <= 0.0 {
            return Vec2::ZERO;
        }
        let mut push = Vec2::ZERO;
        let mut count = 0u32;
        for &(id, pos) in input.neighbours {
            if id == input.agent {
                continue;
            }
            let away = input.position - pos;
            let d = away.length();
            // Coincident neighbours have no direction to push along.
            if d <= 0.0 || d >= self.radius {
                continue;
            }
            push += (away / d) * ((self.radius - d) / self.radius);
            count += 1;
        }
        if count == 0 {
            return Vec2::ZERO;
        }
        let average = push / count as f32;
        (average.normalized() * self.strength).clamp_length(self.max_force)
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Head straight for the target.
#[derive(Copy, Clone, Debug)]
pub struct Seek {
    pub strength: f32,
}

impl SteeringForce for Seek {
    fn name(&self) -> &'static str {
        "seek"
    }

    fn compute(&mut self, input: &SteeringInput<'_>, _rng: &mut AgentRng) -> Vec2 {
        match input.target {
            Some(t) => (t - input.position).normalized() * self.strength,
            None => Vec2::ZERO,
        }
    }
}

/// Random heading drift.  `jitter` is the largest heading change per sample,
/// in radians.
#[derive(Copy, Clone, Debug)]
pub struct Wander {
    pub jitter:   f32,
    pub strength: f32,
    heading:      f32,
}

impl Wander {
    pub fn new(jitter: f32, strength: f32) -> Self {
        Self { jitter: jitter.abs(), strength, heading: 0.0 }
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }
}

impl SteeringForce for Wander {
    fn name(&self) -> &'static str {
        "wander"
    }

    fn compute(&mut self, _input: &SteeringInput<'_>, rng: &mut AgentRng) -> Vec2 {
        self.heading += rng.jitter(self.jitter);
        Vec2::from_angle(self.heading) * self.strength
    }
}

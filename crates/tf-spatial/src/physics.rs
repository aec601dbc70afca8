//! Physics capability trait and a kinematic reference world.
//!
//! The decision pipeline only ever talks to [`PhysicsWorld`]; a real rigid
//! body engine plugs in by implementing it.  [`KinematicWorld`] is enough to
//! run the core without one: point bodies with mass, linear damping, an
//! optional speed cap, and explicit Euler integration.  No collision
//! response.
//!
//! Bodies are stepped in ascending handle order so runs are reproducible.

use std::collections::BTreeMap;

use tf_core::{PhysicsHandle, Vec2};
use tracing::debug;

use crate::{SpatialError, SpatialResult};

/// Parameters for a new body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyDesc {
    pub position:       Vec2,
    pub mass:           f32,
    /// Fraction of velocity lost per second (`0` = frictionless).
    pub linear_damping: f32,
    pub max_speed:      Option<f32>,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            position:       Vec2::ZERO,
            mass:           1.0,
            linear_damping: 4.0,
            max_speed:      None,
        }
    }
}

impl BodyDesc {
    pub fn at(position: Vec2) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.max_speed = Some(speed);
        self
    }
}

// ── Capability trait ──────────────────────────────────────────────────────────

/// Rigid-body world as consumed by the simulation core.
pub trait PhysicsWorld {
    fn create_body(&mut self, desc: BodyDesc) -> SpatialResult<PhysicsHandle>;

    /// Returns `false` if the body did not exist.
    fn remove_body(&mut self, handle: PhysicsHandle) -> bool;

    fn apply_impulse(&mut self, handle: PhysicsHandle, impulse: Vec2) -> SpatialResult<()>;

    fn set_translation(&mut self, handle: PhysicsHandle, position: Vec2) -> SpatialResult<()>;

    fn set_velocity(&mut self, handle: PhysicsHandle, velocity: Vec2) -> SpatialResult<()>;

    fn translation(&self, handle: PhysicsHandle) -> Option<Vec2>;

    fn velocity(&self, handle: PhysicsHandle) -> Option<Vec2>;

    /// Advance the world by `dt_secs`.
    fn step(&mut self, dt_secs: f32);

    fn body_count(&self) -> usize;
}

impl<W: PhysicsWorld + ?Sized> PhysicsWorld for Box<W> {
    fn create_body(&mut self, desc: BodyDesc) -> SpatialResult<PhysicsHandle> {
        (**self).create_body(desc)
    }
    fn remove_body(&mut self, handle: PhysicsHandle) -> bool {
        (**self).remove_body(handle)
    }
    fn apply_impulse(&mut self, handle: PhysicsHandle, impulse: Vec2) -> SpatialResult<()> {
        (**self).apply_impulse(handle, impulse)
    }
    fn set_translation(&mut self, handle: PhysicsHandle, position: Vec2) -> SpatialResult<()> {
        (**self).set_translation(handle, position)
    }
    fn set_velocity(&mut self, handle: PhysicsHandle, velocity: Vec2) -> SpatialResult<()> {
        (**self).set_velocity(handle, velocity)
    }
    fn translation(&self, handle: PhysicsHandle) -> Option<Vec2> {
        (**self).translation(handle)
    }
    fn velocity(&self, handle: PhysicsHandle) -> Option<Vec2> {
        (**self).velocity(handle)
    }
    fn step(&mut self, dt_secs: f32) {
        (**self).step(dt_secs)
    }
    fn body_count(&self) -> usize {
        (**self).body_count()
    }
}

// ── KinematicWorld ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Body {
    position:  Vec2,
    velocity:  Vec2,
    inv_mass:  f32,
    damping:   f32,
    max_speed: Option<f32>,
}

#[derive(Debug, Default)]
pub struct KinematicWorld {
    bodies:      BTreeMap<PhysicsHandle, Body>,
    next_handle: u32,
    /// Optional arena bounds `(min, max)`; positions are clamped into them.
    bounds:      Option<(Vec2, Vec2)>,
}

impl KinematicWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp every body into the rectangle `min..=max` after each step.
    pub fn with_bounds(mut self, min: Vec2, max: Vec2) -> Self {
        self.bounds = Some((min, max));
        self
    }

    fn body_mut(&mut self, handle: PhysicsHandle) -> SpatialResult<&mut Body> {
        self.bodies.get_mut(&handle).ok_or(SpatialError::UnknownBody(handle))
    }
}

impl PhysicsWorld for KinematicWorld {
    fn create_body(&mut self, desc: BodyDesc) -> SpatialResult<PhysicsHandle> {
        if !(desc.mass.is_finite() && desc.mass > 0.0) {
            return Err(SpatialError::InvalidBody(format!("mass must be > 0, got {}", desc.mass)));
        }
        if !desc.position.is_finite() {
            return Err(SpatialError::InvalidBody("non-finite position".into()));
        }
        let handle = PhysicsHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, Body {
            position:  desc.position,
            velocity:  Vec2::ZERO,
            inv_mass:  1.0 / desc.mass,
            damping:   desc.linear_damping.max(0.0),
            max_speed: desc.max_speed,
        });
        Ok(handle)
    }

    fn remove_body(&mut self, handle: PhysicsHandle) -> bool {
        let removed = self.bodies.remove(&handle).is_some();
        if removed {
            debug!(%handle, "physics body removed");
        }
        removed
    }

    fn apply_impulse(&mut self, handle: PhysicsHandle, impulse: Vec2) -> SpatialResult<()> {
        if !impulse.is_finite() {
            return Ok(());
        }
        let body = self.body_mut(handle)?;
        body.velocity += impulse * body.inv_mass;
        Ok(())
    }

    fn set_translation(&mut self, handle: PhysicsHandle, position: Vec2) -> SpatialResult<()> {
        self.body_mut(handle)?.position = position;
        Ok(())
    }

    fn set_velocity(&mut self, handle: PhysicsHandle, velocity: Vec2) -> SpatialResult<()> {
        self.body_mut(handle)?.velocity = velocity;
        Ok(())
    }

    fn translation(&self, handle: PhysicsHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.position)
    }

    fn velocity(&self, handle: PhysicsHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.velocity)
    }

    fn step(&mut self, dt_secs: f32) {
        if dt_secs <= 0.0 {
            return;
        }
        let bounds = self.bounds;
        for body in self.bodies.values_mut() {
            let keep = (1.0 - body.damping * dt_secs).max(0.0);
            body.velocity = body.velocity * keep;
            if let Some(cap) = body.max_speed {
                body.velocity = body.velocity.clamp_length(cap);
            }
            body.position += body.velocity * dt_secs;
            if let Some((min, max)) = bounds {
                body.position = Vec2::new(
                    body.position.x.clamp(min.x, max.x),
                    body.position.y.clamp(min.y, max.y),
                );
            }
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

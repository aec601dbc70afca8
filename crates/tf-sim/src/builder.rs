//! Fluent builder for constructing a [`Sim`].

use tracing::info;

use tf_agent::TemplateSet;
use tf_behavior::KindRegistryBuilder;
use tf_core::SimConfig;
use tf_mobility::MovementPlanner;
use tf_spatial::{DirectPathfinder, KinematicWorld, ObstacleMap, Pathfinder, PhysicsWorld};

use crate::{DamageLedger, DamageSink, EventBus, Sim, SimError, SimResult, World};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick interval, cadences, thresholds, seed, …
/// - [`TemplateSet`]: one template per agent kind
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                                      |
/// |-------------------------|----------------------------------------------|
/// | `.kinds(b)`             | `KindRegistryBuilder::with_builtins()`       |
/// | `.physics(w)`           | `KinematicWorld::new()`                      |
/// | `.pathfinder(p)`        | `DirectPathfinder` over an empty obstacle map |
/// | `.damage_sink(s)`       | a fresh `DamageLedger`                       |
/// | `.events(bus)`          | `EventBus::new()`                            |
/// | `.agents_targetable(b)` | `false`                                      |
/// | `.first_agent_id(n)`    | `1000`                                       |
///
/// # Example
///
/// ```rust,ignore
/// let templates = load_templates_csv(Path::new("templates.csv"))?;
/// let mut sim = SimBuilder::new(config, templates)
///     .pathfinder(DirectPathfinder::new(obstacles))
///     .build()?;
/// sim.world.spawn("grunt", 1, Vec2::new(0.0, 0.0))?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:            SimConfig,
    templates:         TemplateSet,
    kinds:             Option<KindRegistryBuilder>,
    physics:           Option<Box<dyn PhysicsWorld>>,
    pathfinder:        Option<Box<dyn Pathfinder>>,
    damage:            Option<Box<dyn DamageSink>>,
    events:            Option<EventBus>,
    agents_targetable: bool,
    first_agent_id:    u32,
}

impl SimBuilder {
    pub fn new(config: SimConfig, templates: TemplateSet) -> Self {
        Self {
            config,
            templates,
            kinds:             None,
            physics:           None,
            pathfinder:        None,
            damage:            None,
            events:            None,
            agents_targetable: false,
            first_agent_id:    1_000,
        }
    }

    /// Factory tables used to resolve each template's behavior and abilities.
    pub fn kinds(mut self, kinds: KindRegistryBuilder) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn physics(mut self, physics: impl PhysicsWorld + 'static) -> Self {
        self.physics = Some(Box::new(physics));
        self
    }

    pub fn pathfinder(mut self, pathfinder: impl Pathfinder + 'static) -> Self {
        self.pathfinder = Some(Box::new(pathfinder));
        self
    }

    /// Collaborator receiving damage dealt to players and structures.
    pub fn damage_sink(mut self, sink: impl DamageSink + 'static) -> Self {
        self.damage = Some(Box::new(sink));
        self
    }

    /// Pre-populated event bus.  Subscriptions can also be added later via
    /// `sim.events`.
    pub fn events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Let agents appear in each other's candidate pools.
    pub fn agents_targetable(mut self, yes: bool) -> Self {
        self.agents_targetable = yes;
        self
    }

    /// First id handed out by `World::spawn`.  Keeps agent ids clear of the
    /// id range used for players and structures.
    pub fn first_agent_id(mut self, id: u32) -> Self {
        self.first_agent_id = id;
        self
    }

    /// Validate the config, resolve every kind, and return a ready-to-run
    /// [`Sim`].
    ///
    /// # Errors
    /// - [`SimError::Core`] for an invalid config.
    /// - [`SimError::Behavior`] for a template naming an unknown behavior or
    ///   ability.
    /// - [`SimError::Config`] for an empty template set.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        if self.templates.is_empty() {
            return Err(SimError::Config("no agent templates".into()));
        }

        let kinds = self
            .kinds
            .unwrap_or_else(KindRegistryBuilder::with_builtins)
            .build(&self.templates)?;

        let physics: Box<dyn PhysicsWorld> = match self.physics {
            Some(p) => p,
            None => Box::new(KinematicWorld::new()),
        };
        let pathfinder: Box<dyn Pathfinder> = match self.pathfinder {
            Some(p) => p,
            None => Box::new(DirectPathfinder::new(ObstacleMap::default())),
        };
        let damage: Box<dyn DamageSink> = match self.damage {
            Some(d) => d,
            None => Box::new(DamageLedger::new()),
        };

        let mut world = World::new(
            physics,
            MovementPlanner::new(pathfinder, self.config.movement.clone()),
            self.templates,
            kinds,
            damage,
            self.config.seed,
            self.first_agent_id,
        );
        world.agents_targetable = self.agents_targetable;

        info!(
            kinds = world.kinds.len(),
            tick_interval_ms = self.config.tick_interval_ms,
            seed = self.config.seed,
            "simulation built"
        );
        Ok(Sim::new(self.config, world, self.events.unwrap_or_default()))
    }
}

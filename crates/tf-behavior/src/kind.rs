//! Data-driven agent kinds.
//!
//! A template names its behavior and abilities by string.  At setup the
//! [`KindRegistryBuilder`] resolves every name through its factory tables and
//! produces one shared [`AgentKind`] per template.  An unknown name fails the
//! build, so a misconfigured template never reaches the tick loop.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use tf_agent::{AgentTemplate, TemplateSet};

use crate::{
    Ability, AiBehavior, BehaviorError, BehaviorResult, Charge, MeleeAi, RangedAi, SelfHeal,
    Shockwave, SwarmAi,
};

pub type BehaviorFactory = Box<dyn Fn(&AgentTemplate) -> Arc<dyn AiBehavior> + Send + Sync>;
pub type AbilityFactory = Box<dyn Fn(&AgentTemplate) -> Arc<dyn Ability> + Send + Sync>;

/// Resolved strategies for one template.
pub struct AgentKind {
    pub name:      String,
    pub ai:        Arc<dyn AiBehavior>,
    pub abilities: Vec<Arc<dyn Ability>>,
}

impl fmt::Debug for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abilities: Vec<&str> = self.abilities.iter().map(|a| a.name()).collect();
        f.debug_struct("AgentKind")
            .field("name", &self.name)
            .field("ai", &self.ai.name())
            .field("abilities", &abilities)
            .finish()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct KindRegistryBuilder {
    behaviors: FxHashMap<String, BehaviorFactory>,
    abilities: FxHashMap<String, AbilityFactory>,
}

impl KindRegistryBuilder {
    /// Empty factory tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory tables pre-filled with `melee`, `ranged`, `swarm` and the
    /// `self_heal`, `charge`, `shockwave` abilities.
    pub fn with_builtins() -> Self {
        Self::new()
            .behavior("melee", |_| Arc::new(MeleeAi))
            .behavior("ranged", |_| Arc::new(RangedAi))
            .behavior("swarm", |_| Arc::new(SwarmAi))
            .ability("self_heal", |_| Arc::new(SelfHeal::default()))
            .ability("charge", |_| Arc::new(Charge::default()))
            .ability("shockwave", |t| {
                Arc::new(Shockwave { radius: t.attack_range.max(96.0), ..Shockwave::default() })
            })
    }

    /// Register (or replace) a behavior factory.
    pub fn behavior<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&AgentTemplate) -> Arc<dyn AiBehavior> + Send + Sync + 'static,
    {
        self.behaviors.insert(name.to_owned(), Box::new(factory));
        self
    }

    /// Register (or replace) an ability factory.
    pub fn ability<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&AgentTemplate) -> Arc<dyn Ability> + Send + Sync + 'static,
    {
        self.abilities.insert(name.to_owned(), Box::new(factory));
        self
    }

    /// Resolve every template.  Fails on the first unknown behavior or
    /// ability name.
    pub fn build(&self, templates: &TemplateSet) -> BehaviorResult<KindRegistry> {
        let mut kinds = BTreeMap::new();
        for template in templates.iter() {
            let kind = self.resolve(template)?;
            debug!(kind = %kind.name, ai = kind.ai.name(), abilities = kind.abilities.len(), "agent kind resolved");
            kinds.insert(kind.name.clone(), Arc::new(kind));
        }
        Ok(KindRegistry { kinds })
    }

    fn resolve(&self, template: &AgentTemplate) -> BehaviorResult<AgentKind> {
        let factory = self.behaviors.get(&template.behavior).ok_or_else(|| {
            BehaviorError::MissingBehavior {
                kind:     template.kind.clone(),
                behavior: template.behavior.clone(),
            }
        })?;
        let abilities = template
            .abilities
            .iter()
            .map(|name| {
                self.abilities
                    .get(name)
                    .map(|f| f(template))
                    .ok_or_else(|| BehaviorError::MissingAbility {
                        kind:    template.kind.clone(),
                        ability: name.clone(),
                    })
            })
            .collect::<BehaviorResult<Vec<_>>>()?;
        Ok(AgentKind { name: template.kind.clone(), ai: factory(template), abilities })
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Every resolved kind, keyed by template name.
#[derive(Debug, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<String, Arc<AgentKind>>,
}

impl KindRegistry {
    pub fn get(&self, kind: &str) -> Option<&Arc<AgentKind>> {
        self.kinds.get(kind)
    }

    pub fn require(&self, kind: &str) -> BehaviorResult<Arc<AgentKind>> {
        self.kinds
            .get(kind)
            .cloned()
            .ok_or_else(|| BehaviorError::MissingKind(kind.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

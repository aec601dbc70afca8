//! Agent templates: the static per-kind stat block, loaded from CSV.
//!
//! # CSV format
//!
//! One row per agent kind.  `abilities` is a `;`-separated list of ability
//! names (may be empty).
//!
//! ```csv
//! kind,behavior,max_health,speed,attack_range,detection_range,attack_damage,attack_cooldown_ticks,armor,width,height,base_priority,abilities
//! grunt,melee,100,120,40,600,12,10,2,32,32,10,
//! archer,ranged,70,100,350,800,9,15,0,28,28,15,self_heal
//! brute,melee,260,80,48,500,30,20,6,48,48,25,charge;shockwave
//! ```
//!
//! `behavior` and each ability name are resolved against the kind registry
//! when the simulation is built; an unknown name is a configuration error
//! there, not here.
//!
//! # Level scaling
//!
//! Health and damage scale by `1 + 0.1 * (level - 1)`; level 1 is the base
//! stat block.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{AgentError, AgentResult};

/// Static stats shared by every agent of one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentTemplate {
    pub kind:                  String,
    /// Name of the AI behavior in the kind registry.
    pub behavior:              String,
    pub max_health:            f32,
    /// Movement speed in world units per second.
    pub speed:                 f32,
    pub attack_range:          f32,
    pub detection_range:       f32,
    pub attack_damage:         f32,
    pub attack_cooldown_ticks: u64,
    /// Flat damage reduction per hit.  `0` means no armor capability.
    pub armor:                 f32,
    /// Collision footprint handed to the pathfinder.
    pub width:                 f32,
    pub height:                f32,
    /// Priority this agent carries when *it* is a target candidate.
    pub base_priority:         f32,
    pub abilities:             Vec<String>,
}

impl AgentTemplate {
    /// Stat multiplier for `level` (levels below 1 count as 1).
    #[inline]
    pub fn level_scale(level: u32) -> f32 {
        1.0 + 0.1 * (level.max(1) - 1) as f32
    }

    pub fn scaled_health(&self, level: u32) -> f32 {
        self.max_health * Self::level_scale(level)
    }

    pub fn scaled_damage(&self, level: u32) -> f32 {
        self.attack_damage * Self::level_scale(level)
    }

    fn validate(&self) -> AgentResult<()> {
        let numbers = [
            ("max_health", self.max_health),
            ("speed", self.speed),
            ("attack_range", self.attack_range),
            ("detection_range", self.detection_range),
            ("attack_damage", self.attack_damage),
            ("armor", self.armor),
            ("width", self.width),
            ("height", self.height),
        ];
        for (field, v) in numbers {
            if !v.is_finite() || v < 0.0 {
                return Err(AgentError::Parse(format!(
                    "kind {:?}: {field} must be a finite non-negative number, got {v}",
                    self.kind
                )));
            }
        }
        if self.max_health <= 0.0 {
            return Err(AgentError::Parse(format!("kind {:?}: max_health must be > 0", self.kind)));
        }
        Ok(())
    }
}

// ── TemplateSet ───────────────────────────────────────────────────────────────

/// All templates of a run, keyed by kind.  Agents hold an `Arc` to theirs.
#[derive(Clone, Debug, Default)]
pub struct TemplateSet {
    by_kind: FxHashMap<String, Arc<AgentTemplate>>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the template for `template.kind`.
    pub fn insert(&mut self, template: AgentTemplate) -> Arc<AgentTemplate> {
        let t = Arc::new(template);
        self.by_kind.insert(t.kind.clone(), Arc::clone(&t));
        t
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<AgentTemplate>> {
        self.by_kind.get(kind)
    }

    /// Like [`get`](Self::get), but a missing kind is a configuration error.
    pub fn require(&self, kind: &str) -> AgentResult<Arc<AgentTemplate>> {
        self.by_kind
            .get(kind)
            .cloned()
            .ok_or_else(|| AgentError::MissingTemplate(kind.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AgentTemplate>> {
        self.by_kind.values()
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TemplateRecord {
    kind:                  String,
    behavior:              String,
    max_health:            f32,
    speed:                 f32,
    attack_range:          f32,
    detection_range:       f32,
    attack_damage:         f32,
    attack_cooldown_ticks: u64,
    armor:                 f32,
    width:                 f32,
    height:                f32,
    base_priority:         f32,
    #[serde(default)]
    abilities:             String,
}

impl From<TemplateRecord> for AgentTemplate {
    fn from(r: TemplateRecord) -> Self {
        let abilities = r
            .abilities
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        AgentTemplate {
            kind:                  r.kind.trim().to_owned(),
            behavior:              r.behavior.trim().to_owned(),
            max_health:            r.max_health,
            speed:                 r.speed,
            attack_range:          r.attack_range,
            detection_range:       r.detection_range,
            attack_damage:         r.attack_damage,
            attack_cooldown_ticks: r.attack_cooldown_ticks,
            armor:                 r.armor,
            width:                 r.width,
            height:                r.height,
            base_priority:         r.base_priority,
            abilities,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load agent templates from a CSV file.
pub fn load_templates_csv(path: &Path) -> AgentResult<TemplateSet> {
    let file = std::fs::File::open(path)?;
    load_templates_reader(file)
}

/// Like [`load_templates_csv`] but accepts any `Read` source.
///
/// A kind that appears twice is rejected.
pub fn load_templates_reader<R: Read>(reader: R) -> AgentResult<TemplateSet> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut set = TemplateSet::new();

    for result in csv_reader.deserialize::<TemplateRecord>() {
        let row = result.map_err(|e| AgentError::Parse(e.to_string()))?;
        let template = AgentTemplate::from(row);
        template.validate()?;
        if set.get(&template.kind).is_some() {
            return Err(AgentError::Parse(format!("duplicate kind {:?}", template.kind)));
        }
        set.insert(template);
    }

    Ok(set)
}

//! Per-agent dirty tracking for network publication.
//!
//! Every mutating setter on [`Agent`](crate::Agent) records which field it
//! changed.  The set is read by the delta encoder and cleared exactly once
//! per publish cycle.

use std::fmt;

/// A networked agent attribute.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum AgentField {
    Health    = 0,
    Position  = 1,
    Velocity  = 2,
    Animation = 3,
    Target    = 4,
    Level     = 5,
}

impl AgentField {
    pub const ALL: [AgentField; 6] = [
        AgentField::Health,
        AgentField::Position,
        AgentField::Velocity,
        AgentField::Animation,
        AgentField::Target,
        AgentField::Level,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentField::Health    => "health",
            AgentField::Position  => "position",
            AgentField::Velocity  => "velocity",
            AgentField::Animation => "animation",
            AgentField::Target    => "target",
            AgentField::Level     => "level",
        }
    }

    #[inline(always)]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for AgentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of changed fields since the last publish.  One bit per [`AgentField`].
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct DirtyFields(u8);

impl DirtyFields {
    pub const EMPTY: DirtyFields = DirtyFields(0);

    #[inline]
    pub fn insert(&mut self, field: AgentField) {
        self.0 |= field.bit();
    }

    #[inline]
    pub fn contains(self, field: AgentField) -> bool {
        self.0 & field.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Fields in declaration order.
    pub fn iter(self) -> impl Iterator<Item = AgentField> {
        AgentField::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Debug for DirtyFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(AgentField::as_str)).finish()
    }
}

impl FromIterator<AgentField> for DirtyFields {
    fn from_iter<I: IntoIterator<Item = AgentField>>(iter: I) -> Self {
        let mut set = DirtyFields::EMPTY;
        for f in iter {
            set.insert(f);
        }
        set
    }
}

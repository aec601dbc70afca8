//! Target categories shared by the selector, the agent model, and the wire types.

/// What kind of object a target reference points at.
///
/// Agents resolve live positions differently per type: `Agent` targets live in
/// the entity directory, `Player` and `Structure` targets are external
/// objects mirrored from inbound network input.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetType {
    #[default]
    Player,
    Structure,
    Agent,
}

impl TargetType {
    pub const ALL: [TargetType; 3] = [TargetType::Player, TargetType::Structure, TargetType::Agent];

    /// Label used in CSV templates and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Player    => "player",
            TargetType::Structure => "structure",
            TargetType::Agent     => "agent",
        }
    }

    /// Parse a CSV/TOML label.  Returns `None` for unknown labels.
    pub fn parse(s: &str) -> Option<TargetType> {
        match s.trim() {
            "player"    => Some(TargetType::Player),
            "structure" => Some(TargetType::Structure),
            "agent"     => Some(TargetType::Agent),
            _ => None,
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

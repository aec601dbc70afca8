//! `tf-agent`: agent state and its network representation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`agent`]     | `Agent`, `AnimationState`, `TargetRef`, `PositionSource`, `Damageable`, `ArmorProvider`, `FlatArmor` |
//! | [`template`]  | `AgentTemplate`, `TemplateSet`, CSV loader                    |
//! | [`dirty`]     | `AgentField`, `DirtyFields`                                   |
//! | [`delta`]     | `NetworkDeltaEncoder`, `AgentSnapshot`, `AgentDelta`, `DeltaBatch` |
//! | [`directory`] | `EntityDirectory` (id ↔ physics handle registry)              |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                                |

pub mod agent;
pub mod delta;
pub mod directory;
pub mod dirty;
pub mod error;
pub mod template;


pub use agent::{Agent, AnimationState, ArmorProvider, Damageable, FlatArmor, PositionSource, TargetRef};
pub use delta::{AgentDelta, AgentSnapshot, DeltaBatch, NetworkDeltaEncoder};
pub use directory::EntityDirectory;
pub use dirty::{AgentField, DirtyFields};
pub use error::{AgentError, AgentResult};
pub use template::{AgentTemplate, TemplateSet, load_templates_csv, load_templates_reader};

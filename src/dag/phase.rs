//! Ordered loading phases and their barrier tasks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Loading phase of a datavault workflow.
///
/// Phases are strictly ordered: staging runs first, satellites last. Each
/// phase owns one barrier task that every task of the phase feeds into and
/// that gates the next phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Staging,
    Hubs,
    Links,
    Satellites,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [Phase::Staging, Phase::Hubs, Phase::Links, Phase::Satellites];

    /// Id of the barrier task closing this phase
    pub fn barrier_id(self) -> &'static str {
        match self {
            Phase::Staging => "staging_done",
            Phase::Hubs => "hubs_done",
            Phase::Links => "links_done",
            Phase::Satellites => "sats_done",
        }
    }

    /// The phase whose barrier gates this one, `None` for staging
    pub fn predecessor(self) -> Option<Phase> {
        match self {
            Phase::Staging => None,
            Phase::Hubs => Some(Phase::Staging),
            Phase::Links => Some(Phase::Hubs),
            Phase::Satellites => Some(Phase::Links),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Staging => "staging",
            Phase::Hubs => "hubs",
            Phase::Links => "links",
            Phase::Satellites => "satellites",
        };
        write!(f, "{}", name)
    }
}

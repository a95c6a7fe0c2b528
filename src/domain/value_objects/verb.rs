//! Command verbs understood by the engine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Look,
    Move,
    Equip,
    Stash,
    Drop,
    Attack,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Look => "look",
            Verb::Move => "move",
            Verb::Equip => "equip",
            Verb::Stash => "stash",
            Verb::Drop => "drop",
            Verb::Attack => "attack",
        }
    }

    /// Whether issuing this verb uses up the actor's turn
    ///
    /// Looking is free: it is never persisted and never advances a turn.
    pub fn consumes_turn(&self) -> bool {
        !matches!(self, Verb::Look)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Server-assigned stable identity for a player across the whole system.
pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: PlayerId,
    pub username: String,
    pub total_score: i32,
    pub wins: i32,
    pub played_games: i32,
}

/// Per-match view of a participant. `score` resets every game; lifetime
/// counters live on [`User`] and are updated through the profile store only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub score: i32,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            score: 0,
        }
    }
}

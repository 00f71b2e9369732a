use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One quiz question. Choice order is significant: answers are matched
/// positionally in the UI, so `choices` must never be reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub choices: Vec<String>,
}

/// A votable question category. The id→name mapping is only meaningful
/// during the voting phase of the match that announced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Coarse-grained stage of a match. Strictly forward-only:
/// Waiting → Voting → Playing → End, and End is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GamePhase {
    Waiting,
    Voting,
    Playing,
    End,
}

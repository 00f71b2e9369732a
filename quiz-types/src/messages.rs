use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{Category, Player, PlayerId, Question, User};

/// Server-pushed events, in the `{action, data}` envelope shape used on the
/// wire in both directions. Tags and payload fields follow the camelCase
/// names the browser client already speaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
#[ts(export)]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: i64,
        room_players: Vec<Player>,
    },
    #[serde(rename_all = "camelCase")]
    CreatedRoom { room_id: i64 },
    StartVoting { categories: Vec<Category> },
    #[serde(rename_all = "camelCase")]
    VoteResult { player_id: PlayerId },
    #[serde(rename_all = "camelCase")]
    StartMatch {
        category: String,
        first_question: Question,
    },
    #[serde(rename_all = "camelCase")]
    AnswerResult {
        is_correct: bool,
        player_id: PlayerId,
        answer: String,
    },
    // The payload is the question itself, not an object wrapping it: the
    // browser client assigns `message.data` straight to its current
    // question state.
    NextQuestion(Question),
    #[serde(rename_all = "camelCase")]
    PlayerQuit { player_id: PlayerId },
    #[serde(rename_all = "camelCase")]
    GameOver { winner_id: PlayerId },
}

impl ServerEvent {
    /// Wire tag of this event, for diagnostics.
    pub fn action(&self) -> &'static str {
        match self {
            ServerEvent::JoinRoom { .. } => "joinRoom",
            ServerEvent::CreatedRoom { .. } => "createdRoom",
            ServerEvent::StartVoting { .. } => "startVoting",
            ServerEvent::VoteResult { .. } => "voteResult",
            ServerEvent::StartMatch { .. } => "startMatch",
            ServerEvent::AnswerResult { .. } => "answerResult",
            ServerEvent::NextQuestion(_) => "nextQuestion",
            ServerEvent::PlayerQuit { .. } => "playerQuit",
            ServerEvent::GameOver { .. } => "gameOver",
        }
    }
}

/// Intents the local player sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
#[ts(export)]
pub enum ClientAction {
    FindMatch { user: User },
    #[serde(rename_all = "camelCase")]
    Vote { category: String, player_id: PlayerId },
    #[serde(rename_all = "camelCase")]
    Answer { answer: String, player_id: PlayerId },
    #[serde(rename_all = "camelCase")]
    Quit { player_id: PlayerId },
}

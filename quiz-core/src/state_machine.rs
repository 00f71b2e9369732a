use std::collections::HashSet;

use quiz_types::{Category, ClientAction, GamePhase, Player, PlayerId, Question, ServerEvent, User};
use tracing::{debug, info, warn};

/// Lifetime-stat side effect produced by a transition. The reducer itself
/// never talks to the profile store; the session routes these into the one
/// update path that owns lifetime counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatEffect {
    /// The local player answered the current question correctly.
    CorrectAnswer,
    /// The match ended; `won` is true when the local player took it.
    GameFinished { won: bool },
}

/// Read-only view of the machine handed to view-layer subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub phase: GamePhase,
    pub room_id: Option<i64>,
    pub categories: Vec<Category>,
    pub category: Option<String>,
    pub players: Vec<Player>,
    pub current_question: Option<Question>,
    pub hints: Vec<String>,
    pub has_voted: bool,
    pub has_answered: bool,
    pub winner: Option<Player>,
}

/// Local view of one match, driven by the ordered stream of server events.
///
/// Transitions are synchronous and applied one event at a time in arrival
/// order. Phase moves strictly forward (Waiting → Voting → Playing → End);
/// an event that would move it backward leaves the phase untouched, and its
/// phase-bound effects are logged and dropped. Malformed or stale events
/// never corrupt unrelated state.
#[derive(Debug)]
pub struct GameStateMachine {
    local_id: PlayerId,
    phase: GamePhase,
    room_id: Option<i64>,
    players: Vec<Player>,
    categories: Vec<Category>,
    category: Option<String>,
    current_question: Option<Question>,
    hints: Vec<String>,
    // Dedup key for answerResult: one hint and one score bump per
    // (player, answer) pair per question.
    seen_answers: HashSet<(PlayerId, String)>,
    has_voted: bool,
    has_answered: bool,
    winner: Option<Player>,
}

impl GameStateMachine {
    pub fn new(local_id: impl Into<PlayerId>) -> Self {
        Self {
            local_id: local_id.into(),
            phase: GamePhase::Waiting,
            room_id: None,
            players: Vec::new(),
            categories: Vec::new(),
            category: None,
            current_question: None,
            hints: Vec::new(),
            seen_answers: HashSet::new(),
            has_voted: false,
            has_answered: false,
            winner: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.as_ref()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            phase: self.phase,
            room_id: self.room_id,
            categories: self.categories.clone(),
            category: self.category.clone(),
            players: self.players.clone(),
            current_question: self.current_question.clone(),
            hints: self.hints.clone(),
            has_voted: self.has_voted,
            has_answered: self.has_answered,
            winner: self.winner.clone(),
        }
    }

    /// Apply one inbound event; returns the lifetime-stat effects it caused.
    ///
    /// Recoverable problems (wrong phase, stale player reference) are logged
    /// and skipped without touching the rest of the state.
    pub fn apply(&mut self, event: ServerEvent) -> Vec<StatEffect> {
        match event {
            ServerEvent::JoinRoom {
                room_id,
                room_players,
            } => {
                // The roster broadcast is authoritative in every phase, but
                // it never moves the phase back to Waiting.
                if self.phase != GamePhase::Waiting {
                    warn!(phase = ?self.phase, "late joinRoom; replacing roster without phase change");
                } else {
                    info!(room_id, players = room_players.len(), "joined room");
                }
                self.room_id = Some(room_id);
                self.players = room_players;
                Vec::new()
            }
            ServerEvent::CreatedRoom { room_id } => {
                debug!(room_id, "room created");
                self.room_id = Some(room_id);
                Vec::new()
            }
            ServerEvent::StartVoting { categories } => {
                if self.phase != GamePhase::Waiting {
                    warn!(phase = ?self.phase, "dropping startVoting outside waiting phase");
                    return Vec::new();
                }
                info!(categories = categories.len(), "voting started");
                self.phase = GamePhase::Voting;
                self.categories = categories;
                self.has_voted = false;
                Vec::new()
            }
            ServerEvent::VoteResult { player_id } => {
                if self.phase != GamePhase::Voting {
                    warn!(phase = ?self.phase, "dropping voteResult outside voting phase");
                    return Vec::new();
                }
                if !self.contains_player(&player_id) {
                    warn!(%player_id, "voteResult for player not in room");
                    return Vec::new();
                }
                if player_id == self.local_id {
                    // Idempotent: a duplicate confirmation changes nothing.
                    self.has_voted = true;
                }
                Vec::new()
            }
            ServerEvent::StartMatch {
                category,
                first_question,
            } => {
                if self.phase != GamePhase::Voting {
                    warn!(phase = ?self.phase, "dropping startMatch outside voting phase");
                    return Vec::new();
                }
                info!(%category, "match started");
                self.phase = GamePhase::Playing;
                self.category = Some(category);
                self.load_question(first_question);
                Vec::new()
            }
            ServerEvent::AnswerResult {
                is_correct,
                player_id,
                answer,
            } => {
                if self.phase != GamePhase::Playing {
                    warn!(phase = ?self.phase, "dropping answerResult outside playing phase");
                    return Vec::new();
                }
                self.apply_answer_result(is_correct, player_id, answer)
            }
            ServerEvent::NextQuestion(question) => {
                if self.phase != GamePhase::Playing {
                    warn!(phase = ?self.phase, "dropping nextQuestion outside playing phase");
                    return Vec::new();
                }
                debug!("next question");
                self.load_question(question);
                Vec::new()
            }
            ServerEvent::PlayerQuit { player_id } => {
                // Valid in any phase; the roster shrinks, nothing else moves.
                let before = self.players.len();
                self.players.retain(|p| p.id != player_id);
                if self.players.len() == before {
                    warn!(%player_id, "playerQuit for player not in room");
                } else if player_id == self.local_id {
                    // Server-confirmed removal of ourselves (e.g. another
                    // tab quit). Local voluntary quit is a separate path
                    // through the session, so only the roster changes here.
                    info!("local player removed from room by server");
                } else {
                    info!(%player_id, "player left the match");
                }
                Vec::new()
            }
            ServerEvent::GameOver { winner_id } => {
                if self.phase != GamePhase::Playing {
                    warn!(phase = ?self.phase, "dropping gameOver outside playing phase");
                    return Vec::new();
                }
                self.phase = GamePhase::End;
                self.winner = self.players.iter().find(|p| p.id == winner_id).cloned();
                if self.winner.is_none() {
                    warn!(%winner_id, "gameOver names a player not in room");
                }
                let won = winner_id == self.local_id;
                info!(%winner_id, won, "game over");
                // playedGames counts regardless of who won.
                vec![StatEffect::GameFinished { won }]
            }
        }
    }

    fn apply_answer_result(
        &mut self,
        is_correct: bool,
        player_id: PlayerId,
        answer: String,
    ) -> Vec<StatEffect> {
        let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) else {
            warn!(%player_id, "answerResult for player not in room");
            return Vec::new();
        };

        if !self.seen_answers.insert((player_id.clone(), answer.clone())) {
            debug!(%player_id, %answer, "duplicate answerResult suppressed");
            return Vec::new();
        }

        let verdict = if is_correct { "correct" } else { "wrong" };
        self.hints
            .push(format!("{} answered \"{answer}\" and was {verdict}.", player.username));

        if is_correct {
            player.score += 1;
            if player_id == self.local_id {
                return vec![StatEffect::CorrectAnswer];
            }
        }
        Vec::new()
    }

    fn load_question(&mut self, question: Question) {
        self.current_question = Some(question);
        self.hints.clear();
        self.seen_answers.clear();
        self.has_answered = false;
    }

    fn contains_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    // ── Outbound intents ────────────────────────────────────────────

    /// Request matchmaking. Only valid before a room has been assigned.
    pub fn find_match(&self, user: &User) -> Option<ClientAction> {
        if self.phase != GamePhase::Waiting || self.room_id.is_some() {
            debug!(phase = ?self.phase, "findMatch suppressed");
            return None;
        }
        Some(ClientAction::FindMatch { user: user.clone() })
    }

    /// Cast the local ballot. One vote per voting phase; later calls are
    /// no-ops until the server starts a new vote.
    pub fn submit_vote(&mut self, category_key: &str) -> Option<ClientAction> {
        if self.phase != GamePhase::Voting || self.has_voted {
            debug!(phase = ?self.phase, has_voted = self.has_voted, "vote suppressed");
            return None;
        }
        // Optimistic: flip before the server confirms so a double click
        // cannot produce two ballots.
        self.has_voted = true;
        Some(ClientAction::Vote {
            category: category_key.to_string(),
            player_id: self.local_id.clone(),
        })
    }

    /// Submit the local answer. One answer per question; later calls are
    /// no-ops until the next question arrives.
    pub fn submit_answer(&mut self, answer: &str) -> Option<ClientAction> {
        if self.phase != GamePhase::Playing || self.has_answered {
            debug!(phase = ?self.phase, has_answered = self.has_answered, "answer suppressed");
            return None;
        }
        self.has_answered = true;
        Some(ClientAction::Answer {
            answer: answer.to_string(),
            player_id: self.local_id.clone(),
        })
    }

    /// Voluntary departure. Always allowed; the caller leaves the match view
    /// immediately without waiting for acknowledgment.
    pub fn quit(&self) -> ClientAction {
        ClientAction::Quit {
            player_id: self.local_id.clone(),
        }
    }
}

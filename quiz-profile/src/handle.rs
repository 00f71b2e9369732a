use std::sync::{Arc, Mutex, PoisonError};

use quiz_types::User;
use tracing::warn;

use crate::store::{ProfileStore, UserPatch};

/// The single update path for lifetime stats.
///
/// Each increment mutates the local [`User`] optimistically and fans out one
/// fire-and-forget [`ProfileStore::update_user`] call carrying the new
/// absolute values. Per-match scores never flow through here; those live on
/// the match roster and reset every game.
#[derive(Clone)]
pub struct ProfileHandle {
    user: Arc<Mutex<User>>,
    store: Arc<dyn ProfileStore>,
}

impl ProfileHandle {
    pub fn new(user: User, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            user: Arc::new(Mutex::new(user)),
            store,
        }
    }

    /// Current local view of the user.
    pub fn user(&self) -> User {
        self.user.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn user_id(&self) -> String {
        self.user.lock().unwrap_or_else(PoisonError::into_inner).id.clone()
    }

    /// The local player answered a question correctly: lifetime totalScore+1.
    pub fn record_correct_answer(&self) {
        let patch = {
            let mut user = self.user.lock().unwrap_or_else(PoisonError::into_inner);
            user.total_score += 1;
            UserPatch {
                total_score: Some(user.total_score),
                ..Default::default()
            }
        };
        self.mirror(patch);
    }

    /// A match finished: playedGames+1 always, wins+1 when the local player
    /// won.
    pub fn record_game_finished(&self, won: bool) {
        let patch = {
            let mut user = self.user.lock().unwrap_or_else(PoisonError::into_inner);
            user.played_games += 1;
            if won {
                user.wins += 1;
            }
            UserPatch {
                wins: won.then_some(user.wins),
                played_games: Some(user.played_games),
                ..Default::default()
            }
        };
        self.mirror(patch);
    }

    fn mirror(&self, patch: UserPatch) {
        let store = self.store.clone();
        let id = self.user_id();
        tokio::spawn(async move {
            if let Err(error) = store.update_user(&id, patch).await {
                warn!(%id, %error, "profile mirror update failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryProfileStore;

    fn test_user() -> User {
        User {
            id: "p1".to_string(),
            username: "Alice".to_string(),
            total_score: 5,
            wins: 2,
            played_games: 10,
        }
    }

    async fn settle() {
        // Let the spawned mirror tasks run to completion.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn correct_answer_bumps_total_score_and_mirrors() {
        let store = Arc::new(MemoryProfileStore::new());
        let handle = ProfileHandle::new(test_user(), store.clone());

        handle.record_correct_answer();
        settle().await;

        assert_eq!(handle.user().total_score, 6);
        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.total_score, Some(6));
        assert_eq!(updates[0].1.wins, None);
    }

    #[tokio::test]
    async fn winning_game_bumps_wins_and_played_games() {
        let store = Arc::new(MemoryProfileStore::new());
        let handle = ProfileHandle::new(test_user(), store.clone());

        handle.record_game_finished(true);
        settle().await;

        let user = handle.user();
        assert_eq!(user.wins, 3);
        assert_eq!(user.played_games, 11);
        let updates = store.updates();
        assert_eq!(updates[0].1.wins, Some(3));
        assert_eq!(updates[0].1.played_games, Some(11));
    }

    #[tokio::test]
    async fn losing_game_bumps_only_played_games() {
        let store = Arc::new(MemoryProfileStore::new());
        let handle = ProfileHandle::new(test_user(), store.clone());

        handle.record_game_finished(false);
        settle().await;

        let user = handle.user();
        assert_eq!(user.wins, 2);
        assert_eq!(user.played_games, 11);
        let updates = store.updates();
        assert_eq!(updates[0].1.wins, None);
        assert_eq!(updates[0].1.played_games, Some(11));
    }
}

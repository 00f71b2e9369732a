use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::{
    decode_event, encode_action, EventHub, GameStateMachine, StatEffect, StateSnapshot,
    Subscription,
};
use quiz_profile::{ProfileHandle, ProfileStore};
use quiz_types::{ClientAction, User};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("outbound channel closed")]
    TransportClosed,
    #[error("failed to encode outbound action: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One player's live view of a match.
///
/// The session owns the single pump over the inbound frame stream: frames
/// are decoded and applied to the state machine one at a time, in arrival
/// order, and each resulting snapshot fans out through the [`EventHub`].
/// Lifetime-stat effects are routed into the [`ProfileHandle`]. Quitting or
/// dropping the session detaches the pump synchronously; a frame arriving
/// after that never mutates the machine.
pub struct GameSession {
    machine: Arc<Mutex<GameStateMachine>>,
    hub: EventHub,
    profile: ProfileHandle,
    outbound: mpsc::UnboundedSender<String>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl GameSession {
    pub fn start(
        user: User,
        store: Arc<dyn ProfileStore>,
        mut inbound: mpsc::UnboundedReceiver<String>,
        outbound: mpsc::UnboundedSender<String>,
    ) -> Self {
        let machine = Arc::new(Mutex::new(GameStateMachine::new(user.id.clone())));
        let hub = EventHub::new();
        let profile = ProfileHandle::new(user, store);

        let pump_machine = machine.clone();
        let pump_hub = hub.clone();
        let pump_profile = profile.clone();
        let pump = tokio::spawn(async move {
            while let Some(frame) = inbound.recv().await {
                Self::process_frame(&pump_machine, &pump_hub, &pump_profile, &frame);
            }
            // Transport loss: the channel closed. State stays as-is and the
            // view keeps rendering the last-known-good snapshot.
            info!("inbound stream closed");
        });

        Self {
            machine,
            hub,
            profile,
            outbound,
            pump: Mutex::new(Some(pump)),
        }
    }

    fn process_frame(
        machine: &Mutex<GameStateMachine>,
        hub: &EventHub,
        profile: &ProfileHandle,
        frame: &str,
    ) {
        let event = match decode_event(frame) {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, "dropping undecodable frame");
                return;
            }
        };

        let (effects, snapshot) = {
            let mut machine = machine.lock().unwrap_or_else(PoisonError::into_inner);
            let effects = machine.apply(event);
            (effects, machine.snapshot())
        };

        for effect in effects {
            match effect {
                StatEffect::CorrectAnswer => profile.record_correct_answer(),
                StatEffect::GameFinished { won } => profile.record_game_finished(won),
            }
        }

        hub.publish(&snapshot);
    }

    /// Register a snapshot listener. Detach by dropping the subscription.
    pub fn subscribe(
        &self,
        listener: impl Fn(&StateSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        self.hub.subscribe(listener)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Current local view of the user's lifetime stats.
    pub fn user(&self) -> User {
        self.profile.user()
    }

    /// Ask the server for a match. No-op outside the pre-room waiting state.
    pub fn find_match(&self) -> Result<(), SessionError> {
        let action = {
            let machine = self.machine.lock().unwrap_or_else(PoisonError::into_inner);
            machine.find_match(&self.profile.user())
        };
        self.send_opt(action)
    }

    /// Cast the local ballot. No-op after the first vote of a voting phase.
    pub fn submit_vote(&self, category_key: &str) -> Result<(), SessionError> {
        let action = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submit_vote(category_key);
        self.send_opt(action)
    }

    /// Submit the local answer. No-op after the first answer of a question.
    pub fn submit_answer(&self, answer: &str) -> Result<(), SessionError> {
        let action = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submit_answer(answer);
        self.send_opt(action)
    }

    /// Voluntary departure: notify the server and leave immediately. The
    /// pump is detached before this returns, regardless of whether the
    /// notification could still be sent.
    pub fn quit(&self) -> Result<(), SessionError> {
        let action = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .quit();
        let sent = self.send(action);
        self.detach();
        sent
    }

    fn send_opt(&self, action: Option<ClientAction>) -> Result<(), SessionError> {
        match action {
            Some(action) => self.send(action),
            None => Ok(()),
        }
    }

    fn send(&self, action: ClientAction) -> Result<(), SessionError> {
        let frame = encode_action(&action)?;
        self.outbound
            .send(frame)
            .map_err(|_| SessionError::TransportClosed)
    }

    fn detach(&self) {
        if let Some(pump) = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pump.abort();
            info!("inbound pump detached");
        }
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.detach();
    }
}

use quiz_types::{ClientAction, ServerEvent};
use serde::Deserialize;
use thiserror::Error;

/// Wire tags the client recognizes. Anything else is an [`DecodeError::UnknownAction`].
const KNOWN_ACTIONS: &[&str] = &[
    "joinRoom",
    "createdRoom",
    "startVoting",
    "voteResult",
    "startMatch",
    "answerResult",
    "nextQuestion",
    "playerQuit",
    "gameOver",
];

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame was not a valid `{action, data}` envelope, or the payload
    /// shape did not match the contract for its action.
    #[error("malformed message for action {action:?}: {source}")]
    Malformed {
        action: Option<String>,
        #[source]
        source: serde_json::Error,
    },
    /// The envelope parsed but carried an unrecognized tag.
    #[error("unknown action tag {action:?}")]
    UnknownAction { action: String },
}

/// Minimal envelope used to classify a frame before the typed decode, so an
/// unknown tag and a malformed payload surface as distinct errors.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    action: String,
}

/// Decode one inbound frame into a typed server event.
///
/// Recognized tag with a bad payload ⇒ `Malformed`, unrecognized tag ⇒
/// `UnknownAction`, anything that is not an envelope at all ⇒ `Malformed`
/// with no action. Callers log and drop on error; decode failures never
/// affect existing state.
pub fn decode_event(frame: &str) -> Result<ServerEvent, DecodeError> {
    let envelope: RawEnvelope =
        serde_json::from_str(frame).map_err(|source| DecodeError::Malformed {
            action: None,
            source,
        })?;

    if !KNOWN_ACTIONS.contains(&envelope.action.as_str()) {
        return Err(DecodeError::UnknownAction {
            action: envelope.action,
        });
    }

    serde_json::from_str(frame).map_err(|source| DecodeError::Malformed {
        action: Some(envelope.action),
        source,
    })
}

/// Encode an outbound action into its wire frame.
pub fn encode_action(action: &ClientAction) -> Result<String, serde_json::Error> {
    serde_json::to_string(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_event() {
        let frame = r#"{"action":"voteResult","data":{"playerId":"p1"}}"#;
        let event = decode_event(frame).unwrap();
        assert_eq!(
            event,
            ServerEvent::VoteResult {
                player_id: "p1".to_string()
            }
        );
    }

    #[test]
    fn next_question_frame_carries_the_question_directly() {
        let frame = r#"{"action":"nextQuestion","data":{"question":"3+3?","choices":["5","6"]}}"#;
        match decode_event(frame).unwrap() {
            ServerEvent::NextQuestion(question) => {
                assert_eq!(question.text, "3+3?");
                assert_eq!(question.choices, vec!["5", "6"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_distinguished_from_malformed() {
        let frame = r#"{"action":"teleport","data":{}}"#;
        match decode_event(frame) {
            Err(DecodeError::UnknownAction { action }) => assert_eq!(action, "teleport"),
            other => panic!("expected UnknownAction, got {other:?}"),
        }
    }

    #[test]
    fn bad_payload_for_known_tag_is_malformed() {
        let frame = r#"{"action":"gameOver","data":{"winner":"not-the-right-field"}}"#;
        match decode_event(frame) {
            Err(DecodeError::Malformed { action, .. }) => {
                assert_eq!(action.as_deref(), Some("gameOver"))
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn non_envelope_is_malformed_without_action() {
        match decode_event("not json at all") {
            Err(DecodeError::Malformed { action: None, .. }) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn encodes_outbound_action() {
        let action = ClientAction::Quit {
            player_id: "p1".to_string(),
        };
        let frame = encode_action(&action).unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["action"], "quit");
        assert_eq!(value["data"]["playerId"], "p1");
    }
}

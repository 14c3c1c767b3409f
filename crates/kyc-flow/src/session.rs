//! # Sessions — Correlated Peer Channels
//!
//! One negotiation owns one session: a bidirectional channel pair keyed
//! by a `SessionId`. Concurrent unrelated negotiations each get their own
//! pair, so messages can never cross-deliver between negotiations.
//!
//! Every receive point takes a caller-specified timeout; when it elapses
//! the flow resolves to a timeout failure rather than hanging.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

use kyc_core::SessionId;

use crate::error::FlowError;
use crate::message::FlowMessage;

/// Buffered depth of a session leg. The protocol is strictly
/// send-then-wait, so anything beyond a couple of slots is slack.
const SESSION_CAPACITY: usize = 4;

/// One endpoint of a negotiation session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    outgoing: mpsc::Sender<FlowMessage>,
    incoming: mpsc::Receiver<FlowMessage>,
}

/// Create a connected pair of session endpoints under one correlation id.
pub fn session_pair() -> (Session, Session) {
    let id = SessionId::new();
    let (a_tx, b_rx) = mpsc::channel(SESSION_CAPACITY);
    let (b_tx, a_rx) = mpsc::channel(SESSION_CAPACITY);
    (
        Session {
            id,
            outgoing: a_tx,
            incoming: a_rx,
        },
        Session {
            id,
            outgoing: b_tx,
            incoming: b_rx,
        },
    )
}

impl Session {
    /// The correlation id shared by both endpoints.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Deliver a message to the peer endpoint.
    pub async fn send(&self, msg: FlowMessage) -> Result<(), FlowError> {
        trace!(session = %self.id, kind = msg.kind(), "send");
        self.outgoing
            .send(msg)
            .await
            .map_err(|_| FlowError::Unreachable)
    }

    /// Await the next message from the peer, failing with a timeout when
    /// none arrives in time.
    pub async fn receive(&mut self, timeout: Duration) -> Result<FlowMessage, FlowError> {
        match tokio::time::timeout(timeout, self.incoming.recv()).await {
            Err(_) => Err(FlowError::Timeout),
            Ok(None) => Err(FlowError::Unreachable),
            Ok(Some(msg)) => {
                trace!(session = %self.id, kind = msg.kind(), "receive");
                Ok(msg)
            }
        }
    }
}

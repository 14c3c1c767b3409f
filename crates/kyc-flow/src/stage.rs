//! # Observable Progress Stages
//!
//! Each flow role publishes its current stage on a watch channel every
//! time it transitions. Stages execute strictly in order with no backward
//! transitions; observers (a UI, a test) subscribe and see the latest
//! stage without ever blocking the flow.

use tokio::sync::watch;
use tracing::debug;

/// The stages of the initiating role, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorStage {
    /// Constructing the proposed kyc transaction.
    ConstructingOffer,
    /// Sending the proposal and awaiting the partially signed transaction.
    SendingOffer,
    /// Verifying signatures and contract constraints.
    Verifying,
    /// Signing the transaction with our private key.
    Signing,
    /// Obtaining the notary signature.
    Notarizing,
    /// Recording the transaction in the vault.
    Recording,
    /// Sending the fully signed transaction to the other party.
    SendingFinal,
}

impl InitiatorStage {
    /// Canonical stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConstructingOffer => "CONSTRUCTING_OFFER",
            Self::SendingOffer => "SENDING_OFFER",
            Self::Verifying => "VERIFYING",
            Self::Signing => "SIGNING",
            Self::Notarizing => "NOTARIZING",
            Self::Recording => "RECORDING",
            Self::SendingFinal => "SENDING_FINAL",
        }
    }
}

/// The stages of the accepting role, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptorStage {
    /// Awaiting the proposal from the initiator.
    ReceivingProposal,
    /// Re-deriving the transaction from the proposed state.
    GeneratingTransaction,
    /// Signing with our private key.
    Signing,
    /// Returning the partial transaction and awaiting the notarized one.
    Exchanging,
    /// Verifying signatures and contract constraints.
    Verifying,
    /// Recording the transaction in the vault.
    Recording,
}

impl AcceptorStage {
    /// Canonical stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceivingProposal => "RECEIVING_PROPOSAL",
            Self::GeneratingTransaction => "GENERATING_TRANSACTION",
            Self::Signing => "SIGNING",
            Self::Exchanging => "EXCHANGING",
            Self::Verifying => "VERIFYING",
            Self::Recording => "RECORDING",
        }
    }
}

impl std::fmt::Display for InitiatorStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for AcceptorStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Publisher side of a flow's stage feed.
#[derive(Debug)]
pub struct StageTracker<S> {
    sender: watch::Sender<S>,
}

impl<S: Copy + std::fmt::Display + Send + Sync + 'static> StageTracker<S> {
    /// A tracker starting at the given stage.
    pub fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Publish a transition. Observers that lag only ever see the latest
    /// value; the flow never blocks on them.
    pub fn set(&self, stage: S) {
        debug!(%stage, "flow stage");
        // No receivers is fine; stages are observability, not control.
        let _ = self.sender.send(stage);
    }

    /// Subscribe to stage transitions.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_sees_latest_stage() {
        let tracker = StageTracker::new(InitiatorStage::ConstructingOffer);
        let rx = tracker.subscribe();
        tracker.set(InitiatorStage::SendingOffer);
        tracker.set(InitiatorStage::Verifying);
        assert_eq!(*rx.borrow(), InitiatorStage::Verifying);
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let tracker = StageTracker::new(AcceptorStage::ReceivingProposal);
        tracker.set(AcceptorStage::Recording);
    }

    #[test]
    fn stage_names() {
        assert_eq!(InitiatorStage::Notarizing.name(), "NOTARIZING");
        assert_eq!(AcceptorStage::Exchanging.to_string(), "EXCHANGING");
    }
}

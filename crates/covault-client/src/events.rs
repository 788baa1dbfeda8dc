//! Typed protocol notifications
//!
//! Observers register explicitly via [`crate::WalletClient::subscribe`];
//! there is no global event bus. Closed receivers are pruned on the next
//! send.

use covault_types::ProposalId;
use tokio::sync::mpsc;

/// Externally observable protocol events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The public key ring reached n members and the server confirmed the
    /// wallet complete
    WalletCompleted,
    /// A spend proposal this client created was accepted by the server
    ProposalCreated(ProposalId),
    /// This client contributed signatures to a proposal
    ProposalSigned(ProposalId),
    /// This client rejected a proposal
    ProposalRejected(ProposalId),
    /// A proposal reached quorum and was broadcast
    ProposalBroadcast(ProposalId),
    /// A proposal was deleted by its creator
    ProposalRemoved(ProposalId),
}

/// Fan-out of notifications to registered subscribers.
#[derive(Default)]
pub(crate) struct Notifier {
    subscribers: Vec<mpsc::UnboundedSender<Notification>>,
}

impl Notifier {
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn notify(&mut self, notification: Notification) {
        self.subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }
}

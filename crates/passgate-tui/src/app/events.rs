//! Events delivered to the application loop from outside the key handlers

use tokio::sync::mpsc;

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// An unlock flow completed
    Unlocked,
}

/// Channel carrying [`AppEvent`]s back to the loop
pub struct EventChannel {
    sender: mpsc::UnboundedSender<AppEvent>,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Get a clone of the sender for callbacks and other tasks
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.sender.clone()
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&mut self) -> Option<AppEvent> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_reaches_receiver() {
        let mut channel = EventChannel::new();
        assert_eq!(channel.try_recv(), None);

        let tx = channel.sender();
        std::thread::spawn(move || tx.send(AppEvent::Unlocked).unwrap())
            .join()
            .unwrap();

        assert_eq!(channel.try_recv(), Some(AppEvent::Unlocked));
        assert_eq!(channel.try_recv(), None);
    }
}

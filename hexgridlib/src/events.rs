//! Fan-out notification hub built on `crossbeam_channel`.
//!
//! Every subscriber gets its own unbounded receiver and drains it with `try_iter()` on the
//! UI thread. Disconnected subscribers are dropped on the next emit.

use crossbeam_channel::{Receiver, Sender, unbounded};

#[derive(Debug)]
pub struct EventHub<E> {
    senders: Vec<Sender<E>>,
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<E: Clone> EventHub<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    pub fn emit(&mut self, event: &E) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_every_subscriber() {
        // Arrange
        let mut hub = EventHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();

        // Act
        hub.emit(&1u8);
        hub.emit(&2u8);

        // Assert
        assert_eq!(a.try_iter().collect::<Vec<_>>(), [1, 2]);
        assert_eq!(b.try_iter().collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        // Arrange
        let mut hub = EventHub::new();
        let kept = hub.subscribe();
        drop(hub.subscribe());

        // Act
        hub.emit(&"changed");

        // Assert
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok("changed"));
    }
}

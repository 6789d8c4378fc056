//! Per-run broadcast log with a bounded replay buffer

use futures::Stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use aigentic_core::Message;

/// Append-only message log shared between the executor loop and its subscribers.
///
/// Every subscriber first replays the retained messages and then follows live appends.
/// At most `capacity` messages are retained; older ones are dropped from the replay buffer.
/// The writer never waits on subscribers: a subscriber that falls more than `capacity`
/// messages behind skips ahead and logs how many it missed.
pub struct MessageLog {
    capacity: usize,
    inner: Mutex<LogInner>,
}

struct LogInner {
    replay: VecDeque<Message>,
    sender: Option<broadcast::Sender<Message>>,
    appended: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            capacity,
            inner: Mutex::new(LogInner {
                replay: VecDeque::with_capacity(capacity),
                sender: Some(sender),
                appended: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a message. Returns false if the log was already closed.
    pub fn push(&self, message: Message) -> bool {
        let mut inner = self.inner.lock();
        let Some(sender) = inner.sender.clone() else {
            tracing::warn!(kind = message.kind(), "append to closed message log ignored");
            return false;
        };

        if inner.replay.len() == self.capacity {
            inner.replay.pop_front();
        }
        inner.replay.push_back(message.clone());
        inner.appended += 1;

        // No live receivers is fine; the replay buffer still has the message.
        let _ = sender.send(message);
        true
    }

    /// Ends the log. Subscribers drain what they have and then see the end of the stream.
    pub fn close(&self) {
        self.inner.lock().sender = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().sender.is_none()
    }

    /// Snapshot of the retained messages.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.lock().replay.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().replay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().replay.is_empty()
    }

    /// Total messages ever appended, including those evicted from the replay buffer.
    pub fn appended(&self) -> usize {
        self.inner.lock().appended
    }

    pub fn subscribe(&self) -> Subscription {
        let inner = self.inner.lock();
        // Snapshot and receiver are taken under the same lock so nothing is missed or doubled.
        Subscription {
            backlog: inner.replay.clone(),
            receiver: inner.sender.as_ref().map(|s| s.subscribe()),
        }
    }
}

impl std::fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLog")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

pub struct Subscription {
    backlog: VecDeque<Message>,
    receiver: Option<broadcast::Receiver<Message>>,
}

impl Subscription {
    /// Next message, or `None` once the log is closed and drained.
    pub async fn recv(&mut self) -> Option<Message> {
        if let Some(message) = self.backlog.pop_front() {
            return Some(message);
        }
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "message log subscriber lagged");
                }
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    pub fn into_stream(mut self) -> impl Stream<Item = Message> + Send {
        async_stream::stream! {
            while let Some(message) = self.recv().await {
                yield message;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigentic_core::Sender;
    use futures::StreamExt;

    fn text(content: &str) -> Message {
        Message::text(Sender::Aigentic, content)
    }

    #[tokio::test]
    async fn test_late_subscriber_replays_from_start() {
        let log = MessageLog::new(10);
        log.push(text("one"));
        log.push(text("two"));

        let mut subscription = log.subscribe();
        log.push(text("three"));
        log.close();

        let mut received = Vec::new();
        while let Some(message) = subscription.recv().await {
            received.push(message);
        }
        assert_eq!(received, vec![text("one"), text("two"), text("three")]);
    }

    #[tokio::test]
    async fn test_replay_is_bounded() {
        let log = MessageLog::new(2);
        log.push(text("one"));
        log.push(text("two"));
        log.push(text("three"));

        assert_eq!(log.messages(), vec![text("two"), text("three")]);
        assert_eq!(log.appended(), 3);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_see_same_sequence() {
        let log = MessageLog::new(10);
        let first = log.subscribe();
        let second = log.subscribe();

        log.push(text("a"));
        log.push(text("b"));
        log.close();

        let a: Vec<_> = first.into_stream().collect().await;
        let b: Vec<_> = second.into_stream().collect().await;
        assert_eq!(a, vec![text("a"), text("b")]);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_push_after_close_is_ignored() {
        let log = MessageLog::new(4);
        log.push(text("a"));
        log.close();

        assert!(!log.push(text("b")));
        assert_eq!(log.len(), 1);

        let replayed: Vec<_> = log.subscribe().into_stream().collect().await;
        assert_eq!(replayed, vec![text("a")]);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_ahead() {
        let log = MessageLog::new(2);
        let mut subscription = log.subscribe();
        for i in 0..5 {
            log.push(text(&i.to_string()));
        }
        log.close();

        let mut received = Vec::new();
        while let Some(message) = subscription.recv().await {
            received.push(message);
        }
        assert_eq!(received, vec![text("3"), text("4")]);
    }
}

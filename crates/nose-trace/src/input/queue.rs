use crate::tracking::oracle::DetectionFrame;

/// Messages the outside world posts into a running session.
#[derive(Debug, Clone)]
pub enum SessionMessage {
    /// Latest result of one detection cycle.
    Detections(DetectionFrame),
    /// A detection cycle failed; counts as a cycle with no candidates.
    DetectionFailed { timestamp_ms: f64 },
    /// Presentation asked for a different word.
    SelectNewWord,
    /// Presentation asked to restart the round with the current word.
    ResetRound,
    /// Navigation away or hidden tab: stop and release the camera.
    Stop,
}

/// A queue of session messages.
/// JS pushes detections and UI triggers; Rust drains them each tick.
pub struct SessionQueue {
    messages: Vec<SessionMessage>,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self {
            messages: Vec::with_capacity(8),
        }
    }

    pub fn push(&mut self, message: SessionMessage) {
        self.messages.push(message);
    }

    /// Drain all pending messages. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<SessionMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Drop pending messages, e.g. when detection halts.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for SessionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_in_order() {
        let mut q = SessionQueue::new();
        q.push(SessionMessage::Detections(DetectionFrame::default()));
        q.push(SessionMessage::DetectionFailed { timestamp_ms: 12.0 });
        q.push(SessionMessage::Stop);
        assert_eq!(q.len(), 3);
        let messages = q.drain();
        assert!(q.is_empty());
        assert!(matches!(messages[0], SessionMessage::Detections(_)));
        assert!(matches!(messages[1], SessionMessage::DetectionFailed { timestamp_ms } if timestamp_ms == 12.0));
        assert!(matches!(messages[2], SessionMessage::Stop));
    }

    #[test]
    fn clear_discards() {
        let mut q = SessionQueue::default();
        q.push(SessionMessage::SelectNewWord);
        q.clear();
        assert!(q.drain().is_empty());
    }
}

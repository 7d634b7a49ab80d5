//! In-process channel. Inbound batches are scripted, outbound sends are
//! recorded, and delivery to chosen targets can be made to fail.

use super::{Channel, ChannelError, InboundEvent, Markup};
use crate::shared::ChatTarget;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

const IDLE_POLL_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: ChatTarget,
    pub text: String,
    pub markup: Option<Markup>,
}

#[derive(Debug, Default)]
pub struct LocalChannel {
    script: Mutex<VecDeque<Result<Vec<InboundEvent>, String>>>,
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<HashSet<ChatTarget>>,
    polls: AtomicUsize,
    failed_sends: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, events: Vec<InboundEvent>) {
        lock(&self.script).push_back(Ok(events));
    }

    pub fn push_poll_error(&self, reason: &str) {
        lock(&self.script).push_back(Err(reason.to_string()));
    }

    pub fn pending_batches(&self) -> usize {
        lock(&self.script).len()
    }

    pub fn fail_sends_to(&self, target: impl Into<ChatTarget>) {
        lock(&self.failing).insert(target.into());
    }

    pub fn restore_sends_to(&self, target: impl Into<ChatTarget>) {
        lock(&self.failing).remove(&target.into());
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn sent_to(&self, target: impl Into<ChatTarget>) -> Vec<SentMessage> {
        let target = target.into();
        lock(&self.sent)
            .iter()
            .filter(|message| message.to == target)
            .cloned()
            .collect()
    }

    pub fn clear_sent(&self) {
        lock(&self.sent).clear();
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn failed_send_count(&self) -> usize {
        self.failed_sends.load(Ordering::SeqCst)
    }
}

impl Channel for LocalChannel {
    fn poll(&self) -> Result<Vec<InboundEvent>, ChannelError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = lock(&self.script).pop_front();
        match next {
            Some(Ok(events)) => Ok(events),
            Some(Err(reason)) => Err(ChannelError::Request(reason)),
            None => {
                thread::sleep(IDLE_POLL_DELAY);
                Ok(Vec::new())
            }
        }
    }

    fn send_text(
        &self,
        to: &ChatTarget,
        text: &str,
        markup: Option<&Markup>,
    ) -> Result<(), ChannelError> {
        if lock(&self.failing).contains(to) {
            self.failed_sends.fetch_add(1, Ordering::SeqCst);
            return Err(ChannelError::Request(format!("delivery to {to} refused")));
        }
        lock(&self.sent).push(SentMessage {
            to: to.clone(),
            text: text.to_string(),
            markup: markup.cloned(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::UserId;

    #[test]
    fn scripted_batches_are_replayed_in_order() {
        let channel = LocalChannel::new();
        let user = UserId::new(1);
        channel.push_batch(vec![InboundEvent::Text {
            user,
            text: "hi".to_string(),
        }]);
        channel.push_poll_error("network down");

        assert_eq!(channel.poll().expect("batch").len(), 1);
        assert!(matches!(channel.poll(), Err(ChannelError::Request(_))));
        assert!(channel.poll().expect("idle").is_empty());
        assert_eq!(channel.poll_count(), 3);
    }

    #[test]
    fn failing_targets_refuse_delivery_without_recording() {
        let channel = LocalChannel::new();
        let user = UserId::new(3);
        channel.fail_sends_to(user);
        assert!(channel.send_text(&user.into(), "x", None).is_err());
        assert!(channel.sent().is_empty());
        assert_eq!(channel.failed_send_count(), 1);

        channel.restore_sends_to(user);
        channel.send_text(&user.into(), "y", None).expect("send");
        assert_eq!(channel.sent_to(user).len(), 1);
    }
}

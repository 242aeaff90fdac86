//! Topic → open channels.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::channel::{ChannelId, LiveChannel};
use crate::topic::Topic;

/// Shared dispatch handle to an open channel.
pub type ChannelHandle = Arc<dyn LiveChannel>;

/// Process-wide map from topic to the channels currently subscribed to it.
///
/// - A topic is present iff it has at least one channel.
/// - The lock is only held for map bookkeeping; reads hand out a cloned
///   snapshot so callers can send without holding it.
/// - No deduplication: registering the same channel twice yields two entries.
#[derive(Default)]
pub struct SubscriptionRegistry {
    topics: Mutex<HashMap<Topic, Vec<ChannelHandle>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated (every
    // mutation is a single push/remove), so a poisoned guard is still usable.
    fn topics(&self) -> MutexGuard<'_, HashMap<Topic, Vec<ChannelHandle>>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, topic: Topic, channel: ChannelHandle) {
        tracing::debug!(topic = %topic, channel = %channel.id(), "channel registered");
        self.topics().entry(topic).or_default().push(channel);
    }

    /// Remove one registration of `channel` from `topic`.
    ///
    /// Returns whether anything was removed.
    pub fn unregister(&self, topic: &Topic, channel: ChannelId) -> bool {
        let mut topics = self.topics();
        let Some(channels) = topics.get_mut(topic) else {
            return false;
        };

        let removed = match channels.iter().position(|c| c.id() == channel) {
            Some(idx) => {
                channels.remove(idx);
                true
            }
            None => false,
        };

        if channels.is_empty() {
            topics.remove(topic);
        }

        if removed {
            tracing::debug!(topic = %topic, channel = %channel, "channel unregistered");
        }
        removed
    }

    /// Snapshot of the channels currently registered for `topic`.
    pub fn channels_for(&self, topic: &Topic) -> Vec<ChannelHandle> {
        self.topics().get(topic).cloned().unwrap_or_default()
    }

    pub fn channel_count(&self, topic: &Topic) -> usize {
        self.topics().get(topic).map_or(0, Vec::len)
    }

    pub fn contains_topic(&self, topic: &Topic) -> bool {
        self.topics().contains_key(topic)
    }

    pub fn topic_count(&self) -> usize {
        self.topics().len()
    }

    pub fn total_channels(&self) -> usize {
        self.topics().values().map(Vec::len).sum()
    }
}

impl core::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let topics = self.topics();
        f.debug_struct("SubscriptionRegistry")
            .field("topics", &topics.len())
            .field("channels", &topics.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::registry::{ChannelHandle, SubscriptionRegistry};
use crate::topic::Topic;

/// Outcome of a single broadcast, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Best-effort fan-out of a message to every channel of a topic.
///
/// Failed sends are counted and logged, never returned: one subscriber going
/// away must not fail the request that triggered the broadcast. Dead channels
/// stay registered until their connection's disconnect path unregisters them.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<SubscriptionRegistry>,
    // Highest version sent per topic while it had listeners.
    sent: Arc<Mutex<HashMap<Topic, u64>>>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self {
            registry,
            sent: Arc::default(),
        }
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    fn sent(&self) -> MutexGuard<'_, HashMap<Topic, u64>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn broadcast<M: Serialize>(&self, topic: &Topic, message: &M) -> BroadcastReport {
        let channels = self.registry.channels_for(topic);
        deliver(topic, &channels, message)
    }

    /// Broadcast `message` unless a higher `version` was already sent on `topic`.
    ///
    /// Returns `None` when the message is superseded. The check and the
    /// enqueue happen under one lock, so listeners never observe versions
    /// going backwards. The mark is dropped once the topic has no listeners.
    pub fn broadcast_latest<M: Serialize>(
        &self,
        topic: &Topic,
        version: u64,
        message: &M,
    ) -> Option<BroadcastReport> {
        let mut sent = self.sent();
        let channels = self.registry.channels_for(topic);
        if channels.is_empty() {
            sent.remove(topic);
            return Some(BroadcastReport::default());
        }

        if sent.get(topic).is_some_and(|&last| version <= last) {
            tracing::debug!(topic = %topic, version, "superseded update dropped");
            return None;
        }
        sent.insert(topic.clone(), version);

        Some(deliver(topic, &channels, message))
    }
}

fn deliver<M: Serialize>(topic: &Topic, channels: &[ChannelHandle], message: &M) -> BroadcastReport {
    if channels.is_empty() {
        return BroadcastReport::default();
    }

    let payload = match serde_json::to_string(message) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "failed to encode broadcast message");
            return BroadcastReport::default();
        }
    };

    let mut report = BroadcastReport {
        attempted: channels.len(),
        ..BroadcastReport::default()
    };

    for channel in channels {
        match channel.send(&payload) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                tracing::debug!(
                    topic = %topic,
                    channel = %channel.id(),
                    error = %e,
                    "live update not delivered"
                );
            }
        }
    }

    report
}

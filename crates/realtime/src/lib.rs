//! Live vote-count fan-out.
//!
//! Open connections register under a topic (one product each). When a
//! product's counts change, the [`Broadcaster`] pushes an update to every
//! connection currently registered for it.
//!
//! ```text
//! vote ─► store increment ─► Broadcaster::broadcast(topic, update)
//!                                   │
//!                                   ├─ registry snapshot (lock released)
//!                                   └─ send to each channel (failures dropped)
//! ```

pub mod broadcaster;
pub mod channel;
pub mod envelope;
pub mod registry;
pub mod topic;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use channel::{ChannelError, ChannelId, ConnectionChannel, LiveChannel};
pub use envelope::{VOTES_UPDATE, VoteUpdate};
pub use registry::{ChannelHandle, SubscriptionRegistry};
pub use topic::Topic;

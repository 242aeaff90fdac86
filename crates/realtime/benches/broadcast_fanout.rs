//! Fan-out cost of one vote update as the number of viewers grows.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use votecast_core::DocumentId;
use votecast_products::{Counts, ProductId};
use votecast_realtime::{Broadcaster, ChannelError, ChannelId, LiveChannel, SubscriptionRegistry, Topic, VoteUpdate};

/// Accepts every payload and only counts bytes, so queue growth does not skew timings.
struct CountingChannel {
    id: ChannelId,
    bytes: AtomicU64,
}

impl LiveChannel for CountingChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn send(&self, payload: &str) -> Result<(), ChannelError> {
        self.bytes.fetch_add(payload.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_fanout");

    for viewers in [1usize, 10, 100, 1_000] {
        let registry = Arc::new(SubscriptionRegistry::new());
        let broadcaster = Broadcaster::new(registry.clone());
        let product_id = ProductId::new(DocumentId::new());
        let topic = Topic::from(product_id);

        for _ in 0..viewers {
            registry.register(
                topic.clone(),
                Arc::new(CountingChannel {
                    id: ChannelId::new(),
                    bytes: AtomicU64::new(0),
                }),
            );
        }

        let update = VoteUpdate::new(product_id, Counts::zeroed(), Utc::now());

        group.throughput(Throughput::Elements(viewers as u64));
        group.bench_with_input(BenchmarkId::from_parameter(viewers), &viewers, |b, _| {
            b.iter(|| black_box(broadcaster.broadcast(&topic, &update)));
        });
    }

    group.finish();
}

fn bench_register_unregister(c: &mut Criterion) {
    let registry = SubscriptionRegistry::new();
    let topic = Topic::new("bench-product");

    c.bench_function("register_unregister", |b| {
        b.iter(|| {
            let channel = Arc::new(CountingChannel {
                id: ChannelId::new(),
                bytes: AtomicU64::new(0),
            });
            let id = channel.id;
            registry.register(topic.clone(), channel);
            black_box(registry.unregister(&topic, id));
        });
    });
}

criterion_group!(benches, bench_fanout, bench_register_unregister);
criterion_main!(benches);

//! Live vote-count updates over WebSocket.
//!
//! Each connection gets a [`ConnectionChannel`] registered under its product's
//! topic. A writer task drains the channel's queue into the socket and sends a
//! keepalive ping; a reader task watches for the peer going away. Whichever
//! finishes first ends the connection, and the channel is unregistered once.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        Extension, Path,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use votecast_realtime::{ConnectionChannel, LiveChannel, SubscriptionRegistry, Topic};

use crate::app::errors;
use crate::app::services::AppServices;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// `GET /ws/products/{id}`: 404 before upgrading if the product does not exist.
pub async fn product_updates(
    ws: WebSocketUpgrade,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let product = match services.products.find(&id).await {
        Ok(p) => p,
        Err(e) => return errors::service_error_to_response(e),
    };

    let registry = services.registry.clone();
    let topic = Topic::from(product.id);
    ws.on_upgrade(move |socket| handle_socket(socket, registry, topic))
}

async fn handle_socket(socket: WebSocket, registry: Arc<SubscriptionRegistry>, topic: Topic) {
    let (channel, mut outgoing) = ConnectionChannel::pair();
    let channel_id = channel.id();
    registry.register(topic.clone(), Arc::new(channel));
    tracing::info!(topic = %topic, channel = %channel_id, "viewer connected");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        let mut keepalive = tokio::time::interval(PING_INTERVAL);
        // The first tick fires immediately.
        keepalive.tick().await;

        loop {
            tokio::select! {
                payload = outgoing.recv() => {
                    let Some(text) = payload else { break };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                _ = keepalive.tick() => {
                    if sender.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Client frames carry nothing we act on; only close and errors matter.
    let mut receive_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "websocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut receive_task => send_task.abort(),
        _ = &mut send_task => receive_task.abort(),
    }

    registry.unregister(&topic, channel_id);
    tracing::info!(topic = %topic, channel = %channel_id, "viewer disconnected");
}

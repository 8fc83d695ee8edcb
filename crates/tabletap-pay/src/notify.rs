//! # Realtime Event Publisher
//!
//! Capability trait for pushing order events to the realtime layer. Delivery
//! mechanics (websockets, push) live outside this repo; the shipped
//! implementation logs events structurally so the reconciler's behavior is
//! observable without any transport.
//!
//! Publishing is fire-and-forget: a cancellation must never fail because a
//! notification could not be delivered.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Events emitted by the order services.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    OrderCancelled {
        order_id: String,
        reason: Option<String>,
        cancelled_by: String,
    },
}

/// Channel carrying all events for one restaurant's dashboard.
pub fn restaurant_channel(restaurant_id: &str) -> String {
    format!("restaurant:{restaurant_id}")
}

/// Channel carrying events for the guests at one table.
pub fn table_channel(table_id: &str) -> String {
    format!("table:{table_id}")
}

/// Async capability for publishing order events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an event to a channel. Infallible by contract: failures are
    /// the implementation's problem to log, not the caller's to handle.
    async fn publish(&self, channel: &str, event: &OrderEvent);
}

/// Publisher that logs events through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, channel: &str, event: &OrderEvent) {
        let payload = serde_json::to_string(event).unwrap_or_else(|_| "<unserializable>".into());
        info!(channel, payload = %payload, "order event published");
    }
}

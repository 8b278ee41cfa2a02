//! Outcome publishing for production and testing.
//!
//! Provides a trait-based publisher that allows swapping between a real NATS
//! connection and an in-memory bus.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;

/// Default channel capacity for the in-memory bus.
const DEFAULT_CAPACITY: usize = 1024;

/// A published message.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// Fire-and-forget publish to a named subject.
///
/// Implementations hand the payload to the transport and return; no
/// acknowledgment from subscribers is awaited.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}

/// Publisher backed by a NATS client.
#[derive(Clone)]
pub struct NatsPublisher {
    client: async_nats::Client,
}

impl NatsPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for NatsPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client.publish(subject, payload).await?;
        Ok(())
    }
}

/// In-memory bus that records and broadcasts every published message.
///
/// Tests can inspect what was published after the fact, or subscribe before
/// driving a controller and wait for a message on a subject.
pub struct InMemoryBus {
    published: RwLock<Vec<PublishedMessage>>,
    sender: broadcast::Sender<PublishedMessage>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            published: RwLock::new(Vec::new()),
            sender,
        }
    }

    /// Receive every message published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedMessage> {
        self.sender.subscribe()
    }

    /// Get published messages for a specific subject.
    pub fn messages_for_subject(&self, subject: &str) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Check if any message was published to a subject.
    pub fn was_published_to(&self, subject: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|m| m.subject == subject)
    }

    pub fn publish_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for InMemoryBus {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        let message = PublishedMessage { subject, payload };
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        // Err only means nobody is subscribed.
        let _ = self.sender.send(message);
        Ok(())
    }
}

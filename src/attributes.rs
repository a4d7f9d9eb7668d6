//! Pending cart-attribute buffer and its flush contract.
//!
//! Choices made on a step are staged here and written to the cart store
//! in one network call before the next navigation commits. A failed
//! flush leaves the buffer intact so the same write can be retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::PersistenceError;
use crate::ports::CartStore;

/// Buffers key/value attributes until the next successful flush.
pub struct AttributeGate {
    store: Arc<dyn CartStore>,
    pending: RwLock<BTreeMap<String, String>>,
}

impl AttributeGate {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self {
            store,
            pending: RwLock::new(BTreeMap::new()),
        }
    }

    /// Merge one attribute into the pending buffer, last write wins.
    pub async fn stage(&self, key: impl Into<String>, value: impl Into<String>) {
        self.pending.write().await.insert(key.into(), value.into());
    }

    /// Write the full buffer to the cart store.
    ///
    /// An empty buffer succeeds immediately without a network call. On
    /// success the buffer is cleared; on failure it is left untouched
    /// for a later retry.
    ///
    /// The write lock is held across the store call: an attribute
    /// staged while a flush is in flight waits for it and survives the
    /// clear, so only confirmed-persisted values ever leave the buffer.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let mut pending = self.pending.write().await;
        if pending.is_empty() {
            return Ok(());
        }
        self.store.update_attributes(&pending).await?;
        pending.clear();
        Ok(())
    }

    /// Drop everything staged without persisting it.
    pub async fn clear(&self) {
        self.pending.write().await.clear();
    }

    /// Snapshot of the pending buffer.
    pub async fn pending(&self) -> BTreeMap<String, String> {
        self.pending.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::memory::MemoryCartStore;

    fn gate() -> (Arc<MemoryCartStore>, AttributeGate) {
        let store = Arc::new(MemoryCartStore::new());
        let gate = AttributeGate::new(store.clone());
        (store, gate)
    }

    #[tokio::test]
    async fn empty_flush_makes_no_network_call() {
        let (store, gate) = gate();
        assert!(gate.flush().await.is_ok());
        assert!(gate.flush().await.is_ok());
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn stage_is_last_write_wins() {
        let (_, gate) = gate();
        gate.stage("size", "M").await;
        gate.stage("size", "L").await;
        let pending = gate.pending().await;
        assert_eq!(pending.get("size").map(String::as_str), Some("L"));
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn successful_flush_clears_and_next_flush_is_a_noop() {
        let (store, gate) = gate();
        gate.stage("a", "1").await;
        gate.stage("b", "2").await;

        gate.flush().await.unwrap();
        assert!(gate.pending().await.is_empty());
        assert_eq!(store.attributes().get("a").map(String::as_str), Some("1"));
        assert_eq!(store.update_calls(), 1);

        gate.flush().await.unwrap();
        assert_eq!(store.update_calls(), 1, "empty flush must not hit the network");
    }

    #[tokio::test]
    async fn staging_during_a_flush_is_not_lost() {
        let store = Arc::new(MemoryCartStore::new());
        store.set_delay(std::time::Duration::from_millis(30));
        let gate = Arc::new(AttributeGate::new(store.clone()));
        gate.stage("a", "1").await;

        let flushing = tokio::spawn({
            let gate = gate.clone();
            async move { gate.flush().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        gate.stage("b", "2").await;
        flushing.await.unwrap().unwrap();

        // Only the flushed value left the buffer; the late arrival is
        // still pending and goes out with the next flush.
        assert!(!store.attributes().contains_key("b"));
        let pending = gate.pending().await;
        assert_eq!(pending.get("b").map(String::as_str), Some("2"));
        assert!(!pending.contains_key("a"));

        store.set_delay(std::time::Duration::ZERO);
        gate.flush().await.unwrap();
        assert_eq!(store.attributes().get("b").map(String::as_str), Some("2"));
        assert!(gate.pending().await.is_empty());
    }

    #[tokio::test]
    async fn failed_flush_preserves_the_buffer() {
        let (store, gate) = gate();
        gate.stage("a", "1").await;
        let before = gate.pending().await;

        store.fail_updates(true);
        assert!(gate.flush().await.is_err());
        assert_eq!(gate.pending().await, before);

        // Retry succeeds once the store recovers.
        store.fail_updates(false);
        gate.flush().await.unwrap();
        assert!(gate.pending().await.is_empty());
    }
}

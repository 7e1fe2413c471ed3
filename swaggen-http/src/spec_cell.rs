use std::sync::Arc;

use axum::body::Bytes;
use serde::Serialize;
use swaggen_core::DocError;
use tokio::sync::watch;
use tracing::{info, warn};

/// One-time slot for the serialized API document.
///
/// Clones share the slot. Readers that arrive before the document is
/// published wait for it; after the first publication the slot never
/// changes again.
#[derive(Debug, Clone)]
pub struct SpecCell {
    tx: Arc<watch::Sender<Option<Bytes>>>,
}

impl SpecCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Store `document`. Returns `Ok(false)`, leaving the slot untouched,
    /// when a document was already published.
    ///
    /// # Errors
    ///
    /// `Serialization` if `document` cannot be written as JSON; the slot is
    /// left empty then.
    pub fn publish<T: Serialize + ?Sized>(&self, document: &T) -> Result<bool, DocError> {
        let body = serde_json::to_string_pretty(document).map_err(|e| DocError::Serialization {
            message: e.to_string(),
        })?;
        let len = body.len();
        let stored = self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(Bytes::from(body));
            true
        });
        if stored {
            info!(bytes = len, "API document published");
        } else {
            warn!("API document already published; ignoring the new one");
        }
        Ok(stored)
    }

    /// The published document, if any.
    pub fn get(&self) -> Option<Bytes> {
        self.tx.borrow().clone()
    }

    pub fn is_published(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Wait until the document is published.
    ///
    /// Returns `None` only if the channel closed first, which cannot happen
    /// while `self` is alive.
    pub async fn wait(&self) -> Option<Bytes> {
        let mut rx = self.tx.subscribe();
        let slot = rx.wait_for(Option::is_some).await.ok()?;
        slot.clone()
    }
}

impl Default for SpecCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::{json, Value};

    struct Unwritable;

    impl Serialize for Unwritable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("document is not writable"))
        }
    }

    #[test]
    fn second_publication_is_ignored() {
        let cell = SpecCell::new();
        assert!(!cell.is_published());
        assert!(cell.publish(&json!({ "swagger": "2.0" })).unwrap());
        assert!(!cell.publish(&json!({ "swagger": "3.0" })).unwrap());

        let body = cell.get().unwrap();
        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(doc["swagger"], "2.0");
    }

    #[test]
    fn serialization_failure_is_reported() {
        let cell = SpecCell::new();
        let err = cell.publish(&Unwritable).unwrap_err();
        assert_eq!(
            err,
            DocError::Serialization {
                message: "document is not writable".into()
            }
        );
        assert!(!cell.is_published());
        assert!(cell.get().is_none());
    }

    #[tokio::test]
    async fn waiters_see_a_later_publication() {
        let cell = SpecCell::new();
        let reader = cell.clone();
        let waiting = tokio::spawn(async move { reader.wait().await });

        tokio::task::yield_now().await;
        cell.publish(&json!({ "paths": {} })).unwrap();

        let body = waiting.await.unwrap().unwrap();
        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(doc, json!({ "paths": {} }));
    }

    #[tokio::test]
    async fn wait_returns_immediately_once_published() {
        let cell = SpecCell::new();
        cell.publish(&json!({})).unwrap();
        assert!(cell.wait().await.is_some());
    }
}

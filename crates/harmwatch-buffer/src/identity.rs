//! The per-installation anonymous identifier attached to feedback.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::BufferError;
use crate::store::KeyValueStore;
use crate::ANON_ID_KEY;

/// Lazily created, persisted anonymous id.
///
/// `get_or_create` reads and, when needed, writes the id in one store
/// update, so concurrent callers (in this process or another one sharing
/// the store) always agree on one value. The value is cached after the
/// first successful call.
pub struct AnonymousIdentity<S> {
    store: Arc<S>,
    cached: Mutex<Option<String>>,
}

impl<S: KeyValueStore> AnonymousIdentity<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Returns the stored id, generating and persisting one on first use.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the store cannot be read, or if a new id
    /// cannot be persisted. Nothing is cached on failure.
    pub async fn get_or_create(&self) -> Result<String, BufferError> {
        let mut cached = self.cached.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let (id, created) = self
            .store
            .update(ANON_ID_KEY, |current| match current {
                Some(Value::String(id)) if !id.is_empty() => Ok((None, (id, false))),
                _ => {
                    let id = generate_id();
                    Ok((Some(Value::String(id.clone())), (id, true)))
                }
            })
            .await?;
        if created {
            tracing::info!("created anonymous installation id");
        }
        *cached = Some(id.clone());
        Ok(id)
    }
}

/// Four random 32-bit values joined by `-`.
fn generate_id() -> String {
    (0..4)
        .map(|_| rand::random::<u32>().to_string())
        .collect::<Vec<_>>()
        .join("-")
}

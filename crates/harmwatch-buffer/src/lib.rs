//! Persistent local state: the outbound queue, the installation's anonymous
//! identity, and the prompt preferences written by the settings UI.
//!
//! Everything sits on a [`KeyValueStore`]. Each read-modify-write cycle is a
//! single [`KeyValueStore::update`], so concurrent producers never overwrite
//! one another's changes, even across processes sharing one store file.

pub mod error;
pub mod identity;
pub mod preferences;
pub mod queue;
pub mod store;

pub use error::BufferError;
pub use identity::AnonymousIdentity;
pub use preferences::{load_preferences, record_prompt, save_preferences};
pub use queue::DurableQueue;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Store key holding the queued entries.
pub const BUFFER_KEY: &str = "fb_buffer";
/// Store key holding the anonymous installation id.
pub const ANON_ID_KEY: &str = "anon_id";

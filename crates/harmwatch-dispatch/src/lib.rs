//! Periodic delivery of queued records to the remote collector.
//!
//! [`BatchDispatcher::tick`] drains one batch from the
//! [`harmwatch_buffer::DurableQueue`], posts it with a [`CollectorClient`],
//! and puts the batch back at the front of the queue if delivery fails.
//! Delivery is at-least-once: a batch accepted remotely whose response is
//! lost is sent again on a later tick.

pub mod client;
pub mod dispatcher;
pub mod error;

pub use client::{CollectorClient, DeliveryRequest};
pub use dispatcher::{BatchDispatcher, FlushSummary, TickOutcome};
pub use error::DispatchError;

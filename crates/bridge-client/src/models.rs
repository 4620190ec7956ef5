//! Wire types exchanged with the bridge API.
//!
//! These are pure data contracts: the completion request/response pair, the
//! streamed event variants, routing targets, and the discovery records. All
//! of them serialize to exactly what the bridge speaks, so nothing here
//! carries behavior beyond constructors and accessors.

pub mod discovery;
pub mod event;
pub mod message;
pub mod target;

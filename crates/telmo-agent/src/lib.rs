//! Agent tool adapter and result classifier.
//!
//! The conversational agent calls backend operations as "tools". This
//! crate translates an agent's structured tool invocation into a
//! backend call and translates the raw outcome back into the verdict
//! envelope the orchestrator consumes to decide whether to re-invoke
//! the same tool call:
//!
//! - [`params`]: canonicalization of parameter-name synonyms and typed
//!   extraction — the ledger's input contract stays strict, synonym
//!   tolerance lives only here.
//! - [`client`]: the HTTP backend client; transport faults become
//!   classifiable outcomes, never panics.
//! - [`classifier`]: the pure, total mapping from `(status, body,
//!   transport error)` to `{actionStatus, shouldRetry, details}`.
//! - [`adapter`]: the tool invocation/response envelopes and the
//!   end-to-end handler.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod adapter;
pub mod classifier;
pub mod client;
pub mod params;

pub use adapter::{BackendApi, ToolAdapter, ToolInvocation, ToolResponse};
pub use classifier::{classify, ActionStatus, ApiOutcome, Verdict};
pub use client::{BackendClient, ClientOptions};
pub use params::{AdapterError, ToolParams};

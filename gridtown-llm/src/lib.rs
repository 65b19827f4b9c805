//! # gridtown-llm — Remote Completion Client
//!
//! One distinguished agent in the town is answered by a remote LLM
//! pipeline instead of a canned table. This crate owns that single call:
//!
//! - `POST {base}/api/agent-response` with body
//!   `{"agentName": ..., "userMessage": ...}`
//! - expects `{"response": ...}` back
//! - any non-success status or malformed body is a failure
//!
//! Failures are terminal here: they are logged by the caller and never
//! retried — a failed completion leaves the session usable and the player
//! free to keep typing. A client can also be constructed disabled, in
//! which case every call reports the endpoint as unavailable.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod types;

pub use client::CompletionClient;
pub use error::CompletionError;
pub use types::{CompletionReply, CompletionRequest};

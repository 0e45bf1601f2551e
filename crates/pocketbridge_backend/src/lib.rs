//! POCKETBRIDGE Backend Client
//!
//! Typed PocketBase operations and the HTTP client that executes them.
//! Each call is a single round trip; failures come back as [`RawFailure`]s
//! for the response shaper to classify.
//!
//! [`RawFailure`]: pocketbridge_core::RawFailure

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod operation;

pub use client::{Backend, BackendConfig, BackendError, HttpBackend};
pub use operation::{ListQuery, Method, Operation, Request};

//! POCKETBRIDGE Server
//!
//! Model Context Protocol server over stdio. Each line on stdin is one
//! JSON-RPC 2.0 message; responses are written to stdout one per line. Logs go
//! to stderr so they never interleave with the protocol stream.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod rpc;
pub mod server;

pub use config::{AdminCredentials, Args, DEFAULT_LOG_FILTER};
pub use rpc::{Request, Response, RpcError};
pub use server::{McpServer, ServerError};

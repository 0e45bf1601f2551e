//! POCKETBRIDGE Tools
//!
//! The catalog of tools exposed to the agent, their parameter validation, and
//! the [`ToolHost`] that dispatches a call and shapes its outcome.
//!
//! A call flows through the host in a fixed order: the `format` argument is
//! split off, the tool is looked up, its access level is checked against the
//! shared credential, parameters are validated, at most one backend operation
//! runs, and the result or failure is rendered by the response shaper.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod host;
pub mod present;
pub mod registry;
pub mod schema;
pub mod tool;
pub mod validate;

#[cfg(test)]
mod testing;

pub use catalog::{BackendTool, Plan};
pub use host::ToolHost;
pub use present::Present;
pub use registry::{RegistryError, ToolEntry, ToolRegistry};
pub use schema::{Access, ToolSchema};
pub use tool::{Tool, ToolContext};
pub use validate::{FieldErrors, Paging, Params, parse_params};

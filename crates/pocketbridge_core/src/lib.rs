//! POCKETBRIDGE Core Types
//!
//! Pure types with no I/O: the renderable value tree, output formats,
//! the error taxonomy, paged list results, and the shared auth context.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod envelope;
pub mod error;
pub mod failure;
pub mod format;
pub mod paged;
pub mod value;

// Re-exports
pub use auth::{AuthContext, Credential};
pub use envelope::{ErrorEnvelope, ErrorKind};
pub use error::{CoreError, CoreResult};
pub use failure::RawFailure;
pub use format::OutputFormat;
pub use paged::PagedResult;
pub use value::{Mapping, MappingExt, Value};

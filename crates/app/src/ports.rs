//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the pipeline and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod provider;
pub mod transport;

pub use provider::{DynProvider, Provider, ProviderConfig};
pub use transport::{Transport, TransportError};

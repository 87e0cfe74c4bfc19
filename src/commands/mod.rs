//! CLI command implementations
//!
//! Every module command opens its transport, wraps it in an `IsrModule`
//! and runs one facade operation. The transport is dropped on return.

mod list;
mod listen;
mod module;
mod table;

pub use list::list_transports;
pub use listen::run_listen;
pub use module::{run_init, run_probe, run_set_model, run_set_wake};
pub use table::{run_add, run_delete, run_provision, DeleteTarget};

use crate::transports;
use isrmod_core::device::IsrModule;
use isrmod_core::transport::RegisterTransport;

/// Module handle over whichever transport the user picked
pub type Module = IsrModule<Box<dyn RegisterTransport>>;

/// Open the transport named by `spec` and wrap it
pub fn open_module(spec: &str) -> Result<Module, Box<dyn std::error::Error>> {
    let transport = transports::open_transport(spec)?;
    Ok(IsrModule::new(transport))
}

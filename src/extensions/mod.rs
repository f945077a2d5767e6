//! Extension system for queuebot
//! 
//! An extension unit is a named feature module exposing handler factories and an
//! optional setup hook through a registration function. The registry resolves
//! discovered names against an [`ExtensionCatalog`] of those functions.

pub mod discovery;
pub mod handler;
pub mod meta;
pub mod queue;
pub mod registry;

pub use discovery::discover;
pub use handler::{ExtensionCatalog, ExtensionUnit, Handler, HandlerFactory, SetupHook};
pub use registry::{ExtensionRegistry, LoadReport, LoadedExtension};

/// Catalog of the extensions compiled into this binary
pub fn builtin_catalog() -> ExtensionCatalog {
    ExtensionCatalog::new()
        .register("meta", meta::extension)
        .register("queue", queue::extension)
}

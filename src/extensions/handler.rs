//! Extension unit and handler definitions

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::ExtensionError;
use crate::application::services::Runtime;
use crate::domain::entities::Command;

/// An object exposing invokable commands, constructed with the runtime handle
pub trait Handler: Send + Sync {
    /// Human-readable handler name
    fn name(&self) -> &str;

    /// Commands this handler contributes
    fn commands(self: Arc<Self>) -> Vec<Command>;

    /// Optional: Release resources when the owning extension is unloaded
    fn unload(&self) {}
}

/// Constructs one handler from the runtime handle
pub type HandlerFactory =
    Arc<dyn Fn(&Runtime) -> Result<Arc<dyn Handler>, ExtensionError> + Send + Sync>;

/// Runs after every handler of a unit has been constructed
pub type SetupHook = Arc<dyn Fn(&Runtime) -> Result<(), ExtensionError> + Send + Sync>;

/// A loadable feature module: its handler factories and optional setup hook
pub struct ExtensionUnit {
    pub name: String,
    pub handlers: Vec<HandlerFactory>,
    pub setup: Option<SetupHook>,
}

impl ExtensionUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
            setup: None,
        }
    }

    pub fn with_handler<F, H>(mut self, factory: F) -> Self
    where
        F: Fn(&Runtime) -> Result<H, ExtensionError> + Send + Sync + 'static,
        H: Handler + 'static,
    {
        self.handlers.push(Arc::new(move |runtime: &Runtime| {
            factory(runtime).map(|h| Arc::new(h) as Arc<dyn Handler>)
        }));
        self
    }

    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&Runtime) -> Result<(), ExtensionError> + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }
}

/// The registration function every extension unit exposes
pub type RegisterFn = Arc<dyn Fn() -> ExtensionUnit + Send + Sync>;

/// Extension name to registration function
#[derive(Clone, Default)]
pub struct ExtensionCatalog {
    units: HashMap<String, RegisterFn>,
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, register: F) -> Self
    where
        F: Fn() -> ExtensionUnit + Send + Sync + 'static,
    {
        self.units.insert(name.into(), Arc::new(register));
        self
    }

    /// Build the named unit, if known
    pub fn resolve(&self, name: &str) -> Option<ExtensionUnit> {
        self.units.get(name).map(|register| register())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.units.keys().cloned().collect();
        names.sort();
        names
    }
}

//! Extension registry - Loads extension units and owns the command table

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::handler::{ExtensionCatalog, Handler};
use crate::application::errors::ExtensionError;
use crate::application::services::Runtime;
use crate::domain::entities::{Command, CommandRegistry};

/// A loaded extension and the handlers it registered
pub struct LoadedExtension {
    pub name: String,
    pub handlers: Vec<Arc<dyn Handler>>,
    pub commands: Vec<String>,
}

/// Outcome of loading a directory of extensions
#[derive(Debug)]
pub struct LoadReport {
    /// Names loaded once startup loading finished, in load order
    pub to_load: Arc<[String]>,
    /// Extensions that failed to load; the rest were still loaded
    pub failed: Vec<ExtensionError>,
}

/// Registry for loaded extensions
pub struct ExtensionRegistry {
    catalog: ExtensionCatalog,
    runtime: Runtime,
    loaded: Vec<LoadedExtension>,
    commands: CommandRegistry,
    /// Per-extension dispatch gate. Survives reloads so waiters keep a valid handle.
    gates: HashMap<String, Arc<RwLock<()>>>,
}

impl ExtensionRegistry {
    pub fn new(catalog: ExtensionCatalog, runtime: Runtime) -> Self {
        Self {
            catalog,
            runtime,
            loaded: Vec::new(),
            commands: CommandRegistry::new(),
            gates: HashMap::new(),
        }
    }

    /// Load every discovered candidate. Individual failures are logged and collected.
    pub fn load_all(&mut self, names: Vec<String>) -> LoadReport {
        info!("Loading extensions: {:?}", names);

        let mut failed = Vec::new();
        for name in names {
            if let Err(e) = self.load(&name) {
                warn!("{}", e);
                failed.push(e);
            }
        }

        let to_load: Arc<[String]> = self.loaded_names().into();
        info!("To load: {:?}", to_load);
        LoadReport { to_load, failed }
    }

    /// Resolve, instantiate and register one extension.
    ///
    /// All-or-nothing: commands are only registered once every handler has been
    /// built and the setup hook succeeded.
    pub fn load(&mut self, name: &str) -> Result<(), ExtensionError> {
        if self.is_loaded(name) {
            return Err(ExtensionError::load(name, "already loaded"));
        }
        let unit = self
            .catalog
            .resolve(name)
            .ok_or_else(|| ExtensionError::load(name, "no such extension unit"))?;

        let mut handlers: Vec<Arc<dyn Handler>> = Vec::with_capacity(unit.handlers.len());
        for factory in &unit.handlers {
            match factory(&self.runtime) {
                Ok(handler) => {
                    info!("Automatically adding handler: {}", handler.name());
                    handlers.push(handler);
                }
                Err(e) => return Err(abort(name, handlers, e)),
            }
        }

        let staged = match self.stage_commands(name, &handlers) {
            Ok(staged) => staged,
            Err(e) => return Err(abort(name, handlers, e)),
        };

        if let Some(setup) = &unit.setup {
            if let Err(e) = setup(&self.runtime) {
                return Err(abort(name, handlers, e));
            }
        }

        let mut command_names = Vec::with_capacity(staged.len());
        for command in staged {
            command_names.push(command.name.clone());
            self.commands
                .register(command)
                .map_err(|cause| ExtensionError::load(name, cause))?;
        }

        self.gates.entry(name.to_string()).or_default();
        self.loaded.push(LoadedExtension {
            name: name.to_string(),
            handlers,
            commands: command_names,
        });
        info!("Loaded extension: {}", name);
        Ok(())
    }

    /// Collect the handlers' commands, rejecting any name or alias already taken
    fn stage_commands(
        &self,
        name: &str,
        handlers: &[Arc<dyn Handler>],
    ) -> Result<Vec<Command>, ExtensionError> {
        let mut staged: Vec<Command> = Vec::new();
        let mut keys = HashSet::new();
        for handler in handlers {
            for mut command in Arc::clone(handler).commands() {
                command.extension = name.to_string();
                let clash = self
                    .commands
                    .conflict(&command)
                    .map(str::to_string)
                    .or_else(|| {
                        command
                            .keys()
                            .find(|k| !keys.insert(k.to_lowercase()))
                            .map(str::to_string)
                    });
                if let Some(key) = clash {
                    return Err(ExtensionError::load(
                        name,
                        format!("command or alias '{}' is already registered", key),
                    ));
                }
                staged.push(command);
            }
        }
        Ok(staged)
    }

    /// Drop an extension's commands and notify its handlers
    pub fn unload(&mut self, name: &str) -> Result<(), ExtensionError> {
        let index = self
            .loaded
            .iter()
            .position(|ext| ext.name == name)
            .ok_or_else(|| ExtensionError::NotLoaded(name.to_string()))?;

        let extension = self.loaded.remove(index);
        self.commands.remove_extension(name);
        for handler in &extension.handlers {
            handler.unload();
        }
        info!("Unloaded extension: {}", name);
        Ok(())
    }

    pub fn reload(&mut self, name: &str) -> Result<(), ExtensionError> {
        self.unload(name)?;
        self.load(name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.iter().any(|ext| ext.name == name)
    }

    /// Loaded extension names, in load order
    pub fn loaded_names(&self) -> Vec<String> {
        self.loaded.iter().map(|ext| ext.name.clone()).collect()
    }

    pub fn extension(&self, name: &str) -> Option<&LoadedExtension> {
        self.loaded.iter().find(|ext| ext.name == name)
    }

    pub fn find_command(&self, name: &str) -> Option<Arc<Command>> {
        self.commands.find(name)
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Dispatch gate for an extension. Readers are in-flight commands; reloads take the write side.
    pub fn gate(&self, name: &str) -> Arc<RwLock<()>> {
        self.gates.get(name).cloned().unwrap_or_default()
    }
}

/// Undo a partially constructed unit
fn abort(name: &str, handlers: Vec<Arc<dyn Handler>>, err: ExtensionError) -> ExtensionError {
    for handler in &handlers {
        handler.unload();
    }
    let err = match err {
        ExtensionError::Load { .. } => err,
        other => ExtensionError::load(name, other.to_string()),
    };
    warn!("Discarding extension '{}' after failed load", name);
    err
}

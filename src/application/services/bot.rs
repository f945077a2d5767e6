//! Bot runtime shell - lifecycle hooks driving the registry and the dispatcher

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::runtime::Runtime;
use crate::application::errors::{BotError, ExtensionError};
use crate::application::messaging::{CommandDispatcher, Context, MessageParser, RouterOutcome};
use crate::domain::entities::Message;
use crate::extensions::{discover, ExtensionCatalog, ExtensionRegistry, LoadReport};

/// Owns process-wide state and exposes `ready`, `on_message` and `close`
pub struct Queuebot {
    runtime: Runtime,
    parser: MessageParser,
    registry: RwLock<ExtensionRegistry>,
    /// Serializes load, unload and reload
    reload_lock: Mutex<()>,
    ready: watch::Sender<bool>,
    /// Extensions loaded at startup. The live set changes during reloads.
    to_load: RwLock<Arc<[String]>>,
}

impl Queuebot {
    pub fn new(runtime: Runtime, catalog: ExtensionCatalog) -> Self {
        let parser = MessageParser::new(runtime.config().bot.prefix.clone());
        let registry = ExtensionRegistry::new(catalog, runtime.clone());
        let (ready, _) = watch::channel(false);
        Self {
            runtime,
            parser,
            registry: RwLock::new(registry),
            reload_lock: Mutex::new(()),
            ready,
            to_load: RwLock::new(Arc::from(Vec::new())),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Load every extension in the configured directory
    pub async fn load_extensions(&self) -> Result<LoadReport, ExtensionError> {
        let directory = self.runtime.config().extensions.directory.clone();
        self.load_extensions_from(directory).await
    }

    /// Discovery runs before any lock is taken
    pub async fn load_extensions_from(
        &self,
        directory: impl AsRef<Path>,
    ) -> Result<LoadReport, ExtensionError> {
        let names = discover(directory).await?;
        let _serial = self.reload_lock.lock().await;
        let report = self.registry.write().await.load_all(names);
        *self.to_load.write().await = Arc::clone(&report.to_load);
        Ok(report)
    }

    /// Startup snapshot of loaded extension names
    pub async fn to_load(&self) -> Arc<[String]> {
        Arc::clone(&*self.to_load.read().await)
    }

    pub async fn loaded_extensions(&self) -> Vec<String> {
        self.registry.read().await.loaded_names()
    }

    pub async fn command_names(&self) -> Vec<String> {
        self.registry.read().await.commands().names()
    }

    pub async fn load(&self, name: &str) -> Result<(), ExtensionError> {
        let _serial = self.reload_lock.lock().await;
        let gate = self.registry.read().await.gate(name);
        let _exclusive = gate.write().await;
        self.registry.write().await.load(name)
    }

    /// Waits for in-flight commands of the extension to finish first
    pub async fn unload(&self, name: &str) -> Result<(), ExtensionError> {
        let _serial = self.reload_lock.lock().await;
        let gate = self.registry.read().await.gate(name);
        let _exclusive = gate.write().await;
        self.registry.write().await.unload(name)
    }

    /// Waits for in-flight commands of the extension to finish first
    pub async fn reload(&self, name: &str) -> Result<(), ExtensionError> {
        let _serial = self.reload_lock.lock().await;
        let gate = self.registry.read().await.gate(name);
        let _exclusive = gate.write().await;
        let result = self.registry.write().await.reload(name);
        match &result {
            Ok(()) => {
                info!("Reloaded extension: {}", name);
                if let Err(e) = self.runtime.log(&format!("Reloaded `{}`.", name)).await {
                    warn!("Failed to post to bot log: {}", e);
                }
            }
            Err(e) => warn!("Reload of '{}' failed: {}", name, e),
        }
        result
    }

    /// Reload everything in the startup snapshot. Names no longer loaded are loaded again.
    pub async fn reload_all(&self) -> Vec<ExtensionError> {
        let mut failed = Vec::new();
        for name in self.to_load().await.iter() {
            let loaded = self.registry.read().await.is_loaded(name);
            let result = if loaded { self.reload(name).await } else { self.load(name).await };
            if let Err(e) = result {
                failed.push(e);
            }
        }
        failed
    }

    /// Startup handshake finished. The ready signal fires only the first time.
    pub async fn ready(&self) -> Result<(), BotError> {
        let info = self.runtime.chat().application_info().await?;
        self.runtime.set_owner(info.owner).await;

        let fired = self.ready.send_if_modified(|ready| !std::mem::replace(ready, true));
        if fired {
            info!("Ready! Logged in as {} ({})", info.user.username, info.user.id);
            match self.runtime.blob_emoji().await {
                Ok(Some(guild)) => info!("Blob emoji guild: {} ({})", guild.name, guild.id),
                Ok(None) => debug!("No blob emoji guild"),
                Err(e) => warn!("Failed to look up blob emoji guild: {}", e),
            }
        } else {
            debug!("Ready again after reconnect");
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub async fn wait_until_ready(&self) {
        let mut ready = self.ready.subscribe();
        // The sender lives as long as `self`, so this only returns once ready.
        let _ = ready.wait_for(|ready| *ready).await;
    }

    /// Handle one inbound message and send any reply back to its channel
    pub async fn on_message(&self, message: Message) -> Result<RouterOutcome, BotError> {
        if message.author.is_bot {
            return Ok(RouterOutcome::Ignored);
        }

        self.wait_until_ready().await;

        let Some(invocation) = self.parser.parse(&message) else {
            return Ok(RouterOutcome::Unhandled);
        };
        let channel_id = message.channel_id;
        let ctx = Context::new(message, invocation, self.runtime.clone());

        let outcome = CommandDispatcher::route(&self.registry, ctx).await;
        if let Some(reply) = outcome.reply() {
            self.runtime.chat().send_message(channel_id, reply).await?;
        }
        Ok(outcome)
    }

    /// Unload in reverse load order, each after its in-flight commands finish
    pub async fn close(&self) -> Result<(), BotError> {
        info!("Closing.");
        let _serial = self.reload_lock.lock().await;
        let loaded = self.registry.read().await.loaded_names();
        for name in loaded.into_iter().rev() {
            let gate = self.registry.read().await.gate(&name);
            let _exclusive = gate.write().await;
            if let Err(e) = self.registry.write().await.unload(&name) {
                warn!("Failed to unload '{}': {}", name, e);
            }
        }
        self.runtime.store().close().await?;
        Ok(())
    }
}

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::application::converters::{Argument, Converter};
use crate::application::errors::CommandError;
use crate::application::messaging::Context;

/// Text sent back to the invoking channel, if any
pub type Reply = Option<String>;

pub type CommandFuture = Pin<Box<dyn Future<Output = Result<Reply, CommandError>> + Send>>;

/// Command callback type. Receives the bound arguments in declaration order.
pub type CommandCallback = Arc<dyn Fn(Context, Vec<Argument>) -> CommandFuture + Send + Sync>;

/// A declared command parameter
#[derive(Clone)]
pub struct Param {
    pub name: String,
    pub converter: Arc<dyn Converter>,
    /// Consumes the rest of the line instead of a single token
    pub greedy: bool,
}

impl Param {
    pub fn new<C: Converter + 'static>(name: impl Into<String>, converter: C) -> Self {
        Self {
            name: name.into(),
            converter: Arc::new(converter),
            greedy: false,
        }
    }

    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }
}

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub aliases: Vec<String>,
    pub params: Vec<Param>,
    pub owner_only: bool,
    /// Owners and holders of a council role
    pub council_only: bool,
    /// Owning extension, filled in by the registry
    pub extension: String,
    pub handler: CommandCallback,
}

impl Command {
    pub fn new<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context, Vec<Argument>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, CommandError>> + Send + 'static,
    {
        let handler: CommandCallback = Arc::new(move |ctx: Context, args: Vec<Argument>| {
            Box::pin(handler(ctx, args)) as CommandFuture
        });
        Self {
            name: name.into(),
            aliases: Vec::new(),
            params: Vec::new(),
            owner_only: false,
            council_only: false,
            extension: String::new(),
            handler,
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    pub fn council_only(mut self) -> Self {
        self.council_only = true;
        self
    }

    /// Name followed by aliases
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("params", &self.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>())
            .field("extension", &self.extension)
            .finish()
    }
}

/// Command table, keyed by lowercased name and alias
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first key already taken by another command, if any.
    pub fn conflict<'a>(&self, command: &'a Command) -> Option<&'a str> {
        command.keys().find(|k| self.commands.contains_key(&k.to_lowercase()))
    }

    /// Register a command under its name and aliases. Fails on a taken key.
    pub fn register(&mut self, command: Command) -> Result<(), String> {
        if let Some(key) = self.conflict(&command) {
            return Err(format!("command or alias '{}' is already registered", key));
        }
        let command = Arc::new(command);
        for key in command.keys() {
            self.commands.insert(key.to_lowercase(), Arc::clone(&command));
        }
        Ok(())
    }

    pub fn find(&self, input: &str) -> Option<Arc<Command>> {
        self.commands.get(&input.to_lowercase()).cloned()
    }

    /// Drop every command owned by `extension`
    pub fn remove_extension(&mut self, extension: &str) -> usize {
        let before = self.len();
        self.commands.retain(|_, c| c.extension != extension);
        before - self.len()
    }

    /// Distinct command names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .values()
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of distinct commands
    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str) -> Command {
        Command::new(name, |_ctx, _args| async { Ok(None) })
    }

    fn owned(name: &str, ext: &str) -> Command {
        let mut cmd = command(name).with_aliases(vec![format!("{}-alias", name)]);
        cmd.extension = ext.to_string();
        cmd
    }

    #[test]
    fn test_find_is_case_insensitive_and_uses_aliases() {
        let mut registry = CommandRegistry::new();
        registry.register(owned("preview", "queue")).unwrap();

        assert!(registry.find("PREVIEW").is_some());
        assert_eq!(registry.find("preview-alias").unwrap().name, "preview");
        assert!(registry.find("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_taken_alias() {
        let mut registry = CommandRegistry::new();
        registry.register(owned("preview", "queue")).unwrap();

        let clash = command("other").with_aliases(vec!["Preview".to_string()]);
        assert!(registry.register(clash).is_err());
        assert!(registry.find("other").is_none());
    }

    #[test]
    fn test_remove_extension_only_removes_owned() {
        let mut registry = CommandRegistry::new();
        registry.register(owned("preview", "queue")).unwrap();
        registry.register(owned("ping", "meta")).unwrap();

        assert_eq!(registry.remove_extension("queue"), 1);
        assert_eq!(registry.names(), vec!["ping".to_string()]);
    }
}

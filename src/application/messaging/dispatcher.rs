//! Command dispatcher - Routes invocations to registered commands

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::application::converters::Argument;
use crate::application::errors::{CommandError, ConversionError};
use crate::domain::entities::{Command, Reply};
use crate::extensions::ExtensionRegistry;

use super::context::Context;

pub const PERMISSION_DENIED_REPLY: &str = "You are not allowed to use this command.";
pub const INTERNAL_ERROR_REPLY: &str = "Something went wrong while running that command.";

/// Result of routing one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterOutcome {
    /// Dropped before routing (automated author)
    Ignored,
    /// Not a command, or no such command
    Unhandled,
    /// Callback ran
    Invoked { command: String, reply: Reply },
    /// Binding or the callback failed; `message` goes back to the user
    Rejected { command: String, message: String },
}

impl RouterOutcome {
    /// Text to send back to the invoking channel
    pub fn reply(&self) -> Option<&str> {
        match self {
            RouterOutcome::Invoked { reply, .. } => reply.as_deref(),
            RouterOutcome::Rejected { message, .. } => Some(message),
            RouterOutcome::Ignored | RouterOutcome::Unhandled => None,
        }
    }
}

/// Bind every declared parameter in order. Stops at the first failure.
pub async fn bind_arguments(
    command: &Command,
    ctx: &Context,
) -> Result<Vec<Argument>, ConversionError> {
    let mut tokens = ctx.invocation.args.iter();
    let mut bound = Vec::with_capacity(command.params.len());

    for param in &command.params {
        let token = if param.greedy {
            let rest: Vec<&str> = tokens.by_ref().map(String::as_str).collect();
            (!rest.is_empty()).then(|| rest.join(" "))
        } else {
            tokens.next().cloned()
        };
        let token = token.ok_or_else(|| {
            ConversionError::bad_argument(format!("Missing required argument: {}.", param.name))
        })?;
        bound.push(param.converter.convert(ctx, &token).await?);
    }
    Ok(bound)
}

/// Check permissions, bind arguments, run the callback
pub async fn invoke(command: &Command, ctx: Context) -> RouterOutcome {
    let name = command.name.clone();
    let rejected = |message: String| RouterOutcome::Rejected {
        command: name.clone(),
        message,
    };

    if !permitted(command, &ctx).await {
        return rejected(PERMISSION_DENIED_REPLY.to_string());
    }

    let args = match bind_arguments(command, &ctx).await {
        Ok(args) => args,
        Err(e) => return rejected(user_message(&name, e.into())),
    };

    match (command.handler)(ctx, args).await {
        Ok(reply) => RouterOutcome::Invoked {
            command: name.clone(),
            reply,
        },
        Err(e) => rejected(user_message(&name, e)),
    }
}

async fn permitted(command: &Command, ctx: &Context) -> bool {
    if !command.owner_only && !command.council_only {
        return true;
    }
    let runtime = ctx.runtime();
    if runtime.is_owner(ctx.author()).await {
        return true;
    }
    !command.owner_only && runtime.is_council(ctx.author())
}

fn user_message(command: &str, err: CommandError) -> String {
    match err {
        CommandError::BadArgument(msg) => msg,
        CommandError::PermissionDenied => PERMISSION_DENIED_REPLY.to_string(),
        CommandError::ExecutionFailed(cause) => {
            error!("Command '{}' failed: {}", command, cause);
            INTERNAL_ERROR_REPLY.to_string()
        }
    }
}

/// Command dispatcher
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Look the command up and run it while holding its extension's gate.
    ///
    /// The registry lock is only held for lookups, never across the callback.
    /// The command is looked up again once the gate is held. If another
    /// extension owns it by then, the gate is released and the owner's taken.
    pub async fn route(registry: &RwLock<ExtensionRegistry>, ctx: Context) -> RouterOutcome {
        let name = ctx.invocation.name.clone();

        let found = registry.read().await.find_command(&name);
        let Some(command) = found else {
            debug!("Ignoring unknown command '{}'", name);
            return RouterOutcome::Unhandled;
        };
        let mut owner = command.extension.clone();

        loop {
            let gate = registry.read().await.gate(&owner);
            let _guard = gate.read_owned().await;

            let current: Option<Arc<Command>> = registry.read().await.find_command(&name);
            match current {
                Some(command) if command.extension == owner => return invoke(&command, ctx).await,
                Some(command) => {
                    debug!(
                        "Command '{}' moved from '{}' to '{}' before dispatch",
                        name, owner, command.extension
                    );
                    owner = command.extension.clone();
                }
                None => {
                    debug!("Command '{}' was unloaded before dispatch", name);
                    return RouterOutcome::Unhandled;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::converters::{Converter, PartialSuggestionConverter, TextConverter};
    use crate::application::messaging::context::tests::test_context;
    use crate::domain::entities::Param;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Rejects every token, counting how often it was asked
    struct Rejecting {
        message: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Converter for Rejecting {
        async fn convert(&self, _ctx: &Context, _token: &str) -> Result<Argument, ConversionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ConversionError::bad_argument(self.message))
        }
    }

    fn counting_command(calls: &Arc<AtomicUsize>) -> Command {
        let calls = Arc::clone(calls);
        Command::new("preview", move |_ctx, args| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(format!("{} args", args.len())))
            }
        })
        .with_param(Param::new("first", TextConverter))
        .with_param(Param::new("image", PartialSuggestionConverter::new()))
    }

    #[tokio::test]
    async fn test_failed_binding_skips_handler() {
        let (mut ctx, _chat, _store) = test_context("ignored");
        ctx.invocation.args = vec!["a".to_string(), "banana".to_string()];
        let calls = Arc::new(AtomicUsize::new(0));

        let outcome = invoke(&counting_command(&calls), ctx).await;
        assert_eq!(outcome.reply(), Some("Couldn't resolve to suggestion or image."));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_argument_is_reported() {
        let (mut ctx, _chat, _store) = test_context("ignored");
        ctx.invocation.args = vec!["a".to_string()];
        let calls = Arc::new(AtomicUsize::new(0));

        let outcome = invoke(&counting_command(&calls), ctx).await;
        assert_eq!(outcome.reply(), Some("Missing required argument: image."));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_failing_param_is_reported() {
        let (mut ctx, _chat, _store) = test_context("ignored");
        ctx.invocation.args = vec!["x".to_string(), "y".to_string()];
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let command = Command::new("pair", |_ctx, _args| async { Ok(Some("bound".to_string())) })
            .with_param(Param::new(
                "left",
                Rejecting {
                    message: "Bad left.",
                    calls: Arc::clone(&first),
                },
            ))
            .with_param(Param::new(
                "right",
                Rejecting {
                    message: "Bad right.",
                    calls: Arc::clone(&second),
                },
            ));

        let outcome = invoke(&command, ctx).await;
        assert_eq!(outcome.reply(), Some("Bad left."));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_greedy_param_takes_rest() {
        let (mut ctx, _chat, _store) = test_context("ignored");
        ctx.invocation.args = vec!["hello".to_string(), "big".to_string(), "world".to_string()];
        let command = Command::new("echo", |_ctx, args| async move {
            Ok(args.first().and_then(Argument::as_text).map(str::to_string))
        })
        .with_param(Param::new("text", TextConverter).greedy());

        let outcome = invoke(&command, ctx).await;
        assert_eq!(outcome.reply(), Some("hello big world"));
    }

    #[tokio::test]
    async fn test_owner_only_rejects_regular_user() {
        let (ctx, _chat, _store) = test_context("x");
        let command =
            Command::new("uptime", |_ctx, _args| async { Ok(Some("up".to_string())) }).owner_only();

        let outcome = invoke(&command, ctx).await;
        assert_eq!(outcome.reply(), Some(PERMISSION_DENIED_REPLY));
    }

    #[tokio::test]
    async fn test_council_only_accepts_council_role() {
        use crate::application::services::Runtime;
        use crate::domain::entities::{Message, User};
        use crate::infrastructure::adapters::memory::MemoryChat;
        use crate::infrastructure::config::Config;
        use crate::infrastructure::storage::MemoryStore;

        let mut config = Config::default();
        config.bot.council_roles = vec![42];
        let chat = Arc::new(MemoryChat::new());
        let runtime = Runtime::new(config, chat, Arc::new(MemoryStore::new()));
        let (base, _chat, _store) = test_context("x");
        let command =
            Command::new("approve", |_ctx, _args| async { Ok(Some("approved".to_string())) })
                .council_only();

        let member = Message::new(1, 2, User::new(3, "carol").with_roles(vec![42]), "!approve");
        let ctx = Context::new(member, base.invocation.clone(), runtime.clone());
        assert_eq!(invoke(&command, ctx).await.reply(), Some("approved"));

        let outsider = Message::new(4, 2, User::new(5, "dave").with_roles(vec![7]), "!approve");
        let ctx = Context::new(outsider, base.invocation.clone(), runtime);
        assert_eq!(invoke(&command, ctx).await.reply(), Some(PERMISSION_DENIED_REPLY));
    }

    #[tokio::test]
    async fn test_execution_failure_is_generic() {
        let (ctx, _chat, _store) = test_context("x");
        let command = Command::new("boom", |_ctx, _args| async {
            Err(CommandError::ExecutionFailed("database on fire".to_string()))
        });

        let outcome = invoke(&command, ctx).await;
        assert_eq!(outcome.reply(), Some(INTERNAL_ERROR_REPLY));
    }
}

//! Meta extension - liveness and housekeeping commands

use std::sync::Arc;

use crate::application::converters::{Argument, TextConverter};
use crate::application::services::Runtime;
use crate::domain::entities::{Command, Param};
use crate::extensions::{ExtensionUnit, Handler};

pub struct Meta {
    runtime: Runtime,
}

impl Meta {
    pub fn new(runtime: &Runtime) -> Self {
        Self {
            runtime: runtime.clone(),
        }
    }
}

impl Handler for Meta {
    fn name(&self) -> &str {
        "Meta"
    }

    fn commands(self: Arc<Self>) -> Vec<Command> {
        vec![
            Command::new("ping", |_ctx, _args| async { Ok(Some("Pong!".to_string())) }),
            Command::new("uptime", move |_ctx, _args| {
                let uptime = self.runtime.uptime();
                async move {
                    Ok(Some(format!(
                        "Up for {}h {}m.",
                        uptime.num_hours(),
                        uptime.num_minutes() % 60
                    )))
                }
            })
            .owner_only(),
            Command::new("echo", |_ctx, args| async move {
                Ok(args.first().and_then(Argument::as_text).map(str::to_string))
            })
            .with_param(Param::new("text", TextConverter).greedy()),
        ]
    }
}

pub fn extension() -> ExtensionUnit {
    ExtensionUnit::new("meta").with_handler(|runtime| Ok(Meta::new(runtime)))
}

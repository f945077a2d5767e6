//! Message parser - Splits command messages into name and argument tokens

use crate::domain::entities::Message;

/// A parsed command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub prefix: String,
    pub name: String,
    pub args: Vec<String>,
}

/// Parses incoming messages into command invocations
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Returns `None` for messages that are not commands
    pub fn parse(&self, message: &Message) -> Option<Invocation> {
        let body = message.content.strip_prefix(&self.command_prefix)?;
        let mut tokens = tokenize(body).into_iter();
        let name = tokens.next()?;

        Some(Invocation {
            prefix: self.command_prefix.clone(),
            name,
            args: tokens.collect(),
        })
    }
}

/// Whitespace-separated tokens. Double quotes group words; an unterminated
/// quote runs to the end of the input.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut has_token = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                has_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

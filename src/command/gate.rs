use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command sink unavailable: {0}")]
    SinkUnavailable(String),
    #[error("Command rejected by host: {0}")]
    Rejected(String),
}

/// Host side of the command path.
#[cfg_attr(test, mockall::automock)]
pub trait CommandSink: Send + Sync {
    fn submit_command(&self, text: &str) -> Result<(), CommandError>;
}

/// Guild membership data of the message author. Direct messages carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandAuthor {
    pub role_ids: Vec<String>,
    pub is_administrator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub channel_id: String,
    pub author: Option<CommandAuthor>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandDecision {
    /// Wrong channel, no member data, or no command channel configured.
    Ignored,
    Accepted,
    Denied,
}

impl CommandDecision {
    /// Reaction the chat integration puts on the message.
    pub fn reaction(&self) -> Option<&'static str> {
        match self {
            CommandDecision::Ignored => None,
            CommandDecision::Accepted => Some("\u{2705}"),
            CommandDecision::Denied => Some("\u{274C}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandGate {
    chat_id: Option<String>,
    role_whitelist: Vec<String>,
}

impl CommandGate {
    pub fn new(chat_id: Option<String>, role_whitelist: Vec<String>) -> Self {
        Self {
            chat_id,
            role_whitelist,
        }
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn evaluate(&self, command: &InboundCommand) -> CommandDecision {
        let Some(chat_id) = self.chat_id.as_deref() else {
            return CommandDecision::Ignored;
        };
        if command.channel_id != chat_id {
            return CommandDecision::Ignored;
        }
        let Some(author) = &command.author else {
            return CommandDecision::Ignored;
        };

        if author.is_administrator || self.has_whitelisted_role(author) {
            CommandDecision::Accepted
        } else {
            CommandDecision::Denied
        }
    }

    // Empty whitelist grants nothing.
    fn has_whitelisted_role(&self, author: &CommandAuthor) -> bool {
        author
            .role_ids
            .iter()
            .any(|role| self.role_whitelist.contains(role))
    }

    /// Evaluates the command and submits accepted text to `sink`.
    pub fn forward<K: CommandSink + ?Sized>(
        &self,
        command: &InboundCommand,
        sink: &K,
    ) -> Result<CommandDecision, CommandError> {
        let decision = self.evaluate(command);
        match decision {
            CommandDecision::Accepted => {
                sink.submit_command(&command.content).map_err(|e| {
                    warn!("Error while sending a command to the host: {e}");
                    e
                })?;
                info!("Forwarded console command from channel {}", command.channel_id);
            }
            CommandDecision::Denied => {
                debug!("Denied console command from channel {}", command.channel_id);
            }
            CommandDecision::Ignored => {}
        }
        Ok(decision)
    }
}

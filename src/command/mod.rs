//! Inbound console commands from the chat channel.
//!
//! The gate only decides whether a message may become a host command; handing
//! the text to the host happens behind [`CommandSink`].

pub mod gate;

pub use gate::{CommandAuthor, CommandDecision, CommandError, CommandGate, CommandSink, InboundCommand};

use thiserror::Error;

use crate::event::{Channel, PublisherKey};

/// Error type returned by callbacks the core invokes on behalf of other
/// components: bus handlers, action bodies, command targets.
pub type BoxError = Box<dyn std::error::Error>;

/// Structural errors raised by the broadcast bus and its queueing facade.
#[derive(Debug, Error)]
pub enum BusError {
    /// The exact (publisher, channel, handler, args) tuple was never subscribed
    #[error("receiver is not connected to channel {channel} of {publisher}")]
    NotSubscribed {
        publisher: PublisherKey,
        channel: Channel,
    },

    /// Flushing kept producing new messages past the allowed number of passes
    #[error("message queue of {publisher} still busy after {passes} flush passes")]
    FlushOverflow {
        publisher: PublisherKey,
        passes: usize,
    },

    /// `end_transaction` without a matching `begin_transaction`
    #[error("transaction count < 0 on {0}")]
    TransactionUnderflow(PublisherKey),
}

/// Errors raised by the undo/redo manager.
#[derive(Debug, Error)]
pub enum UndoError {
    #[error("malformed undo action: {0}")]
    MalformedAction(String),
}

/// Errors raised by the mode state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    /// A major mode was entered but temporary modes are still stacked
    #[error("mode stack corrupted: {0} suspended mode(s) left below a major mode")]
    StackCorrupted(usize),

    #[error("mode stack empty")]
    EmptyStack,
}

/// Errors that can occur while loading or saving preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse preferences: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid undo limit: {0:?} (expected a number or \"unlimited\")")]
    InvalidUndoLimit(String),
}

/// Errors produced by a shape when asked to run an object command.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("{class} has no command named {command}")]
    UnknownCommand {
        class: &'static str,
        command: String,
    },

    #[error("invalid argument for {command}: {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error("no object is selected")]
    NoSelection,

    #[error("selected object is a {found}, not a {expected}")]
    IncompatibleObject { expected: String, found: &'static str },

    #[error("object {0} no longer exists")]
    MissingObject(u64),
}

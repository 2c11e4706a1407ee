//! Interaction modes: which handler currently interprets pointer input.

mod stack;

use egui::{Modifiers, PointerButton, Pos2};
use serde_json::Value;

pub use stack::ModeStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Exclusive and persistent, sits at the bottom of the stack
    Major,
    /// Layered on top of the current mode and expected to terminate back to it
    Temporary,
}

/// Transition requested by a mode from inside one of its handlers.
pub enum ModeRequest {
    Enter(Box<dyn Mode>, Vec<Value>),
    ExitTemporary { cancel: bool },
}

impl std::fmt::Debug for ModeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enter(mode, args) => f.debug_tuple("Enter").field(&mode.name()).field(args).finish(),
            Self::ExitTemporary { cancel } => f.debug_struct("ExitTemporary").field("cancel", cancel).finish(),
        }
    }
}

/// Passed to the pointer handlers of a [`Mode`].
///
/// A mode cannot touch the stack that owns it while it runs, so transitions
/// are collected here and applied by the [`ModeStack`] once the handler returns.
#[derive(Debug, Default)]
pub struct ModeContext {
    requests: Vec<ModeRequest>,
}

impl ModeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_mode(&mut self, mode: Box<dyn Mode>, args: Vec<Value>) {
        self.requests.push(ModeRequest::Enter(mode, args));
    }

    pub fn exit_temporary_mode(&mut self, cancel: bool) {
        self.requests.push(ModeRequest::ExitTemporary { cancel });
    }

    pub fn cancel_temporary_mode(&mut self) {
        self.exit_temporary_mode(true);
    }

    pub fn take_requests(&mut self) -> Vec<ModeRequest> {
        std::mem::take(&mut self.requests)
    }
}

/// An interaction mode.
///
/// Handlers default to doing nothing, so a mode only implements the events
/// it cares about.
pub trait Mode {
    fn kind(&self) -> ModeKind;

    /// Stable identifier, issued on the `MODE` channel
    fn name(&self) -> &'static str;

    /// User-visible description
    fn text(&self) -> &str {
        self.name()
    }

    fn enter(&mut self, _args: &[Value]) {}

    fn on_press(&mut self, _ctx: &mut ModeContext, _pos: Pos2, _button: PointerButton, _modifiers: Modifiers) {}

    fn on_move(&mut self, _ctx: &mut ModeContext, _pos: Pos2, _modifiers: Modifiers) {}

    fn on_release(&mut self, _ctx: &mut ModeContext, _pos: Pos2, _button: PointerButton, _modifiers: Modifiers) {}

    /// Called when a major mode is replaced by another major mode
    fn exit(&mut self) {}

    /// Called when a temporary mode is abandoned before it finished
    fn cancel(&mut self) {}

    fn is_major(&self) -> bool {
        self.kind() == ModeKind::Major
    }

    fn is_temporary(&self) -> bool {
        self.kind() == ModeKind::Temporary
    }
}

/// The major mode a surface starts in before any tool is chosen.
#[derive(Debug, Default)]
pub struct IdleMode;

impl Mode for IdleMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Major
    }

    fn name(&self) -> &'static str {
        "Idle"
    }
}

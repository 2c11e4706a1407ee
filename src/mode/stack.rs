use std::rc::Rc;

use egui::{Modifiers, PointerButton, Pos2};
use serde_json::Value;

use super::{IdleMode, Mode, ModeContext, ModeKind, ModeRequest};
use crate::error::ModeError;
use crate::event::{MODE, QueueingPublisher};

/// The active mode of an interaction surface plus the modes suspended below it.
///
/// The bottom of the stack is always a major mode. Entering a major mode
/// cancels every temporary mode first, so a major mode never sits above a
/// non-empty stack. Every transition is announced on the `MODE` channel of
/// the owning surface.
pub struct ModeStack {
    current: Box<dyn Mode>,
    suspended: Vec<Box<dyn Mode>>,
    publisher: Rc<QueueingPublisher>,
}

impl std::fmt::Debug for ModeStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeStack")
            .field("current", &self.current.name())
            .field("suspended", &self.suspended.iter().map(|m| m.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl ModeStack {
    pub fn new(publisher: Rc<QueueingPublisher>) -> Self {
        Self {
            current: Box::new(IdleMode),
            suspended: Vec::new(),
            publisher,
        }
    }

    pub fn current(&self) -> &dyn Mode {
        self.current.as_ref()
    }

    pub fn mode_name(&self) -> &'static str {
        self.current.name()
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.current.kind()
    }

    /// Number of suspended modes below the current one.
    pub fn depth(&self) -> usize {
        self.suspended.len()
    }

    pub fn is_temporary_active(&self) -> bool {
        self.current.is_temporary()
    }

    /// Makes `mode` current.
    ///
    /// A major mode first cancels all temporary modes, top to bottom, then
    /// replaces the major mode below them. A temporary mode is pushed on top.
    pub fn enter_mode(&mut self, mode: Box<dyn Mode>, args: &[Value]) -> Result<(), ModeError> {
        match mode.kind() {
            ModeKind::Major => {
                while self.current.is_temporary() {
                    self.current.cancel();
                    self.pop_mode()?;
                }
                if !self.suspended.is_empty() || !self.current.is_major() {
                    return Err(ModeError::StackCorrupted(self.suspended.len()));
                }
                self.current.exit();
                log::debug!("major mode {} -> {}", self.current.name(), mode.name());
                self.current = mode;
                self.current.enter(args);
            }
            ModeKind::Temporary => {
                log::debug!("temporary mode {} over {}", mode.name(), self.current.name());
                self.push_mode(mode);
                self.current.enter(args);
            }
        }
        self.issue_mode();
        Ok(())
    }

    /// Leaves the current temporary mode, calling its `cancel` first if
    /// `cancel` is set. Does nothing when a major mode is current.
    pub fn exit_temporary_mode(&mut self, cancel: bool) -> Result<(), ModeError> {
        if !self.current.is_temporary() {
            return Ok(());
        }
        if cancel {
            self.current.cancel();
        }
        self.pop_mode()?;
        self.issue_mode();
        Ok(())
    }

    pub fn cancel_temporary_mode(&mut self) -> Result<(), ModeError> {
        self.exit_temporary_mode(true)
    }

    /// Suspends the current mode and makes `mode` current without calling
    /// any callbacks. Prefer [`enter_mode`](Self::enter_mode).
    pub fn push_mode(&mut self, mode: Box<dyn Mode>) {
        let previous = std::mem::replace(&mut self.current, mode);
        self.suspended.push(previous);
    }

    /// Resumes the mode below the current one and returns the one removed.
    pub fn pop_mode(&mut self) -> Result<Box<dyn Mode>, ModeError> {
        let previous = self.suspended.pop().ok_or(ModeError::EmptyStack)?;
        Ok(std::mem::replace(&mut self.current, previous))
    }

    pub fn press(&mut self, pos: Pos2, button: PointerButton, modifiers: Modifiers) -> Result<(), ModeError> {
        let mut ctx = ModeContext::new();
        self.current.on_press(&mut ctx, pos, button, modifiers);
        self.apply_requests(&mut ctx)
    }

    pub fn motion(&mut self, pos: Pos2, modifiers: Modifiers) -> Result<(), ModeError> {
        let mut ctx = ModeContext::new();
        self.current.on_move(&mut ctx, pos, modifiers);
        self.apply_requests(&mut ctx)
    }

    pub fn release(&mut self, pos: Pos2, button: PointerButton, modifiers: Modifiers) -> Result<(), ModeError> {
        let mut ctx = ModeContext::new();
        self.current.on_release(&mut ctx, pos, button, modifiers);
        self.apply_requests(&mut ctx)
    }

    fn apply_requests(&mut self, ctx: &mut ModeContext) -> Result<(), ModeError> {
        for request in ctx.take_requests() {
            match request {
                ModeRequest::Enter(mode, args) => self.enter_mode(mode, &args)?,
                ModeRequest::ExitTemporary { cancel } => self.exit_temporary_mode(cancel)?,
            }
        }
        Ok(())
    }

    fn issue_mode(&self) {
        self.publisher.issue(&MODE, &[Value::from(self.current.name())]);
    }
}

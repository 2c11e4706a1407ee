mod action;

use std::collections::VecDeque;

pub use action::{Action, combine};
use action::apply_logged;

use crate::config::UndoLimit;
use crate::error::UndoError;

/// Manages the undo and redo stacks of one document.
///
/// It also keeps the undo count: the number of edits performed since the
/// last save. Recording an edit or redoing one increments it, undoing
/// decrements it, so the document is unmodified exactly when it is zero.
#[derive(Debug)]
pub struct UndoHistory {
    /// Oldest entry at the front, next undo at the back
    undo_stack: VecDeque<Action>,
    /// Next redo at the back
    redo_stack: VecDeque<Action>,
    max_depth: usize,
    undo_count: isize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(UndoLimit::Unlimited)
    }
}

impl UndoHistory {
    pub fn new(limit: UndoLimit) -> Self {
        let mut history = Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: usize::MAX,
            undo_count: 0,
        };
        history.set_depth_limit(limit);
        history
    }

    /// Changes the maximum number of undo steps, discarding the oldest
    /// entries if the stack is now too deep. Limits below one are raised to one.
    pub fn set_depth_limit(&mut self, limit: UndoLimit) {
        self.max_depth = limit.depth();
        Self::trim(&mut self.undo_stack, self.max_depth);
        Self::trim(&mut self.redo_stack, self.max_depth);
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// Records the undo action of an edit that was just performed.
    ///
    /// Any redo history is discarded.
    pub fn record(&mut self, action: Action) -> Result<(), UndoError> {
        action.validate()?;
        self.push_undo(action, true);
        Ok(())
    }

    /// Undoes the most recent edit. Does nothing if there is none.
    pub fn undo(&mut self) {
        let Some(action) = self.undo_stack.pop_back() else {
            return;
        };
        log::debug!("undo {:?}", action.label());
        let redo = apply_logged(action);
        self.redo_stack.push_back(redo);
        Self::trim(&mut self.redo_stack, self.max_depth);
        self.undo_count -= 1;
    }

    /// Redoes the most recently undone edit. Does nothing if there is none.
    pub fn redo(&mut self) {
        let Some(action) = self.redo_stack.pop_back() else {
            return;
        };
        log::debug!("redo {:?}", action.label());
        let undo = apply_logged(action);
        self.push_undo(undo, false);
    }

    fn push_undo(&mut self, action: Action, clear_redo: bool) {
        self.undo_stack.push_back(action);
        self.undo_count += 1;
        Self::trim(&mut self.undo_stack, self.max_depth);
        if clear_redo {
            self.redo_stack.clear();
        }
    }

    fn trim(stack: &mut VecDeque<Action>, max_depth: usize) {
        while stack.len() > max_depth {
            stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Menu text for the next undo, e.g. `"Undo Move"`.
    pub fn describe_next_undo(&self) -> String {
        match self.undo_stack.back().and_then(Action::label) {
            Some(label) => format!("Undo {label}"),
            None => "Undo".to_owned(),
        }
    }

    /// Menu text for the next redo, e.g. `"Redo Move"`.
    pub fn describe_next_redo(&self) -> String {
        match self.redo_stack.back().and_then(Action::label) {
            Some(label) => format!("Redo {label}"),
            None => "Redo".to_owned(),
        }
    }

    /// Number of edits since the last save. Negative after undoing past it.
    pub fn undo_count(&self) -> isize {
        self.undo_count
    }

    pub fn is_modified(&self) -> bool {
        self.undo_count != 0
    }

    /// Called after a successful save.
    pub fn mark_saved(&mut self) {
        self.undo_count = 0;
    }

    /// Forgets all undo and redo information.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_count = 0;
    }
}

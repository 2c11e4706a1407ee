use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{BoxError, UndoError};

type ApplyFn = Box<dyn FnOnce() -> Result<Action, BoxError>>;

enum ActionKind {
    /// A single state change; running it yields the inverse action
    Run(ApplyFn),
    /// Children applied first to last; the inverse holds their inverses last to first
    List(Vec<Action>),
    /// Applies the first action, then the second, and keeps that order in the inverse
    After(Box<Action>, Box<Action>),
    Null,
}

/// A reversible unit of history.
///
/// Applying an action performs its state change and returns the action that
/// reverses it, so the same type serves for both undo and redo.
pub struct Action {
    label: Option<String>,
    kind: ActionKind,
}

impl Action {
    /// Creates an unlabeled action from a closure returning its inverse.
    pub fn new<F>(apply: F) -> Self
    where
        F: FnOnce() -> Result<Action, BoxError> + 'static,
    {
        Self {
            label: None,
            kind: ActionKind::Run(Box::new(apply)),
        }
    }

    pub fn labeled<F>(label: impl Into<String>, apply: F) -> Self
    where
        F: FnOnce() -> Result<Action, BoxError> + 'static,
    {
        Self::new(apply).with_label(label)
    }

    /// An action that does nothing and whose inverse does nothing.
    pub fn null() -> Self {
        Self {
            label: None,
            kind: ActionKind::Null,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ActionKind::Null)
    }

    /// Applies `self` and then `after`. The inverse again runs the reversal
    /// of `self` first and the reversal of `after` second, which is what a
    /// trailing "recompute" step needs in both directions.
    pub fn followed_by(self, after: Action) -> Action {
        Self {
            label: None,
            kind: ActionKind::After(Box::new(self), Box::new(after)),
        }
    }

    /// Performs the change and returns its inverse.
    ///
    /// The inverse inherits this action's label unless it carries its own.
    pub fn apply(self) -> Result<Action, BoxError> {
        let Self { label, kind } = self;
        let mut inverse = match kind {
            ActionKind::Run(apply) => apply()?,
            ActionKind::List(children) => {
                let mut inverses: Vec<Action> = children.into_iter().map(apply_logged).collect();
                inverses.reverse();
                Action {
                    label: None,
                    kind: ActionKind::List(inverses),
                }
            }
            ActionKind::After(first, second) => {
                let first = apply_logged(*first);
                let second = apply_logged(*second);
                first.followed_by(second)
            }
            ActionKind::Null => return Ok(Action::null()),
        };
        if inverse.label.is_none() && !inverse.is_null() {
            inverse.label = label;
        }
        Ok(inverse)
    }

    /// Checks that the action can be recorded.
    pub(crate) fn validate(&self) -> Result<(), UndoError> {
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(UndoError::MalformedAction("blank label".to_owned()));
            }
        }
        match &self.kind {
            ActionKind::List(children) if children.is_empty() => {
                Err(UndoError::MalformedAction("composite action without children".to_owned()))
            }
            ActionKind::List(children) => children.iter().try_for_each(Action::validate),
            ActionKind::After(first, second) => {
                first.validate()?;
                second.validate()
            }
            ActionKind::Run(_) | ActionKind::Null => Ok(()),
        }
    }

    /// Builds a composite directly from `children`, without the flattening
    /// done by [`combine`]. Children run in the given order.
    pub fn list(children: Vec<Action>) -> Action {
        Self {
            label: None,
            kind: ActionKind::List(children),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ActionKind::Run(_) => "Run".to_owned(),
            ActionKind::List(children) => format!("List({})", children.len()),
            ActionKind::After(..) => "After".to_owned(),
            ActionKind::Null => "Null".to_owned(),
        };
        f.debug_struct("Action")
            .field("label", &self.label)
            .field("kind", &kind)
            .finish()
    }
}

/// Applies `action`, substituting a null inverse if it fails or panics.
pub(crate) fn apply_logged(action: Action) -> Action {
    let label = action.label.clone();
    match panic::catch_unwind(AssertUnwindSafe(|| action.apply())) {
        Ok(Ok(inverse)) => inverse,
        Ok(Err(err)) => {
            log::error!(target: "internal", "exception in undo action {label:?}: {err}");
            Action::null()
        }
        Err(_) => {
            log::error!(target: "internal", "undo action {label:?} panicked");
            Action::null()
        }
    }
}

/// Merges the undo actions of several edits, given in the order the edits
/// were made, into one step.
///
/// The result undoes the last edit first. Nested composites are flattened and
/// null actions dropped; a single remaining action is returned as is, and an
/// empty input yields [`Action::null`].
pub fn combine(actions: Vec<Action>) -> Action {
    let mut flat = Vec::with_capacity(actions.len());
    for action in actions.into_iter().rev() {
        match action.kind {
            ActionKind::Null => {}
            ActionKind::List(children) => flat.extend(children),
            kind => flat.push(Action { label: action.label, kind }),
        }
    }
    match flat.len() {
        0 => Action::null(),
        1 => flat.pop().unwrap_or_else(Action::null),
        _ => Action::list(flat),
    }
}

use std::rc::Rc;

use serde_json::Value;

use crate::error::BoxError;
use crate::event::Channel;

pub type TargetFn<O> = Rc<dyn Fn(&O, &[Value]) -> Result<(), BoxError>>;
pub type Callback<O, T> = Rc<dyn Fn(&O) -> T>;

/// What a command calls when invoked.
pub enum CommandTarget<O> {
    /// A method on the owner
    Method(TargetFn<O>),
    /// A command understood by the owner's currently selected object
    Object { class: &'static str, method: String },
}

impl<O> Clone for CommandTarget<O> {
    fn clone(&self) -> Self {
        match self {
            Self::Method(f) => Self::Method(Rc::clone(f)),
            Self::Object { class, method } => Self::Object {
                class: *class,
                method: method.clone(),
            },
        }
    }
}

/// Declarative, process-wide template of a user command.
///
/// One descriptor is instantiated into a live [`Command`](super::Command)
/// for every owner (canvas, window) it applies to.
pub struct CommandDescriptor<O> {
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) target: CommandTarget<O>,
    pub(crate) args: Vec<Value>,
    pub(crate) subscribe_path: Vec<String>,
    pub(crate) subscribe_to: Option<Channel>,
    pub(crate) label_cb: Option<Callback<O, String>>,
    pub(crate) sensitive_cb: Option<Callback<O, bool>>,
    pub(crate) value_cb: Option<Callback<O, Value>>,
    pub(crate) value_on: Value,
    pub(crate) is_check: bool,
    pub(crate) key_strokes: Vec<String>,
}

impl<O> std::fmt::Debug for CommandDescriptor<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("object_class", &self.object_class())
            .field("subscribe_to", &self.subscribe_to)
            .field("key_strokes", &self.key_strokes)
            .finish()
    }
}

impl<O> CommandDescriptor<O> {
    /// A command calling `target` on its owner.
    pub fn new<F>(name: impl Into<String>, label: impl Into<String>, target: F) -> Self
    where
        F: Fn(&O, &[Value]) -> Result<(), BoxError> + 'static,
    {
        Self::with_target(name, label, CommandTarget::Method(Rc::new(target)))
    }

    /// A command dispatched to the selected object, available only while an
    /// object of `class` is selected.
    pub fn object(name: impl Into<String>, label: impl Into<String>, class: &'static str) -> Self {
        let name = name.into();
        let method = name.clone();
        Self::with_target(name, label, CommandTarget::Object { class, method })
    }

    fn with_target(name: impl Into<String>, label: impl Into<String>, target: CommandTarget<O>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            target,
            args: Vec::new(),
            subscribe_path: Vec::new(),
            subscribe_to: None,
            label_cb: None,
            sensitive_cb: None,
            value_cb: None,
            value_on: Value::Bool(true),
            is_check: false,
            key_strokes: Vec::new(),
        }
    }

    /// Object method to call, when it differs from the command name.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        if let CommandTarget::Object { method: target, .. } = &mut self.target {
            *target = method.into();
        }
        self
    }

    /// Arguments passed ahead of any arguments given at invocation.
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Refresh the command whenever the owner issues `channel`.
    pub fn subscribe_to(mut self, channel: impl Into<Channel>) -> Self {
        self.subscribe_to = Some(channel.into());
        self
    }

    /// Refresh the command whenever the owner's sub-object at `path`
    /// (e.g. `"document"`) issues `channel`.
    pub fn subscribe_to_path(mut self, path: &str, channel: impl Into<Channel>) -> Self {
        self.subscribe_path = path.split('.').filter(|s| !s.is_empty()).map(str::to_owned).collect();
        self.subscribe_to = Some(channel.into());
        self
    }

    pub fn label_cb(mut self, cb: impl Fn(&O) -> String + 'static) -> Self {
        self.label_cb = Some(Rc::new(cb));
        self
    }

    pub fn sensitive_cb(mut self, cb: impl Fn(&O) -> bool + 'static) -> Self {
        self.sensitive_cb = Some(Rc::new(cb));
        self
    }

    pub fn value_cb(mut self, cb: impl Fn(&O) -> Value + 'static) -> Self {
        self.value_cb = Some(Rc::new(cb));
        self
    }

    /// Makes this a check/radio command that is "on" when its value equals `value_on`.
    pub fn check(mut self, value_on: Value) -> Self {
        self.is_check = true;
        self.value_on = value_on;
        self
    }

    pub fn key_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.key_strokes.push(stroke.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_class(&self) -> Option<&'static str> {
        match &self.target {
            CommandTarget::Object { class, .. } => Some(*class),
            CommandTarget::Method(_) => None,
        }
    }
}

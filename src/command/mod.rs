//! User-invokable commands: shared descriptors, per-owner live instances
//! that refresh themselves from bus notifications, and keymaps.

mod descriptor;
mod keymap;
mod registry;

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use serde_json::Value;

pub use descriptor::{Callback, CommandDescriptor, CommandTarget, TargetFn};
pub use keymap::{Keymap, KeymapChain};
pub use registry::{CommandRegistry, CommandSet};

use crate::error::{BoxError, EditError};
use crate::event::{Bus, CHANGED, Channel, Handler, Publisher, PublisherId};

/// Something commands can be instantiated for.
pub trait CommandOwner {
    fn bus(&self) -> Rc<Bus>;

    /// The identity the owner issues notifications under.
    fn publisher_id(&self) -> PublisherId;

    /// Resolves a dotted sub-object path (e.g. `["document"]`) to the
    /// publisher a command should watch. The empty path is the owner itself.
    fn resolve_publisher(&self, path: &[String]) -> Option<PublisherId> {
        path.is_empty().then(|| self.publisher_id())
    }

    /// Where object commands are dispatched, if the owner supports them.
    fn object_host(&self) -> Option<&dyn ObjectCommandHost> {
        None
    }
}

/// Dispatches object commands to the currently selected object.
pub trait ObjectCommandHost {
    /// True if the selected object is of `class`.
    fn current_object_compatible(&self, class: &str) -> bool;

    /// Runs `method` on the selected object of `class` and records its undo
    /// under `label`.
    fn call_object_method(&self, class: &str, label: &str, method: &str, args: &[Value]) -> Result<(), BoxError>;
}

/// The edit that reverses an object command: the command to run and its
/// arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseEdit {
    pub command: String,
    pub args: Vec<Value>,
}

impl InverseEdit {
    pub fn new(command: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

/// Capability implemented by every kind of document object that accepts
/// object commands.
pub trait Editable {
    fn class_name(&self) -> &'static str;

    fn supports(&self, command: &str) -> bool;

    /// Performs `command` and returns the edit that undoes it.
    fn apply_command(&mut self, command: &str, args: &[Value]) -> Result<InverseEdit, EditError>;
}

/// A command bound to one owner.
///
/// Its label, sensitivity and value are cached and recomputed by
/// [`update`](Self::update), which issues `CHANGED` on the command's own
/// publisher when any of them changed.
pub struct Command<O> {
    descriptor: Rc<CommandDescriptor<O>>,
    owner: Weak<O>,
    publisher: Publisher,
    label: RefCell<String>,
    sensitive: Cell<bool>,
    value: RefCell<Value>,
    refresh: RefCell<Option<(PublisherId, Channel, Handler)>>,
}

impl<O> std::fmt::Debug for Command<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.descriptor.name)
            .field("label", &*self.label.borrow())
            .field("sensitive", &self.sensitive.get())
            .field("value", &*self.value.borrow())
            .finish()
    }
}

impl<O: CommandOwner + 'static> Command<O> {
    pub(crate) fn new(descriptor: Rc<CommandDescriptor<O>>, owner: &Rc<O>) -> Self {
        let label = descriptor.label.clone();
        Self {
            publisher: Publisher::new(owner.bus()),
            owner: Rc::downgrade(owner),
            label: RefCell::new(label),
            sensitive: Cell::new(true),
            value: RefCell::new(Value::Bool(false)),
            refresh: RefCell::new(None),
            descriptor,
        }
    }

    /// Subscribes `command` to the channel its descriptor names, so it
    /// updates itself whenever that channel fires.
    pub(crate) fn connect(command: &Rc<Self>, owner: &O) {
        let descriptor = &command.descriptor;
        let Some(channel) = descriptor.subscribe_to.clone() else {
            return;
        };
        let Some(publisher) = owner.resolve_publisher(&descriptor.subscribe_path) else {
            log::warn!(
                "command {}: cannot resolve {:?} for subscription",
                descriptor.name,
                descriptor.subscribe_path
            );
            return;
        };

        let weak = Rc::downgrade(command);
        let refresh = crate::event::handler(move |_| {
            if let Some(command) = weak.upgrade() {
                command.update();
            }
            Ok(())
        });
        owner.bus().subscribe(publisher, channel.clone(), &refresh, Vec::new());
        *command.refresh.borrow_mut() = Some((publisher, channel, refresh));
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive.get()
    }

    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn is_check(&self) -> bool {
        self.descriptor.is_check
    }

    pub fn is_on(&self) -> bool {
        *self.value.borrow() == self.descriptor.value_on
    }

    pub fn key_strokes(&self) -> &[String] {
        &self.descriptor.key_strokes
    }

    pub fn object_class(&self) -> Option<&'static str> {
        self.descriptor.object_class()
    }

    /// The identity `CHANGED` notifications of this command are issued under.
    pub fn publisher_id(&self) -> PublisherId {
        self.publisher.id()
    }

    /// Subscribes a widget to changes of this command.
    pub fn subscribe(&self, channel: impl Into<Channel>, handler: &Handler) {
        self.publisher.subscribe(channel, handler, Vec::new());
    }

    /// Whether the command applies to the owner's current state. Object
    /// commands only apply while a compatible object is selected.
    pub fn in_context(&self) -> bool {
        match (self.descriptor.object_class(), self.owner.upgrade()) {
            (None, _) => true,
            (Some(class), Some(owner)) => owner
                .object_host()
                .is_some_and(|host| host.current_object_compatible(class)),
            (Some(_), None) => false,
        }
    }

    /// Calls the command's target with the bound arguments followed by
    /// `extra`. Failures and panics are logged, never propagated.
    pub fn invoke(&self, extra: &[Value]) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_invoke(extra))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                log::error!(target: "internal", "command {} failed: {err}", self.descriptor.name);
            }
            Err(_) => {
                log::error!(target: "internal", "command {} panicked", self.descriptor.name);
            }
        }
    }

    fn try_invoke(&self, extra: &[Value]) -> Result<(), BoxError> {
        let owner = self.owner.upgrade().ok_or("owner no longer exists")?;
        let mut args = self.descriptor.args.clone();
        args.extend_from_slice(extra);

        log::info!("invoke {}", self.descriptor.name);
        match &self.descriptor.target {
            CommandTarget::Method(target) => target(&owner, &args),
            CommandTarget::Object { class, method } => {
                let host = owner.object_host().ok_or("owner does not dispatch object commands")?;
                host.call_object_method(class, &self.label(), method, &args)
            }
        }
    }

    /// Re-evaluates label, sensitivity and value; issues `CHANGED` if any
    /// of them differs from the cached state.
    pub fn update(&self) {
        let Some(owner) = self.owner.upgrade() else {
            return;
        };
        let descriptor = &self.descriptor;

        let label = match &descriptor.label_cb {
            Some(cb) => cb(&owner),
            None => descriptor.label.clone(),
        };
        let sensitive = self.in_context() && descriptor.sensitive_cb.as_ref().is_none_or(|cb| cb(&owner));
        let value = descriptor.value_cb.as_ref().map(|cb| cb(&owner));

        let mut changed = false;
        if *self.label.borrow() != label {
            *self.label.borrow_mut() = label;
            changed = true;
        }
        if self.sensitive.replace(sensitive) != sensitive {
            changed = true;
        }
        if let Some(value) = value {
            if *self.value.borrow() != value {
                *self.value.borrow_mut() = value;
                changed = true;
            }
        }

        if changed {
            self.publisher.issue(&CHANGED, &[Value::from(self.name())]);
        }
    }
}

impl<O> Drop for Command<O> {
    fn drop(&mut self) {
        if let Some((publisher, channel, refresh)) = self.refresh.get_mut().take() {
            // Fails harmlessly if the owner was torn down first
            let _ = self.publisher.bus().unsubscribe(publisher, channel, &refresh, &[]);
        }
    }
}

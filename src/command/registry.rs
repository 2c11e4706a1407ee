use std::rc::Rc;

use super::{Command, CommandDescriptor, CommandOwner, Keymap};

/// Process-wide list of command templates for one kind of owner.
pub struct CommandRegistry<O> {
    descriptors: Vec<Rc<CommandDescriptor<O>>>,
}

impl<O> std::fmt::Debug for CommandRegistry<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.descriptors.iter().map(|d| d.name())).finish()
    }
}

impl<O> Default for CommandRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> CommandRegistry<O> {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Adds a template. A later descriptor with the same name replaces the
    /// earlier one.
    pub fn register_descriptor(&mut self, descriptor: CommandDescriptor<O>) {
        if let Some(index) = self.descriptors.iter().position(|d| d.name() == descriptor.name()) {
            log::warn!("command descriptor {} registered twice, replacing", descriptor.name());
            self.descriptors.remove(index);
        }
        self.descriptors.push(Rc::new(descriptor));
    }

    pub fn descriptor(&self, name: &str) -> Option<&CommandDescriptor<O>> {
        self.descriptors.iter().find(|d| d.name() == name).map(Rc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<O: CommandOwner + 'static> CommandRegistry<O> {
    /// Creates a live command for `owner` from every registered template and
    /// connects each one to the channel it refreshes on.
    pub fn instantiate_for(&self, owner: &Rc<O>) -> CommandSet<O> {
        let commands: Vec<Rc<Command<O>>> = self
            .descriptors
            .iter()
            .map(|descriptor| {
                let command = Rc::new(Command::new(Rc::clone(descriptor), owner));
                Command::connect(&command, owner);
                command.update();
                command
            })
            .collect();

        let mut keymap = Keymap::new();
        for command in commands.iter().filter(|c| c.object_class().is_none()) {
            keymap.add_command(command);
        }
        CommandSet { commands, keymap }
    }
}

/// The commands instantiated for one owner.
pub struct CommandSet<O> {
    commands: Vec<Rc<Command<O>>>,
    keymap: Keymap<O>,
}

impl<O> std::fmt::Debug for CommandSet<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSet")
            .field("commands", &self.commands.len())
            .field("keymap", &self.keymap.len())
            .finish()
    }
}

impl<O: CommandOwner + 'static> CommandSet<O> {
    pub fn get(&self, name: &str) -> Option<&Rc<Command<O>>> {
        self.commands.iter().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Command<O>>> {
        self.commands.iter()
    }

    pub fn update_all(&self) {
        for command in &self.commands {
            command.update();
        }
    }

    /// Bindings of every command that is not an object command.
    pub fn keymap(&self) -> &Keymap<O> {
        &self.keymap
    }

    /// Bindings of the object commands for `class`.
    pub fn class_keymap(&self, class: &str) -> Keymap<O> {
        let mut keymap = Keymap::new();
        for command in self.commands.iter().filter(|c| c.object_class() == Some(class)) {
            keymap.add_command(command);
        }
        keymap
    }
}

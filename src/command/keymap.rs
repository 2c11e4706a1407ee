use std::collections::HashMap;
use std::rc::Rc;

use super::{Command, CommandOwner};

/// Maps keystroke strings such as `"C-z"` to commands.
pub struct Keymap<O> {
    map: HashMap<String, Rc<Command<O>>>,
}

impl<O> Default for Keymap<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> std::fmt::Debug for Keymap<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keymap").field("strokes", &self.map.keys().collect::<Vec<_>>()).finish()
    }
}

impl<O> Keymap<O> {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<O: CommandOwner + 'static> Keymap<O> {
    /// Binds every keystroke of `command`. An existing binding is replaced
    /// and the collision logged.
    pub fn add_command(&mut self, command: &Rc<Command<O>>) {
        for stroke in command.key_strokes() {
            if let Some(previous) = self.map.insert(stroke.clone(), Rc::clone(command)) {
                log::warn!("Binding {} to {stroke} replaces {}", command.name(), previous.name());
            }
        }
    }

    pub fn resolve(&self, stroke: &str) -> Option<Rc<Command<O>>> {
        self.map.get(stroke).cloned()
    }
}

/// Keymaps consulted in order until one of them binds a keystroke:
/// typically object-class, then document, then application.
pub struct KeymapChain<'a, O> {
    maps: Vec<&'a Keymap<O>>,
}

impl<O> Default for KeymapChain<'_, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, O> KeymapChain<'a, O> {
    pub fn new() -> Self {
        Self { maps: Vec::new() }
    }

    pub fn then(mut self, keymap: &'a Keymap<O>) -> Self {
        self.maps.push(keymap);
        self
    }
}

impl<O: CommandOwner + 'static> KeymapChain<'_, O> {
    pub fn resolve(&self, stroke: &str) -> Option<Rc<Command<O>>> {
        self.maps.iter().find_map(|keymap| keymap.resolve(stroke))
    }
}

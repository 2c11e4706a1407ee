use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Raw input delivered to a canvas, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown {
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Mouse button was released
    PointerUp {
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Mouse moved (with or without buttons pressed)
    PointerMove { pos: Pos2, modifiers: Modifiers },
    /// Key was pressed
    KeyDown { key: Key, modifiers: Modifiers },
}

/// Formats a key press as a keymap stroke: `C-`, `M-` and `S-` prefixes
/// for ctrl/command, alt and shift, followed by the key name.
///
/// `keystroke(Key::Z, Modifiers::COMMAND)` is `"C-Z"`.
pub fn keystroke(key: Key, modifiers: Modifiers) -> String {
    let mut stroke = String::new();
    if modifiers.command || modifiers.ctrl {
        stroke.push_str("C-");
    }
    if modifiers.alt {
        stroke.push_str("M-");
    }
    if modifiers.shift {
        stroke.push_str("S-");
    }
    stroke.push_str(key.name());
    stroke
}

/// Converts raw egui input into [`InputEvent`]s for one canvas.
#[derive(Debug)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    /// Set while a press that started on the canvas is held
    dragging: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            last_pointer_pos: None,
            dragging: false,
        }
    }

    /// Collects this frame's events. Pointer events outside `canvas_rect`
    /// are dropped unless a drag started inside it.
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let modifiers = input.modifiers;

            if let Some(pos) = input.pointer.hover_pos() {
                let inside = canvas_rect.contains(pos);
                if Some(pos) != self.last_pointer_pos && (inside || self.dragging) {
                    events.push(InputEvent::PointerMove { pos, modifiers });
                }
                self.last_pointer_pos = Some(pos);

                for button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                    if input.pointer.button_pressed(button) && inside {
                        self.dragging = true;
                        events.push(InputEvent::PointerDown { pos, button, modifiers });
                    }
                    if input.pointer.button_released(button) && self.dragging {
                        self.dragging = false;
                        events.push(InputEvent::PointerUp { pos, button, modifiers });
                    }
                }
            } else {
                self.last_pointer_pos = None;
            }

            for event in &input.raw.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } = event
                {
                    events.push(InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    });
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keystroke_prefixes_modifiers() {
        assert_eq!(keystroke(Key::Z, Modifiers::NONE), "Z");
        assert_eq!(keystroke(Key::Z, Modifiers::COMMAND), "C-Z");
        assert_eq!(keystroke(Key::Z, Modifiers::COMMAND | Modifiers::SHIFT), "C-S-Z");
        assert_eq!(keystroke(Key::Delete, Modifiers::NONE), "Delete");
    }
}

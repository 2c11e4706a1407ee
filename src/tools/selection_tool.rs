use std::rc::Rc;

use egui::{Modifiers, PointerButton, Pos2};

use crate::canvas::{Preview, SharedPreview};
use crate::document::Document;
use crate::mode::{Mode, ModeContext, ModeKind};

/// Major mode: click selects the topmost object, dragging moves it.
pub struct SelectionTool {
    document: Rc<Document>,
    preview: SharedPreview,
    drag: Option<(Pos2, Pos2)>,
}

impl SelectionTool {
    pub fn new(document: Rc<Document>, preview: SharedPreview) -> Self {
        Self {
            document,
            preview,
            drag: None,
        }
    }

    fn reset(&mut self) {
        self.drag = None;
        *self.preview.borrow_mut() = None;
    }
}

impl Mode for SelectionTool {
    fn kind(&self) -> ModeKind {
        ModeKind::Major
    }

    fn name(&self) -> &'static str {
        "Select"
    }

    fn enter(&mut self, _args: &[serde_json::Value]) {
        self.reset();
    }

    fn on_press(&mut self, _ctx: &mut ModeContext, pos: Pos2, button: PointerButton, _modifiers: Modifiers) {
        if button != PointerButton::Primary {
            return;
        }
        let hit = self.document.hit_test(pos);
        self.document.select(hit);
        if hit.is_some() {
            self.drag = Some((pos, pos));
        }
    }

    fn on_move(&mut self, _ctx: &mut ModeContext, pos: Pos2, _modifiers: Modifiers) {
        if let Some((start, current)) = &mut self.drag {
            *current = pos;
            *self.preview.borrow_mut() = Some(Preview::Drag(pos - *start));
        }
    }

    fn on_release(&mut self, _ctx: &mut ModeContext, pos: Pos2, button: PointerButton, _modifiers: Modifiers) {
        if button != PointerButton::Primary {
            return;
        }
        let Some((start, _)) = self.drag.take() else {
            return;
        };
        *self.preview.borrow_mut() = None;

        let delta = pos - start;
        if delta != egui::Vec2::ZERO {
            if let Err(err) = self.document.translate_selected(delta) {
                log::error!("Failed to move selection: {err}");
            }
        }
    }

    fn exit(&mut self) {
        self.reset();
    }

    fn cancel(&mut self) {
        self.reset();
    }
}

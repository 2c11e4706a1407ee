use std::rc::Rc;

use egui::{Modifiers, PointerButton, Pos2, Rect};

use super::ToolStyle;
use crate::canvas::{Preview, SharedPreview};
use crate::document::Document;
use crate::mode::{Mode, ModeContext, ModeKind};
use crate::shape::ShapeKind;

/// Major mode: drag out a rectangle.
pub struct RectangleTool {
    document: Rc<Document>,
    preview: SharedPreview,
    style: ToolStyle,
    start: Option<Pos2>,
}

impl RectangleTool {
    pub fn new(document: Rc<Document>, preview: SharedPreview, style: ToolStyle) -> Self {
        Self {
            document,
            preview,
            style,
            start: None,
        }
    }

    fn discard(&mut self) {
        self.start = None;
        *self.preview.borrow_mut() = None;
    }
}

impl Mode for RectangleTool {
    fn kind(&self) -> ModeKind {
        ModeKind::Major
    }

    fn name(&self) -> &'static str {
        "Rectangle"
    }

    fn on_press(&mut self, _ctx: &mut ModeContext, pos: Pos2, button: PointerButton, _modifiers: Modifiers) {
        if button == PointerButton::Primary {
            self.start = Some(pos);
        }
    }

    fn on_move(&mut self, _ctx: &mut ModeContext, pos: Pos2, _modifiers: Modifiers) {
        if let Some(start) = self.start {
            *self.preview.borrow_mut() = Some(Preview::Rectangle(Rect::from_two_pos(start, pos)));
        }
    }

    fn on_release(&mut self, _ctx: &mut ModeContext, pos: Pos2, button: PointerButton, _modifiers: Modifiers) {
        if button != PointerButton::Primary {
            return;
        }
        let Some(start) = self.start.take() else {
            return;
        };
        *self.preview.borrow_mut() = None;

        let rect = Rect::from_two_pos(start, pos);
        if rect.area() <= 0.0 {
            return;
        }
        let kind = ShapeKind::Rectangle { rect, radius: 0.0 };
        if let Err(err) = self.document.insert(kind, self.style.color) {
            log::error!("Failed to record rectangle: {err}");
        }
    }

    fn exit(&mut self) {
        self.discard();
    }

    fn cancel(&mut self) {
        self.discard();
    }
}

use std::rc::Rc;

use egui::{Modifiers, PointerButton, Pos2};

use super::ToolStyle;
use crate::canvas::{Preview, SharedPreview};
use crate::document::Document;
use crate::mode::{Mode, ModeContext, ModeKind};
use crate::shape::ShapeKind;

/// Major mode: press, drag and release to draw a freehand stroke.
pub struct DrawStrokeTool {
    document: Rc<Document>,
    preview: SharedPreview,
    style: ToolStyle,
    // Transient state: the stroke being drawn (if any)
    points: Option<Vec<Pos2>>,
}

impl DrawStrokeTool {
    pub fn new(document: Rc<Document>, preview: SharedPreview, style: ToolStyle) -> Self {
        Self {
            document,
            preview,
            style,
            points: None,
        }
    }

    fn discard(&mut self) {
        self.points = None;
        *self.preview.borrow_mut() = None;
    }
}

impl Mode for DrawStrokeTool {
    fn kind(&self) -> ModeKind {
        ModeKind::Major
    }

    fn name(&self) -> &'static str {
        "DrawStroke"
    }

    fn text(&self) -> &str {
        "Draw Stroke"
    }

    fn on_press(&mut self, _ctx: &mut ModeContext, pos: Pos2, button: PointerButton, _modifiers: Modifiers) {
        if button == PointerButton::Primary {
            self.points = Some(vec![pos]);
            *self.preview.borrow_mut() = Some(Preview::Stroke(vec![pos]));
        }
    }

    fn on_move(&mut self, _ctx: &mut ModeContext, pos: Pos2, _modifiers: Modifiers) {
        if let Some(points) = &mut self.points {
            points.push(pos);
            *self.preview.borrow_mut() = Some(Preview::Stroke(points.clone()));
        }
    }

    fn on_release(&mut self, _ctx: &mut ModeContext, pos: Pos2, button: PointerButton, _modifiers: Modifiers) {
        if button != PointerButton::Primary {
            return;
        }
        let Some(mut points) = self.points.take() else {
            return;
        };
        *self.preview.borrow_mut() = None;

        if points.last() != Some(&pos) {
            points.push(pos);
        }
        // A click without movement draws nothing
        if points.len() < 2 {
            return;
        }
        let kind = ShapeKind::Stroke {
            points,
            width: self.style.width,
        };
        match self.document.insert(kind, self.style.color) {
            Ok(id) => log::info!("Created stroke {id}"),
            Err(err) => log::error!("Failed to record stroke: {err}"),
        }
    }

    fn exit(&mut self) {
        self.discard();
    }

    fn cancel(&mut self) {
        self.discard();
    }
}

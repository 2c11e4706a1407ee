use std::rc::Weak;

use egui::{Modifiers, PointerButton, Pos2, Rect};

use crate::canvas::{Canvas, Preview};
use crate::mode::{Mode, ModeContext, ModeKind};

/// Rubber bands smaller than this (screen pixels) count as a click
const CLICK_SLOP: f32 = 3.0;

/// Temporary mode: click to zoom in (shift: out) or drag a rectangle to
/// zoom to. Returns to the previous mode on release.
pub struct ZoomTool {
    canvas: Weak<Canvas>,
    start: Option<Pos2>,
}

impl ZoomTool {
    pub fn new(canvas: Weak<Canvas>) -> Self {
        Self { canvas, start: None }
    }

    fn clear_preview(&self) {
        if let Some(canvas) = self.canvas.upgrade() {
            *canvas.shared_preview().borrow_mut() = None;
        }
    }
}

impl Mode for ZoomTool {
    fn kind(&self) -> ModeKind {
        ModeKind::Temporary
    }

    fn name(&self) -> &'static str {
        "Zoom"
    }

    fn text(&self) -> &str {
        "Zoom Area"
    }

    fn on_press(&mut self, _ctx: &mut ModeContext, pos: Pos2, _button: PointerButton, _modifiers: Modifiers) {
        self.start = Some(pos);
    }

    fn on_move(&mut self, _ctx: &mut ModeContext, pos: Pos2, _modifiers: Modifiers) {
        if let (Some(start), Some(canvas)) = (self.start, self.canvas.upgrade()) {
            *canvas.shared_preview().borrow_mut() = Some(Preview::Rectangle(Rect::from_two_pos(start, pos)));
        }
    }

    fn on_release(&mut self, ctx: &mut ModeContext, pos: Pos2, _button: PointerButton, modifiers: Modifiers) {
        let start = self.start.take();
        self.clear_preview();
        let (Some(start), Some(canvas)) = (start, self.canvas.upgrade()) else {
            ctx.exit_temporary_mode(false);
            return;
        };

        let mut viewport = canvas.viewport();
        let area = Rect::from_two_pos(start, pos);
        let screen_area = Rect::from_two_pos(viewport.to_screen(start), viewport.to_screen(pos));
        if screen_area.width() < CLICK_SLOP && screen_area.height() < CLICK_SLOP {
            let factor = if modifiers.shift { 0.5 } else { 2.0 };
            viewport.zoom_at(viewport.to_screen(pos), factor);
        } else {
            viewport.fit(area, canvas.screen_rect());
        }
        canvas.set_viewport(viewport);
        ctx.exit_temporary_mode(false);
    }

    fn cancel(&mut self) {
        self.start = None;
        self.clear_preview();
    }
}

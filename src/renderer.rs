use egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::canvas::{Canvas, Preview, Viewport};
use crate::shape::{Shape, ShapeKind};

/// Paints a canvas: its document's shapes, the selection and the active
/// mode's preview.
#[derive(Debug, Clone)]
pub struct Renderer {
    background: Color32,
    selection_color: Color32,
    preview_color: Color32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            background: Color32::WHITE,
            selection_color: Color32::from_rgb(0, 120, 215),
            preview_color: Color32::from_rgba_unmultiplied(0, 120, 215, 160),
        }
    }

    pub fn render(&self, painter: &Painter, canvas: &Canvas) {
        let viewport = canvas.viewport();
        let document = canvas.document();
        let preview = canvas.preview();
        let selection = document.selection();

        painter.rect_filled(painter.clip_rect(), 0.0, self.background);

        // While dragging, the selected shape is drawn at its prospective position
        let drag = match &preview {
            Some(Preview::Drag(delta)) => *delta,
            _ => Vec2::ZERO,
        };

        for mut shape in document.objects() {
            let selected = Some(shape.id()) == selection;
            if selected {
                shape.translate(drag);
            }
            self.draw_shape(painter, &viewport, &shape);
            if selected {
                let bounds = to_screen_rect(&viewport, shape.bounds()).expand(3.0);
                painter.rect_stroke(bounds, 0.0, Stroke::new(1.0, self.selection_color));
            }
        }

        match preview {
            Some(Preview::Stroke(points)) => {
                let style = canvas.tool_style();
                let points: Vec<Pos2> = points.iter().map(|p| viewport.to_screen(*p)).collect();
                painter.add(egui::Shape::line(points, Stroke::new(style.width * viewport.scale, style.color)));
            }
            Some(Preview::Rectangle(rect)) => {
                painter.rect_stroke(to_screen_rect(&viewport, rect), 0.0, Stroke::new(1.0, self.preview_color));
            }
            Some(Preview::Drag(_)) | None => {}
        }
    }

    fn draw_shape(&self, painter: &Painter, viewport: &Viewport, shape: &Shape) {
        match shape.kind() {
            ShapeKind::Stroke { points, width } => {
                let points: Vec<Pos2> = points.iter().map(|p| viewport.to_screen(*p)).collect();
                painter.add(egui::Shape::line(points, Stroke::new(width * viewport.scale, shape.color())));
            }
            ShapeKind::Rectangle { rect, radius } => {
                painter.rect_filled(to_screen_rect(viewport, *rect), radius * viewport.scale, shape.color());
            }
        }
    }
}

fn to_screen_rect(viewport: &Viewport, rect: Rect) -> Rect {
    Rect::from_two_pos(viewport.to_screen(rect.min), viewport.to_screen(rect.max))
}

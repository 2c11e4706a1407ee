//! The canvas's concrete interaction modes.

mod draw_stroke_tool;
mod rectangle_tool;
mod selection_tool;
mod zoom_tool;

pub use draw_stroke_tool::DrawStrokeTool;
pub use rectangle_tool::RectangleTool;
pub use selection_tool::SelectionTool;
pub use zoom_tool::ZoomTool;

use egui::Color32;

/// Style applied to newly created shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolStyle {
    pub color: Color32,
    pub width: f32,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 2.0,
        }
    }
}

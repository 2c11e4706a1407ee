//! The editor's standard commands and their key bindings.

use serde_json::Value;

use crate::canvas::{Canvas, Viewport};
use crate::command::{CommandDescriptor, CommandRegistry};
use crate::event::{MODE, SELECTION, UNDO};
use crate::mode::Mode;
use crate::tools::{DrawStrokeTool, RectangleTool, SelectionTool, ZoomTool};

/// Names a major tool mode by the `name()` it reports.
pub fn tool_mode(canvas: &Canvas, name: &str) -> Option<Box<dyn Mode>> {
    let document = canvas.document().clone();
    let preview = canvas.shared_preview();
    let style = canvas.tool_style();
    let mode: Box<dyn Mode> = match name {
        "Select" => Box::new(SelectionTool::new(document, preview)),
        "DrawStroke" => Box::new(DrawStrokeTool::new(document, preview, style)),
        "Rectangle" => Box::new(RectangleTool::new(document, preview, style)),
        "Zoom" => Box::new(ZoomTool::new(canvas.downgrade())),
        _ => return None,
    };
    Some(mode)
}

fn mode_command(name: &'static str, label: &str, stroke: &str) -> CommandDescriptor<Canvas> {
    CommandDescriptor::new(name.to_lowercase(), label, move |canvas: &Canvas, args: &[Value]| {
        let mode = tool_mode(canvas, name).ok_or_else(|| format!("no mode named {name}"))?;
        canvas.enter_mode(mode, args)?;
        Ok(())
    })
    .subscribe_to(MODE)
    .value_cb(|canvas: &Canvas| Value::from(canvas.mode_name()))
    .check(Value::from(name))
    .key_stroke(stroke)
}

/// Commands bound to a document view: history, selection and tool modes,
/// plus the object commands of each shape class.
pub fn canvas_commands() -> CommandRegistry<Canvas> {
    let mut registry = CommandRegistry::new();

    registry.register_descriptor(
        CommandDescriptor::new("undo", "Undo", |canvas: &Canvas, _: &[Value]| {
            Ok(canvas.document().undo()?)
        })
        .subscribe_to_path("document", UNDO)
        .label_cb(|canvas: &Canvas| canvas.document().undo_text())
        .sensitive_cb(|canvas: &Canvas| canvas.document().can_undo())
        .key_stroke("C-Z"),
    );
    registry.register_descriptor(
        CommandDescriptor::new("redo", "Redo", |canvas: &Canvas, _: &[Value]| {
            Ok(canvas.document().redo()?)
        })
        .subscribe_to_path("document", UNDO)
        .label_cb(|canvas: &Canvas| canvas.document().redo_text())
        .sensitive_cb(|canvas: &Canvas| canvas.document().can_redo())
        .key_stroke("C-Y")
        .key_stroke("C-S-Z"),
    );
    registry.register_descriptor(
        CommandDescriptor::new("delete", "Delete", |canvas: &Canvas, _: &[Value]| {
            let document = canvas.document();
            if let Some(id) = document.selection() {
                document.remove(id)?;
            }
            Ok(())
        })
        .subscribe_to_path("document", SELECTION)
        .sensitive_cb(|canvas: &Canvas| canvas.document().has_selection())
        .key_stroke("Delete")
        .key_stroke("Backspace"),
    );
    registry.register_descriptor(
        CommandDescriptor::new("cancel", "Cancel", |canvas: &Canvas, _: &[Value]| {
            if canvas.is_temporary_mode_active() {
                canvas.cancel_temporary_mode()?;
            } else {
                canvas.document().select(None);
            }
            Ok(())
        })
        .key_stroke("Escape"),
    );

    registry.register_descriptor(mode_command("Select", "Select", "S"));
    registry.register_descriptor(mode_command("DrawStroke", "Draw", "D"));
    registry.register_descriptor(mode_command("Rectangle", "Rectangle", "R"));
    registry.register_descriptor(mode_command("Zoom", "Zoom", "Z"));

    // Object commands: only sensitive while a shape of the class is selected
    registry.register_descriptor(
        CommandDescriptor::object("stroke_widen", "Widen Stroke", "Stroke")
            .method("scale_width")
            .args(vec![Value::from(2.0)])
            .subscribe_to_path("document", SELECTION)
            .key_stroke("W"),
    );
    registry.register_descriptor(
        CommandDescriptor::object("stroke_narrow", "Narrow Stroke", "Stroke")
            .method("scale_width")
            .args(vec![Value::from(0.5)])
            .subscribe_to_path("document", SELECTION)
            .key_stroke("S-W"),
    );
    registry.register_descriptor(
        CommandDescriptor::object("rectangle_round", "Round Corners", "Rectangle")
            .method("set_radius")
            .args(vec![Value::from(8.0)])
            .subscribe_to_path("document", SELECTION)
            .key_stroke("W"),
    );
    registry.register_descriptor(
        CommandDescriptor::object("rectangle_square", "Square Corners", "Rectangle")
            .method("set_radius")
            .args(vec![Value::from(0.0)])
            .subscribe_to_path("document", SELECTION)
            .key_stroke("S-W"),
    );
    for class in ["Stroke", "Rectangle"] {
        registry.register_descriptor(
            CommandDescriptor::object(format!("{}_red", class.to_lowercase()), "Make Red", class)
                .method("set_color")
                .args(vec![Value::from("#d03030")])
                .subscribe_to_path("document", SELECTION),
        );
    }

    registry
}

/// Window-level commands, consulted after the canvas keymap.
pub fn application_commands() -> CommandRegistry<Canvas> {
    let mut registry = CommandRegistry::new();

    registry.register_descriptor(
        CommandDescriptor::new("reset_zoom", "Actual Size", |canvas: &Canvas, _: &[Value]| {
            canvas.set_viewport(Viewport::default());
            Ok(())
        })
        .key_stroke("C-0"),
    );
    registry.register_descriptor(
        CommandDescriptor::new("mark_saved", "Mark Saved", |canvas: &Canvas, _: &[Value]| {
            canvas.document().mark_saved();
            Ok(())
        })
        .subscribe_to_path("document", UNDO)
        .sensitive_cb(|canvas: &Canvas| canvas.document().is_modified())
        .key_stroke("C-S"),
    );

    registry
}

use egui::{Color32, Pos2, Rect, Vec2};
use serde_json::Value;

use crate::command::{Editable, InverseEdit};
use crate::error::EditError;

pub type ObjectId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Stroke { points: Vec<Pos2>, width: f32 },
    Rectangle { rect: Rect, radius: f32 },
}

/// A document object.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ObjectId,
    color: Color32,
    kind: ShapeKind,
}

impl Shape {
    pub fn new(id: ObjectId, color: Color32, kind: ShapeKind) -> Self {
        Self { id, color, kind }
    }

    pub fn stroke(id: ObjectId, color: Color32, width: f32, points: Vec<Pos2>) -> Self {
        Self::new(id, color, ShapeKind::Stroke { points, width })
    }

    pub fn rectangle(id: ObjectId, color: Color32, rect: Rect) -> Self {
        Self::new(id, color, ShapeKind::Rectangle { rect, radius: 0.0 })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn bounds(&self) -> Rect {
        match &self.kind {
            ShapeKind::Stroke { points, width } => {
                Rect::from_points(points).expand(width / 2.0)
            }
            ShapeKind::Rectangle { rect, .. } => *rect,
        }
    }

    pub fn contains(&self, pos: Pos2, tolerance: f32) -> bool {
        match &self.kind {
            ShapeKind::Stroke { points, width } => {
                let reach = width / 2.0 + tolerance;
                match points.as_slice() {
                    [] => false,
                    [only] => only.distance(pos) <= reach,
                    _ => points
                        .windows(2)
                        .any(|segment| distance_to_segment(pos, segment[0], segment[1]) <= reach),
                }
            }
            ShapeKind::Rectangle { rect, .. } => rect.expand(tolerance).contains(pos),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.kind {
            ShapeKind::Stroke { points, .. } => {
                for point in points {
                    *point += delta;
                }
            }
            ShapeKind::Rectangle { rect, .. } => *rect = rect.translate(delta),
        }
    }
}

fn distance_to_segment(pos: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return pos.distance(a);
    }
    let t = ((pos - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    pos.distance(a + ab * t)
}

fn number_arg(command: &str, args: &[Value], index: usize) -> Result<f32, EditError> {
    args.get(index)
        .and_then(Value::as_f64)
        .map(|n| n as f32)
        .ok_or_else(|| EditError::InvalidArgument {
            command: command.to_owned(),
            reason: format!("argument {index} must be a number"),
        })
}

impl Editable for Shape {
    fn class_name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Stroke { .. } => "Stroke",
            ShapeKind::Rectangle { .. } => "Rectangle",
        }
    }

    fn supports(&self, command: &str) -> bool {
        match (&self.kind, command) {
            (_, "translate" | "set_color") => true,
            (ShapeKind::Stroke { .. }, "set_width" | "scale_width") => true,
            (ShapeKind::Rectangle { .. }, "set_radius") => true,
            _ => false,
        }
    }

    fn apply_command(&mut self, command: &str, args: &[Value]) -> Result<InverseEdit, EditError> {
        let class = self.class_name();
        match command {
            "translate" => {
                let delta = Vec2::new(number_arg(command, args, 0)?, number_arg(command, args, 1)?);
                self.translate(delta);
                return Ok(InverseEdit::new("translate", vec![(-delta.x).into(), (-delta.y).into()]));
            }
            "set_color" => {
                let hex = args.first().and_then(Value::as_str).unwrap_or_default();
                let color = Color32::from_hex(hex).map_err(|err| EditError::InvalidArgument {
                    command: command.to_owned(),
                    reason: format!("{hex:?} is not a color: {err:?}"),
                })?;
                let old = std::mem::replace(&mut self.color, color);
                return Ok(InverseEdit::new("set_color", vec![old.to_hex().into()]));
            }
            _ => {}
        }

        match (&mut self.kind, command) {
            (ShapeKind::Stroke { width, .. }, "set_width" | "scale_width") => {
                let arg = number_arg(command, args, 0)?;
                let new_width = if command == "scale_width" { *width * arg } else { arg };
                if new_width.is_nan() || new_width <= 0.0 {
                    return Err(EditError::InvalidArgument {
                        command: command.to_owned(),
                        reason: format!("width must be positive, got {new_width}"),
                    });
                }
                let old = std::mem::replace(width, new_width);
                Ok(InverseEdit::new("set_width", vec![old.into()]))
            }
            (ShapeKind::Rectangle { radius, .. }, "set_radius") => {
                let new_radius = number_arg(command, args, 0)?;
                if new_radius < 0.0 {
                    return Err(EditError::InvalidArgument {
                        command: command.to_owned(),
                        reason: format!("radius must not be negative, got {new_radius}"),
                    });
                }
                let old = std::mem::replace(radius, new_radius);
                Ok(InverseEdit::new("set_radius", vec![old.into()]))
            }
            _ => Err(EditError::UnknownCommand {
                class,
                command: command.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_hit_uses_segments() {
        let stroke = Shape::stroke(1, Color32::BLACK, 2.0, vec![Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0)]);
        assert!(stroke.contains(Pos2::new(5.0, 1.5), 1.0));
        assert!(!stroke.contains(Pos2::new(5.0, 5.0), 1.0));
    }

    #[test]
    fn scale_width_inverse_restores_width() {
        let mut stroke = Shape::stroke(1, Color32::BLACK, 2.0, vec![Pos2::ZERO]);
        let inverse = stroke.apply_command("scale_width", &[Value::from(2.0)]).unwrap();
        assert_eq!(inverse, InverseEdit::new("set_width", vec![Value::from(2.0)]));
        stroke.apply_command(&inverse.command, &inverse.args).unwrap();
        assert!(matches!(stroke.kind(), ShapeKind::Stroke { width, .. } if *width == 2.0));
    }

    #[test]
    fn rectangle_rejects_stroke_commands() {
        let mut rect = Shape::rectangle(2, Color32::RED, Rect::from_min_size(Pos2::ZERO, Vec2::splat(4.0)));
        assert!(!rect.supports("set_width"));
        assert!(rect.apply_command("set_width", &[Value::from(1.0)]).is_err());
    }
}

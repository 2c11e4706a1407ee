use std::cell::{Cell, RefCell};
use std::rc::Rc;

use eframe_sketch::bindings::{canvas_commands, tool_mode};
use eframe_sketch::canvas::{Canvas, Preview};
use eframe_sketch::config::UndoLimit;
use eframe_sketch::document::Document;
use eframe_sketch::error::EditError;
use eframe_sketch::event::{Bus, Channel, Handler, MODE, QueueingPublisher, REDRAW, SELECTION, VIEW, handler};
use eframe_sketch::input::InputEvent;
use eframe_sketch::shape::ShapeKind;
use egui::{Color32, Modifiers, PointerButton, Pos2, Rect, Vec2};
use serde_json::Value;

fn setup() -> (Rc<Document>, Rc<Canvas>) {
    let bus = Rc::new(Bus::new());
    let document = Document::new(Rc::clone(&bus), UndoLimit::Unlimited);
    let canvas = Canvas::new(bus, Rc::clone(&document));
    (document, canvas)
}

fn enter(canvas: &Canvas, name: &str) {
    let mode = tool_mode(canvas, name).unwrap();
    canvas.enter_mode(mode, &[]).unwrap();
}

fn down(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerDown {
        pos: Pos2::new(x, y),
        button: PointerButton::Primary,
        modifiers: Modifiers::NONE,
    }
}

fn drag(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMove {
        pos: Pos2::new(x, y),
        modifiers: Modifiers::NONE,
    }
}

fn up(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerUp {
        pos: Pos2::new(x, y),
        button: PointerButton::Primary,
        modifiers: Modifiers::NONE,
    }
}

fn counter(publisher: &QueueingPublisher, channel: Channel) -> (Rc<Cell<usize>>, Handler) {
    let count = Rc::new(Cell::new(0));
    let h = {
        let count = Rc::clone(&count);
        handler(move |_| {
            count.set(count.get() + 1);
            Ok(())
        })
    };
    publisher.subscribe(channel, &h, vec![]);
    (count, h)
}

#[test]
fn drawing_a_stroke_records_one_undo_step() {
    let (document, canvas) = setup();
    enter(&canvas, "DrawStroke");
    let (redraws, _h) = counter(canvas.publisher(), REDRAW);

    canvas.handle_event(&down(10.0, 10.0)).unwrap();
    canvas.handle_event(&drag(20.0, 20.0)).unwrap();
    assert!(matches!(canvas.preview(), Some(Preview::Stroke(points)) if points.len() == 2));
    canvas.handle_event(&up(30.0, 30.0)).unwrap();

    assert_eq!(document.len(), 1);
    assert_eq!(canvas.preview(), None);
    assert_eq!(document.undo_text(), "Undo Create Stroke");
    assert_eq!(redraws.get(), 1);
}

#[test]
fn a_click_in_draw_mode_creates_nothing() {
    let (document, canvas) = setup();
    enter(&canvas, "DrawStroke");

    canvas.handle_event(&down(10.0, 10.0)).unwrap();
    canvas.handle_event(&up(10.0, 10.0)).unwrap();
    assert!(document.is_empty());
    assert!(!document.can_undo());
}

#[test]
fn dragging_a_selected_rectangle_moves_it() {
    let (document, canvas) = setup();
    let id = document
        .insert(
            ShapeKind::Rectangle {
                rect: Rect::from_min_size(Pos2::ZERO, Vec2::splat(10.0)),
                radius: 0.0,
            },
            Color32::RED,
        )
        .unwrap();
    enter(&canvas, "Select");
    let (selections, _h) = counter(document.publisher(), SELECTION);

    canvas.handle_event(&down(5.0, 5.0)).unwrap();
    assert_eq!(document.selection(), Some(id));
    assert_eq!(selections.get(), 1);

    canvas.handle_event(&drag(10.0, 5.0)).unwrap();
    assert_eq!(canvas.preview(), Some(Preview::Drag(Vec2::new(5.0, 0.0))));
    canvas.handle_event(&up(15.0, 5.0)).unwrap();

    assert_eq!(document.object(id).unwrap().bounds().min, Pos2::new(10.0, 0.0));
    assert_eq!(document.undo_text(), "Undo Move");

    document.undo().unwrap();
    assert_eq!(document.object(id).unwrap().bounds().min, Pos2::ZERO);
}

#[test]
fn clicking_empty_space_clears_the_selection() {
    let (document, canvas) = setup();
    let id = document
        .insert(
            ShapeKind::Rectangle {
                rect: Rect::from_min_size(Pos2::ZERO, Vec2::splat(10.0)),
                radius: 0.0,
            },
            Color32::RED,
        )
        .unwrap();
    document.select(Some(id));
    enter(&canvas, "Select");

    canvas.handle_event(&down(100.0, 100.0)).unwrap();
    canvas.handle_event(&up(100.0, 100.0)).unwrap();
    assert_eq!(document.selection(), None);
}

#[test]
fn zoom_click_returns_to_the_previous_mode() {
    let (_document, canvas) = setup();
    enter(&canvas, "Select");
    let (views, _h) = counter(canvas.publisher(), VIEW);

    enter(&canvas, "Zoom");
    assert!(canvas.is_temporary_mode_active());
    assert_eq!(canvas.mode_name(), "Zoom");

    canvas.handle_event(&down(50.0, 50.0)).unwrap();
    canvas.handle_event(&up(50.0, 50.0)).unwrap();

    assert_eq!(canvas.mode_name(), "Select");
    assert_eq!(canvas.viewport().scale, 2.0);
    // The point under the cursor stays put
    assert_eq!(canvas.viewport().to_doc(Pos2::new(50.0, 50.0)), Pos2::new(50.0, 50.0));
    assert_eq!(views.get(), 1);
}

#[test]
fn zoom_area_fits_the_screen() {
    let (_document, canvas) = setup();
    canvas.set_screen_rect(Rect::from_min_size(Pos2::ZERO, Vec2::new(200.0, 100.0)));
    enter(&canvas, "Select");
    enter(&canvas, "Zoom");

    canvas.handle_event(&down(0.0, 0.0)).unwrap();
    canvas.handle_event(&drag(50.0, 25.0)).unwrap();
    assert!(matches!(canvas.preview(), Some(Preview::Rectangle(_))));
    canvas.handle_event(&up(100.0, 50.0)).unwrap();

    assert_eq!(canvas.viewport().scale, 2.0);
    assert_eq!(canvas.preview(), None);
}

#[test]
fn cancel_command_abandons_a_temporary_mode() {
    let (_document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);
    enter(&canvas, "Rectangle");
    enter(&canvas, "Zoom");

    canvas.handle_event(&down(0.0, 0.0)).unwrap();
    canvas.handle_event(&drag(40.0, 40.0)).unwrap();
    commands.get("cancel").unwrap().invoke(&[]);

    assert_eq!(canvas.mode_name(), "Rectangle");
    assert_eq!(canvas.preview(), None);
    assert_eq!(canvas.viewport().scale, 1.0);
}

#[test]
fn deleting_restores_object_in_place_on_undo() {
    let (document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);
    let rect = |x: f32| ShapeKind::Rectangle {
        rect: Rect::from_min_size(Pos2::new(x, 0.0), Vec2::splat(10.0)),
        radius: 0.0,
    };
    let first = document.insert(rect(0.0), Color32::RED).unwrap();
    let second = document.insert(rect(20.0), Color32::BLUE).unwrap();
    document.select(Some(first));

    commands.get("delete").unwrap().invoke(&[]);
    assert_eq!(document.len(), 1);
    assert_eq!(document.selection(), None);
    assert!(!commands.get("delete").unwrap().is_sensitive());

    document.undo().unwrap();
    let ids: Vec<u64> = document.objects().iter().map(|shape| shape.id()).collect();
    assert_eq!(ids, vec![first, second]);
}

#[test]
fn selection_receivers_get_the_selected_id() {
    let (document, canvas) = setup();
    let id = document
        .insert(
            ShapeKind::Rectangle {
                rect: Rect::from_min_size(Pos2::ZERO, Vec2::splat(10.0)),
                radius: 0.0,
            },
            Color32::RED,
        )
        .unwrap();
    enter(&canvas, "Select");

    let received: Rc<RefCell<Vec<Vec<Value>>>> = Rc::default();
    let watcher = {
        let received = Rc::clone(&received);
        handler(move |args| {
            received.borrow_mut().push(args.to_vec());
            Ok(())
        })
    };
    document.publisher().subscribe(SELECTION, &watcher, vec![]);

    canvas.handle_event(&down(5.0, 5.0)).unwrap();
    canvas.handle_event(&up(5.0, 5.0)).unwrap();
    assert_eq!(*received.borrow(), vec![vec![Value::from(id)]]);
}

#[test]
fn edits_made_while_the_canvas_flushes_still_redraw() {
    let (document, canvas) = setup();
    let (redraws, _h) = counter(canvas.publisher(), REDRAW);

    // A mode listener that edits the document as a reaction
    let editor = {
        let document = Rc::downgrade(&document);
        handler(move |_| {
            let document = document.upgrade().ok_or("document gone")?;
            document.insert(
                ShapeKind::Rectangle {
                    rect: Rect::from_min_size(Pos2::ZERO, Vec2::splat(4.0)),
                    radius: 0.0,
                },
                Color32::GREEN,
            )?;
            Ok(())
        })
    };
    canvas.publisher().subscribe(MODE, &editor, vec![]);

    enter(&canvas, "Select");
    assert_eq!(document.len(), 1);
    assert_eq!(redraws.get(), 1);
}

#[test]
fn unsupported_object_command_is_refused_without_notifying() {
    let (document, _canvas) = setup();
    let id = document
        .insert(
            ShapeKind::Stroke {
                points: vec![Pos2::ZERO, Pos2::new(5.0, 0.0)],
                width: 1.0,
            },
            Color32::BLACK,
        )
        .unwrap();
    let (edits, _h) = counter(document.publisher(), eframe_sketch::event::EDITED);

    let err = document.apply_object_command(id, "set_radius", &[Value::from(3.0)]).unwrap_err();
    assert!(matches!(err, EditError::UnknownCommand { class: "Stroke", .. }));
    assert_eq!(edits.get(), 0);
}

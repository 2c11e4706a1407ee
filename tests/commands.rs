use std::cell::RefCell;
use std::rc::Rc;

use eframe_sketch::bindings::{application_commands, canvas_commands};
use eframe_sketch::canvas::Canvas;
use eframe_sketch::command::{CommandDescriptor, CommandRegistry, KeymapChain};
use eframe_sketch::config::UndoLimit;
use eframe_sketch::document::Document;
use eframe_sketch::event::{Bus, CHANGED, UNDO, handler};
use eframe_sketch::shape::ShapeKind;
use egui::{Color32, Pos2, Rect, Vec2};
use serde_json::Value;

fn setup() -> (Rc<Bus>, Rc<Document>, Rc<Canvas>) {
    let bus = Rc::new(Bus::new());
    let document = Document::new(Rc::clone(&bus), UndoLimit::Unlimited);
    let canvas = Canvas::new(Rc::clone(&bus), Rc::clone(&document));
    (bus, document, canvas)
}

fn stroke() -> ShapeKind {
    ShapeKind::Stroke {
        points: vec![Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0)],
        width: 2.0,
    }
}

fn stroke_width(document: &Document, id: u64) -> Option<f32> {
    match document.object(id)?.kind() {
        ShapeKind::Stroke { width, .. } => Some(*width),
        ShapeKind::Rectangle { .. } => None,
    }
}

#[test]
fn undo_command_tracks_the_history() {
    let (_bus, document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);
    let undo = commands.get("undo").unwrap();
    assert_eq!(undo.label(), "Undo");
    assert!(!undo.is_sensitive());

    document.insert(stroke(), Color32::BLACK).unwrap();
    assert_eq!(undo.label(), "Undo Create Stroke");
    assert!(undo.is_sensitive());

    undo.invoke(&[]);
    assert!(document.is_empty());
    assert!(!undo.is_sensitive());
    assert_eq!(commands.get("redo").unwrap().label(), "Redo Create Stroke");
}

#[test]
fn changes_are_announced_on_the_command() {
    let (_bus, document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);
    let undo = commands.get("undo").unwrap();

    let seen: Rc<RefCell<Vec<Value>>> = Rc::default();
    let watcher = {
        let seen = Rc::clone(&seen);
        handler(move |args| {
            seen.borrow_mut().extend_from_slice(args);
            Ok(())
        })
    };
    undo.subscribe(CHANGED, &watcher);

    document.insert(stroke(), Color32::BLACK).unwrap();
    assert_eq!(*seen.borrow(), [Value::from("undo")]);

    // Nothing changed, nothing announced
    undo.update();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn mode_commands_are_checked_for_the_current_mode() {
    let (_bus, _document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);

    commands.get("rectangle").unwrap().invoke(&[]);
    assert_eq!(canvas.mode_name(), "Rectangle");
    assert!(commands.get("rectangle").unwrap().is_on());
    assert!(!commands.get("select").unwrap().is_on());

    commands.get("select").unwrap().invoke(&[]);
    assert!(commands.get("select").unwrap().is_on());
    assert!(!commands.get("rectangle").unwrap().is_on());
}

#[test]
fn object_commands_follow_the_selection() {
    let (_bus, document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);
    let widen = commands.get("stroke_widen").unwrap();
    let round = commands.get("rectangle_round").unwrap();

    let id = document.insert(stroke(), Color32::BLACK).unwrap();
    assert!(!widen.is_sensitive());

    document.select(Some(id));
    assert!(widen.is_sensitive());
    assert!(!round.is_sensitive());

    widen.invoke(&[]);
    assert_eq!(stroke_width(&document, id), Some(4.0));
    assert_eq!(document.undo_text(), "Undo Widen Stroke");

    document.undo().unwrap();
    assert_eq!(stroke_width(&document, id), Some(2.0));
}

#[test]
fn failed_invocation_is_logged_not_raised() {
    let (_bus, document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);
    let id = document.insert(stroke(), Color32::BLACK).unwrap();
    document.select(Some(id));
    let undo_len = document.undo_len();

    // Wrong class for the selection
    commands.get("rectangle_round").unwrap().invoke(&[]);
    assert_eq!(document.undo_len(), undo_len);
}

#[test]
fn later_binding_wins_a_keystroke() {
    let (_bus, _document, canvas) = setup();
    let mut registry = CommandRegistry::new();
    registry.register_descriptor(CommandDescriptor::new("first", "First", |_: &Canvas, _: &[Value]| Ok(())).key_stroke("X"));
    registry.register_descriptor(CommandDescriptor::new("second", "Second", |_: &Canvas, _: &[Value]| Ok(())).key_stroke("X"));
    let commands = registry.instantiate_for(&canvas);

    assert_eq!(commands.keymap().resolve("X").unwrap().name(), "second");
}

#[test]
fn registering_a_name_twice_replaces_it() {
    let mut registry: CommandRegistry<Canvas> = CommandRegistry::new();
    registry.register_descriptor(CommandDescriptor::new("cmd", "Old", |_: &Canvas, _: &[Value]| Ok(())));
    registry.register_descriptor(CommandDescriptor::new("cmd", "New", |_: &Canvas, _: &[Value]| Ok(())));
    assert_eq!(registry.len(), 1);
}

#[test]
fn keymap_chain_falls_back_in_order() {
    let (_bus, document, canvas) = setup();
    let canvas_set = canvas_commands().instantiate_for(&canvas);
    let app_set = application_commands().instantiate_for(&canvas);
    let id = document.insert(
        ShapeKind::Rectangle {
            rect: Rect::from_min_size(Pos2::ZERO, Vec2::splat(10.0)),
            radius: 0.0,
        },
        Color32::RED,
    );
    document.select(Some(id.unwrap()));

    let class_keymap = canvas_set.class_keymap("Rectangle");
    let chain = KeymapChain::new()
        .then(&class_keymap)
        .then(canvas_set.keymap())
        .then(app_set.keymap());

    let name = |stroke: &str| chain.resolve(stroke).map(|c| c.name().to_owned());
    assert_eq!(name("W").as_deref(), Some("rectangle_round"));
    assert_eq!(name("C-Z").as_deref(), Some("undo"));
    assert_eq!(name("C-0").as_deref(), Some("reset_zoom"));
    assert_eq!(name("F12"), None);
}

#[test]
fn dropping_commands_removes_their_subscriptions() {
    let (bus, document, canvas) = setup();
    let commands = canvas_commands().instantiate_for(&canvas);
    assert_eq!(bus.receiver_count(document.id(), &UNDO), 2);

    drop(commands);
    assert_eq!(bus.receiver_count(document.id(), &UNDO), 0);
}

#[test]
fn panicking_target_is_contained() {
    let (_bus, document, canvas) = setup();
    let mut registry = CommandRegistry::new();
    registry.register_descriptor(CommandDescriptor::new("boom", "Boom", |_: &Canvas, _: &[Value]| {
        panic!("target bug")
    }));
    registry.register_descriptor(CommandDescriptor::new("draw", "Draw", |canvas: &Canvas, _: &[Value]| {
        canvas.document().insert(stroke(), Color32::BLACK)?;
        Ok(())
    }));
    let commands = registry.instantiate_for(&canvas);

    commands.get("boom").unwrap().invoke(&[]);

    // Later commands still run normally
    commands.get("draw").unwrap().invoke(&[]);
    assert_eq!(document.len(), 1);
}

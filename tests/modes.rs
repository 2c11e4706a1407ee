use std::cell::RefCell;
use std::rc::Rc;

use eframe_sketch::error::ModeError;
use eframe_sketch::event::{Bus, MODE, QueueingPublisher, handler};
use eframe_sketch::mode::{Mode, ModeContext, ModeKind, ModeStack};
use egui::{Modifiers, PointerButton, Pos2};
use serde_json::Value;

type Log = Rc<RefCell<Vec<String>>>;

struct Probe {
    name: &'static str,
    kind: ModeKind,
    log: Log,
}

impl Probe {
    fn major(name: &'static str, log: &Log) -> Box<dyn Mode> {
        Box::new(Self {
            name,
            kind: ModeKind::Major,
            log: Rc::clone(log),
        })
    }

    fn temporary(name: &'static str, log: &Log) -> Box<dyn Mode> {
        Box::new(Self {
            name,
            kind: ModeKind::Temporary,
            log: Rc::clone(log),
        })
    }

    fn note(&self, event: &str) {
        self.log.borrow_mut().push(format!("{event} {}", self.name));
    }
}

impl Mode for Probe {
    fn kind(&self) -> ModeKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn enter(&mut self, _args: &[Value]) {
        self.note("enter");
    }

    // A temporary probe finishes on release
    fn on_release(&mut self, ctx: &mut ModeContext, _pos: Pos2, _button: PointerButton, _modifiers: Modifiers) {
        self.note("release");
        if self.kind == ModeKind::Temporary {
            ctx.exit_temporary_mode(false);
        }
    }

    fn exit(&mut self) {
        self.note("exit");
    }

    fn cancel(&mut self) {
        self.note("cancel");
    }
}

fn stack() -> (ModeStack, Rc<QueueingPublisher>) {
    let publisher = Rc::new(QueueingPublisher::new(Rc::new(Bus::new())));
    (ModeStack::new(Rc::clone(&publisher)), publisher)
}

#[test]
fn starts_in_idle_major_mode() {
    let (modes, _) = stack();
    assert_eq!(modes.mode_name(), "Idle");
    assert_eq!(modes.mode_kind(), ModeKind::Major);
    assert_eq!(modes.depth(), 0);
}

#[test]
fn major_mode_cancels_temporaries_top_down() {
    let log: Log = Rc::default();
    let (mut modes, _) = stack();

    modes.enter_mode(Probe::major("A", &log), &[]).unwrap();
    modes.enter_mode(Probe::temporary("X", &log), &[]).unwrap();
    modes.enter_mode(Probe::temporary("Y", &log), &[]).unwrap();
    assert_eq!(modes.depth(), 2);
    log.borrow_mut().clear();

    modes.enter_mode(Probe::major("B", &log), &[]).unwrap();
    assert_eq!(*log.borrow(), ["cancel Y", "cancel X", "exit A", "enter B"]);
    assert_eq!(modes.mode_name(), "B");
    assert_eq!(modes.depth(), 0);
    assert!(!modes.is_temporary_active());
}

#[test]
fn temporary_mode_returns_to_the_mode_below() {
    let log: Log = Rc::default();
    let (mut modes, _) = stack();
    modes.enter_mode(Probe::major("A", &log), &[]).unwrap();
    modes.enter_mode(Probe::temporary("X", &log), &[]).unwrap();
    assert!(modes.is_temporary_active());

    modes.exit_temporary_mode(false).unwrap();
    assert_eq!(modes.mode_name(), "A");
    assert!(!log.borrow().contains(&"cancel X".to_owned()));

    // Nothing to leave while a major mode is current
    modes.exit_temporary_mode(true).unwrap();
    assert_eq!(modes.mode_name(), "A");
}

#[test]
fn handlers_request_transitions_through_the_context() {
    let log: Log = Rc::default();
    let (mut modes, _) = stack();
    modes.enter_mode(Probe::major("A", &log), &[]).unwrap();
    modes.enter_mode(Probe::temporary("X", &log), &[]).unwrap();

    modes
        .release(Pos2::ZERO, PointerButton::Primary, Modifiers::NONE)
        .unwrap();
    assert_eq!(modes.mode_name(), "A");
    assert_eq!(log.borrow().last().map(String::as_str), Some("release X"));
}

#[test]
fn pop_on_empty_stack_fails() {
    let (mut modes, _) = stack();
    assert_eq!(modes.pop_mode().err(), Some(ModeError::EmptyStack));
}

#[test]
fn major_mode_over_suspended_modes_is_corruption() {
    let log: Log = Rc::default();
    let (mut modes, _) = stack();
    modes.push_mode(Probe::major("A", &log));

    let err = modes.enter_mode(Probe::major("B", &log), &[]).unwrap_err();
    assert_eq!(err, ModeError::StackCorrupted(1));
}

#[test]
fn transitions_are_announced_on_the_mode_channel() {
    let log: Log = Rc::default();
    let (mut modes, publisher) = stack();
    let names: Rc<RefCell<Vec<Value>>> = Rc::default();
    let recorder = {
        let names = Rc::clone(&names);
        handler(move |args| {
            names.borrow_mut().extend_from_slice(args);
            Ok(())
        })
    };
    publisher.subscribe(MODE, &recorder, vec![]);

    modes.enter_mode(Probe::major("A", &log), &[]).unwrap();
    modes.enter_mode(Probe::temporary("X", &log), &[]).unwrap();
    modes.enter_mode(Probe::temporary("Y", &log), &[]).unwrap();
    modes.enter_mode(Probe::major("B", &log), &[]).unwrap();

    // The cascade back to a major mode is a single announcement
    assert_eq!(*names.borrow(), ["A", "X", "Y", "B"].map(Value::from));
}

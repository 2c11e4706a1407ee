use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use egui::{Pos2, Vec2};
use serde_json::Value;

use crate::command::{Editable, ObjectCommandHost};
use crate::config::UndoLimit;
use crate::error::{BoxError, BusError, EditError, UndoError};
use crate::event::{Bus, EDITED, PublisherId, QueueingPublisher, SELECTION, UNDO};
use crate::history::{Action, UndoHistory};
use crate::shape::{ObjectId, Shape, ShapeKind};

/// Pointer tolerance for hit testing, in document units
pub const HIT_TOLERANCE: f32 = 4.0;

/// The drawing being edited: its objects, the selection and the undo history.
///
/// Every mutation is recorded as an [`Action`] and announced on the bus:
/// `EDITED` when objects change, `SELECTION` when the selection changes and
/// `UNDO` when the history changes.
pub struct Document {
    this: Weak<Document>,
    publisher: Rc<QueueingPublisher>,
    objects: RefCell<Vec<Shape>>,
    selection: Cell<Option<ObjectId>>,
    history: RefCell<UndoHistory>,
    next_id: Cell<ObjectId>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id())
            .field("objects", &self.objects.borrow().len())
            .field("selection", &self.selection.get())
            .field("history", &*self.history.borrow())
            .finish()
    }
}

impl Document {
    pub fn new(bus: Rc<Bus>, undo_limit: UndoLimit) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            publisher: Rc::new(QueueingPublisher::new(bus)),
            objects: RefCell::new(Vec::new()),
            selection: Cell::new(None),
            history: RefCell::new(UndoHistory::new(undo_limit)),
            next_id: Cell::new(1),
        })
    }

    pub fn id(&self) -> PublisherId {
        self.publisher.id()
    }

    pub fn publisher(&self) -> &Rc<QueueingPublisher> {
        &self.publisher
    }

    pub fn begin_transaction(&self) {
        self.publisher.begin_transaction();
    }

    pub fn end_transaction(&self) -> Result<(), BusError> {
        self.publisher.end_transaction()
    }

    // Objects

    pub fn objects(&self) -> Vec<Shape> {
        self.objects.borrow().clone()
    }

    pub fn object(&self, id: ObjectId) -> Option<Shape> {
        self.objects.borrow().iter().find(|shape| shape.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.borrow().is_empty()
    }

    /// Topmost object under `pos`.
    pub fn hit_test(&self, pos: Pos2) -> Option<ObjectId> {
        self.objects
            .borrow()
            .iter()
            .rev()
            .find(|shape| shape.contains(pos, HIT_TOLERANCE))
            .map(Shape::id)
    }

    /// Adds a new object on top, records its undo and returns its id.
    pub fn insert(&self, kind: ShapeKind, color: egui::Color32) -> Result<ObjectId, UndoError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let label = match kind {
            ShapeKind::Stroke { .. } => "Create Stroke",
            ShapeKind::Rectangle { .. } => "Create Rectangle",
        };
        let undo = self.add_object(Shape::new(id, color, kind), None);
        self.record(undo.with_label(label))?;
        Ok(id)
    }

    /// Removes `id`, recording the undo. Returns false if there is no such object.
    pub fn remove(&self, id: ObjectId) -> Result<bool, UndoError> {
        match self.remove_object(id) {
            Some(undo) => {
                self.record(undo.with_label("Delete"))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn add_object(&self, shape: Shape, index: Option<usize>) -> Action {
        let id = shape.id();
        {
            let mut objects = self.objects.borrow_mut();
            let index = index.unwrap_or(objects.len()).min(objects.len());
            objects.insert(index, shape);
        }
        self.publisher.issue(&EDITED, &[Value::from(id)]);

        let this = self.this.clone();
        Action::new(move || {
            let document = this.upgrade().ok_or(EditError::MissingObject(id))?;
            document
                .remove_object(id)
                .ok_or_else(|| EditError::MissingObject(id).into())
        })
    }

    fn remove_object(&self, id: ObjectId) -> Option<Action> {
        let (index, shape) = {
            let mut objects = self.objects.borrow_mut();
            let index = objects.iter().position(|shape| shape.id() == id)?;
            (index, objects.remove(index))
        };
        if self.selection.get() == Some(id) {
            self.select(None);
        }
        self.publisher.issue(&EDITED, &[Value::from(id)]);

        let this = self.this.clone();
        Some(Action::new(move || {
            let document = this.upgrade().ok_or(EditError::MissingObject(id))?;
            Ok(document.add_object(shape, Some(index)))
        }))
    }

    // Selection

    /// Selects `id`, or clears the selection for `None`.
    ///
    /// `SELECTION` is only issued when the selection actually changes.
    pub fn select(&self, id: Option<ObjectId>) {
        if self.selection.get() == id {
            return;
        }
        self.selection.set(id);
        self.publisher.issue(&SELECTION, &[id.map_or(Value::Null, Value::from)]);
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection.get()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.get().is_some()
    }

    pub fn selected_class(&self) -> Option<&'static str> {
        let id = self.selection.get()?;
        self.objects
            .borrow()
            .iter()
            .find(|shape| shape.id() == id)
            .map(Editable::class_name)
    }

    /// Moves the selected object by `delta` as one undoable step.
    pub fn translate_selected(&self, delta: Vec2) -> Result<(), BoxError> {
        let class = self.selected_class().ok_or(EditError::NoSelection)?;
        self.call_object_method(class, "Move", "translate", &[Value::from(delta.x), Value::from(delta.y)])
    }

    /// Runs an object command on `id` and returns the action that undoes it.
    pub fn apply_object_command(&self, id: ObjectId, command: &str, args: &[Value]) -> Result<Action, EditError> {
        let inverse = {
            let mut objects = self.objects.borrow_mut();
            let shape = objects
                .iter_mut()
                .find(|shape| shape.id() == id)
                .ok_or(EditError::MissingObject(id))?;
            if !shape.supports(command) {
                return Err(EditError::UnknownCommand {
                    class: shape.class_name(),
                    command: command.to_owned(),
                });
            }
            shape.apply_command(command, args)?
        };
        self.publisher.issue(&EDITED, &[Value::from(id)]);

        let this = self.this.clone();
        Ok(Action::new(move || {
            let document = this.upgrade().ok_or(EditError::MissingObject(id))?;
            Ok(document.apply_object_command(id, &inverse.command, &inverse.args)?)
        }))
    }

    // History

    /// Records the undo action of an edit made outside the document's own
    /// methods.
    pub fn record(&self, action: Action) -> Result<(), UndoError> {
        self.history.borrow_mut().record(action)?;
        self.publisher.issue(&UNDO, &[]);
        Ok(())
    }

    pub fn undo(&self) -> Result<(), BusError> {
        self.begin_transaction();
        self.history.borrow_mut().undo();
        self.publisher.issue(&UNDO, &[]);
        self.end_transaction()
    }

    pub fn redo(&self) -> Result<(), BusError> {
        self.begin_transaction();
        self.history.borrow_mut().redo();
        self.publisher.issue(&UNDO, &[]);
        self.end_transaction()
    }

    pub fn can_undo(&self) -> bool {
        self.history.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    pub fn undo_text(&self) -> String {
        self.history.borrow().describe_next_undo()
    }

    pub fn redo_text(&self) -> String {
        self.history.borrow().describe_next_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.borrow().undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.borrow().redo_len()
    }

    pub fn is_modified(&self) -> bool {
        self.history.borrow().is_modified()
    }

    pub fn mark_saved(&self) {
        self.history.borrow_mut().mark_saved();
        self.publisher.issue(&UNDO, &[]);
    }

    pub fn set_undo_limit(&self, limit: UndoLimit) {
        self.history.borrow_mut().set_depth_limit(limit);
        self.publisher.issue(&UNDO, &[]);
    }
}

impl ObjectCommandHost for Document {
    fn current_object_compatible(&self, class: &str) -> bool {
        self.selected_class() == Some(class)
    }

    fn call_object_method(&self, class: &str, label: &str, method: &str, args: &[Value]) -> Result<(), BoxError> {
        let id = self.selection.get().ok_or(EditError::NoSelection)?;
        let found = self.selected_class().ok_or(EditError::MissingObject(id))?;
        if found != class {
            return Err(EditError::IncompatibleObject {
                expected: class.to_owned(),
                found,
            }
            .into());
        }

        self.begin_transaction();
        let result = self
            .apply_object_command(id, method, args)
            .map_err(BoxError::from)
            .and_then(|undo| self.record(undo.with_label(label)).map_err(BoxError::from));
        self.end_transaction()?;
        result
    }
}

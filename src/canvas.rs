use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use egui::{Pos2, Rect, Vec2};
use serde_json::Value;
use thiserror::Error;

use crate::command::{CommandOwner, ObjectCommandHost};
use crate::document::Document;
use crate::error::{BusError, ModeError};
use crate::event::{
    Bus, EDITED, Handler, MAX_FLUSH_PASSES, PublisherId, QueueingPublisher, REDRAW, SELECTION, VIEW, handler,
};
use crate::input::InputEvent;
use crate::mode::{Mode, ModeStack};
use crate::tools::ToolStyle;

/// Errors surfaced by the interaction surface.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(transparent)]
    Mode(#[from] ModeError),
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Maps document coordinates to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    /// Screen position of the document origin
    pub offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl Viewport {
    pub const MIN_SCALE: f32 = 0.05;
    pub const MAX_SCALE: f32 = 40.0;

    pub fn to_doc(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.offset) / self.scale).to_pos2()
    }

    pub fn to_screen(&self, doc: Pos2) -> Pos2 {
        (doc.to_vec2() * self.scale + self.offset).to_pos2()
    }

    /// Scales by `factor` keeping the document point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Pos2, factor: f32) {
        let anchor = self.to_doc(screen);
        self.scale = (self.scale * factor).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
        self.offset = screen.to_vec2() - anchor.to_vec2() * self.scale;
    }

    /// Makes the document rectangle `area` fill the screen rectangle `screen`.
    pub fn fit(&mut self, area: Rect, screen: Rect) {
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }
        let scale = (screen.width() / area.width()).min(screen.height() / area.height());
        self.scale = scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE);
        self.offset = screen.center().to_vec2() - area.center().to_vec2() * self.scale;
    }
}

/// In-progress feedback drawn by the active mode, in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Stroke(Vec<Pos2>),
    Rectangle(Rect),
    /// Selected object dragged by this offset
    Drag(Vec2),
}

pub type SharedPreview = Rc<RefCell<Option<Preview>>>;

/// The interaction surface of one document.
///
/// Owns the mode stack that interprets pointer input and brackets every
/// input dispatch in a transaction: notifications issued by the document or
/// the canvas during the dispatch are queued and delivered once the
/// outermost transaction ends, followed by a `REDRAW` if anything changed.
pub struct Canvas {
    this: Weak<Canvas>,
    publisher: Rc<QueueingPublisher>,
    document: Rc<Document>,
    modes: RefCell<ModeStack>,
    viewport: Cell<Viewport>,
    screen_rect: Cell<Rect>,
    preview: SharedPreview,
    style: Cell<ToolStyle>,
    redraw_pending: Rc<Cell<bool>>,
    on_document_change: Handler,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("id", &self.publisher.id())
            .field("modes", &*self.modes.borrow())
            .field("viewport", &self.viewport.get())
            .finish()
    }
}

impl Canvas {
    pub fn new(bus: Rc<Bus>, document: Rc<Document>) -> Rc<Self> {
        let publisher = Rc::new(QueueingPublisher::new(bus));
        let redraw_pending = Rc::new(Cell::new(false));

        let pending = Rc::clone(&redraw_pending);
        let on_document_change = handler(move |_| {
            pending.set(true);
            Ok(())
        });
        document.publisher().subscribe(EDITED, &on_document_change, Vec::new());
        document.publisher().subscribe(SELECTION, &on_document_change, Vec::new());

        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            modes: RefCell::new(ModeStack::new(Rc::clone(&publisher))),
            publisher,
            document,
            viewport: Cell::new(Viewport::default()),
            screen_rect: Cell::new(Rect::NOTHING),
            preview: Rc::new(RefCell::new(None)),
            style: Cell::new(ToolStyle::default()),
            redraw_pending,
            on_document_change,
        })
    }

    pub fn id(&self) -> PublisherId {
        self.publisher.id()
    }

    /// A handle for modes that need to reach back into the canvas.
    pub fn downgrade(&self) -> Weak<Canvas> {
        self.this.clone()
    }

    pub fn publisher(&self) -> &Rc<QueueingPublisher> {
        &self.publisher
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        if self.viewport.replace(viewport) != viewport {
            self.publisher.issue(&VIEW, &[Value::from(viewport.scale)]);
        }
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect.get()
    }

    pub fn set_screen_rect(&self, rect: Rect) {
        self.screen_rect.set(rect);
    }

    pub fn preview(&self) -> Option<Preview> {
        self.preview.borrow().clone()
    }

    pub fn shared_preview(&self) -> SharedPreview {
        Rc::clone(&self.preview)
    }

    /// Style used by creation modes entered from now on.
    pub fn tool_style(&self) -> ToolStyle {
        self.style.get()
    }

    pub fn set_tool_style(&self, style: ToolStyle) {
        self.style.set(style);
    }

    // Transactions

    /// Opens a transaction on the canvas and its document. Nests.
    pub fn begin_transaction(&self) {
        self.publisher.begin_transaction();
        self.document.begin_transaction();
    }

    /// Closes one transaction level. The outermost close delivers the
    /// document's queued notifications, then the canvas's own.
    pub fn end_transaction(&self) -> Result<(), CanvasError> {
        let outermost = self.publisher.transaction_depth() == 1;
        let document = self.document.end_transaction();
        if outermost && self.redraw_pending.replace(false) {
            self.publisher.issue(&REDRAW, &[]);
        }
        let canvas = self.publisher.end_transaction();

        // Receivers of the canvas flush may have edited the document again
        if outermost {
            let mut passes = 0;
            while passes < MAX_FLUSH_PASSES && self.redraw_pending.replace(false) {
                self.publisher.issue(&REDRAW, &[]);
                passes += 1;
            }
        }
        document?;
        canvas?;
        Ok(())
    }

    pub fn transaction<R>(&self, f: impl FnOnce() -> R) -> Result<R, CanvasError> {
        self.begin_transaction();
        let result = f();
        self.end_transaction()?;
        Ok(result)
    }

    // Modes

    pub fn mode_name(&self) -> &'static str {
        self.modes.borrow().mode_name()
    }

    pub fn mode_text(&self) -> String {
        self.modes.borrow().current().text().to_owned()
    }

    pub fn is_temporary_mode_active(&self) -> bool {
        self.modes.borrow().is_temporary_active()
    }

    pub fn mode_depth(&self) -> usize {
        self.modes.borrow().depth()
    }

    pub fn enter_mode(&self, mode: Box<dyn Mode>, args: &[Value]) -> Result<(), CanvasError> {
        self.transaction(|| self.modes.borrow_mut().enter_mode(mode, args))??;
        Ok(())
    }

    pub fn exit_temporary_mode(&self, cancel: bool) -> Result<(), CanvasError> {
        self.transaction(|| self.modes.borrow_mut().exit_temporary_mode(cancel))??;
        Ok(())
    }

    pub fn cancel_temporary_mode(&self) -> Result<(), CanvasError> {
        self.exit_temporary_mode(true)
    }

    /// Routes a pointer event to the current mode, in document coordinates.
    ///
    /// Key events are not handled here; they are resolved through the
    /// keymaps by whoever owns the commands.
    pub fn handle_event(&self, event: &InputEvent) -> Result<(), CanvasError> {
        let viewport = self.viewport.get();
        self.transaction(|| {
            let mut modes = self.modes.borrow_mut();
            match *event {
                InputEvent::PointerDown { pos, button, modifiers } => {
                    modes.press(viewport.to_doc(pos), button, modifiers)
                }
                InputEvent::PointerMove { pos, modifiers } => modes.motion(viewport.to_doc(pos), modifiers),
                InputEvent::PointerUp { pos, button, modifiers } => {
                    modes.release(viewport.to_doc(pos), button, modifiers)
                }
                InputEvent::KeyDown { .. } => Ok(()),
            }
        })??;
        Ok(())
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        let publisher = self.document.publisher();
        let _ = publisher.unsubscribe(EDITED, &self.on_document_change, &[]);
        let _ = publisher.unsubscribe(SELECTION, &self.on_document_change, &[]);
    }
}

impl CommandOwner for Canvas {
    fn bus(&self) -> Rc<Bus> {
        Rc::clone(self.publisher.bus())
    }

    fn publisher_id(&self) -> PublisherId {
        self.publisher.id()
    }

    fn resolve_publisher(&self, path: &[String]) -> Option<PublisherId> {
        match path {
            [] => Some(self.publisher.id()),
            [name] if name == "document" => Some(self.document.id()),
            _ => None,
        }
    }

    fn object_host(&self) -> Option<&dyn ObjectCommandHost> {
        Some(self.document.as_ref())
    }
}

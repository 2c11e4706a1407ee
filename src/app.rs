use std::cell::{Cell, RefCell};
use std::rc::Rc;

use egui::{Key, Modifiers};

use crate::bindings::{application_commands, canvas_commands, tool_mode};
use crate::canvas::Canvas;
use crate::command::{Command, CommandSet, KeymapChain};
use crate::config::Preferences;
use crate::document::Document;
use crate::event::{APP_INITIALIZED, Bus, Handler, MODE, PublisherKey, REDRAW, handler};
use crate::input::{InputEvent, InputHandler, keystroke};
use crate::renderer::Renderer;

pub struct SketchApp {
    bus: Rc<Bus>,
    document: Rc<Document>,
    canvas: Rc<Canvas>,
    canvas_commands: CommandSet<Canvas>,
    app_commands: CommandSet<Canvas>,
    input: InputHandler,
    renderer: Renderer,
    // Kept alive for the subscriptions below
    status: Rc<RefCell<String>>,
    repaint: Rc<Cell<bool>>,
    _on_mode: Handler,
    _on_redraw: Handler,
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>, preferences: Preferences) -> Self {
        Self::with_preferences(preferences)
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        let bus = Rc::new(Bus::new());
        let document = Document::new(Rc::clone(&bus), preferences.undo_limit);
        let canvas = Canvas::new(Rc::clone(&bus), Rc::clone(&document));

        let status = Rc::new(RefCell::new(String::new()));
        let status_text = Rc::clone(&status);
        let on_mode = handler(move |args| {
            let name = args.first().and_then(|v| v.as_str()).unwrap_or("?");
            *status_text.borrow_mut() = format!("Mode: {name}");
            Ok(())
        });
        canvas.publisher().subscribe(MODE, &on_mode, Vec::new());

        let repaint = Rc::new(Cell::new(false));
        let flag = Rc::clone(&repaint);
        let on_redraw = handler(move |_| {
            flag.set(true);
            Ok(())
        });
        canvas.publisher().subscribe(REDRAW, &on_redraw, Vec::new());

        let canvas_commands = canvas_commands().instantiate_for(&canvas);
        let app_commands = application_commands().instantiate_for(&canvas);

        if let Some(mode) = tool_mode(&canvas, "Select") {
            if let Err(err) = canvas.enter_mode(mode, &[]) {
                log::error!("Failed to enter initial mode: {err}");
            }
        }
        bus.emit(PublisherKey::Global, &APP_INITIALIZED, &[]);
        log::info!("Sketch editor ready, undo limit {}", preferences.undo_limit);

        Self {
            bus,
            document,
            canvas,
            canvas_commands,
            app_commands,
            input: InputHandler::new(),
            renderer: Renderer::new(),
            status,
            repaint,
            _on_mode: on_mode,
            _on_redraw: on_redraw,
        }
    }

    pub fn bus(&self) -> &Rc<Bus> {
        &self.bus
    }

    pub fn canvas(&self) -> &Rc<Canvas> {
        &self.canvas
    }

    /// Resolves a key press through the keymaps of the selected object's
    /// class, the canvas and the application, in that order, and invokes
    /// the first sensitive match.
    pub fn handle_key(&self, key: Key, modifiers: Modifiers) {
        let stroke = keystroke(key, modifiers);
        let class_keymap = self
            .document
            .selected_class()
            .map(|class| self.canvas_commands.class_keymap(class));

        let mut chain = KeymapChain::new();
        if let Some(keymap) = &class_keymap {
            chain = chain.then(keymap);
        }
        let chain = chain.then(self.canvas_commands.keymap()).then(self.app_commands.keymap());

        match chain.resolve(&stroke) {
            Some(command) if command.is_sensitive() => self.invoke(&command),
            Some(command) => log::debug!("{stroke}: {} is not available", command.name()),
            None => log::trace!("{stroke} is unbound"),
        }
    }

    fn invoke(&self, command: &Command<Canvas>) {
        if let Err(err) = self.canvas.transaction(|| command.invoke(&[])) {
            log::error!(target: "internal", "{}: {err}", command.name());
        }
    }

    fn command_panel(&self, ui: &mut egui::Ui) {
        let mut clicked = None;

        ui.heading("Tools");
        ui.separator();
        for command in self.canvas_commands.iter().filter(|c| c.is_check()) {
            let label = egui::SelectableLabel::new(command.is_on(), command.label());
            if ui.add_enabled(command.is_sensitive(), label).clicked() {
                clicked = Some(Rc::clone(command));
            }
        }

        ui.add_space(8.0);
        ui.heading("Edit");
        ui.separator();
        let buttons = self
            .canvas_commands
            .iter()
            .chain(self.app_commands.iter())
            .filter(|c| !c.is_check());
        for command in buttons {
            if ui.add_enabled(command.is_sensitive(), egui::Button::new(command.label())).clicked() {
                clicked = Some(Rc::clone(command));
            }
        }

        // Invoke after the loop; the command may refresh others
        if let Some(command) = clicked {
            self.invoke(&command);
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.status.borrow().as_str());
            ui.separator();
            ui.label(format!("{} object(s)", self.document.len()));
            ui.separator();
            ui.label(format!("{:.0}%", self.canvas.viewport().scale * 100.0));
            if self.document.is_modified() {
                ui.separator();
                ui.label("modified");
            }
        });
    }
}

impl eframe::App for SketchApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("commands").show(ctx, |ui| self.command_panel(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_bar(ui));

        let rect = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                self.canvas.set_screen_rect(response.rect);
                self.renderer.render(&painter, &self.canvas);
                response.rect
            })
            .inner;

        for event in self.input.process_input(ctx, rect) {
            match event {
                InputEvent::KeyDown { key, modifiers } => self.handle_key(key, modifiers),
                _ => {
                    if let Err(err) = self.canvas.handle_event(&event) {
                        log::error!("Failed to handle {event:?}: {err}");
                    }
                }
            }
        }

        if self.repaint.replace(false) {
            ctx.request_repaint();
        }
    }
}

#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod bindings;
pub mod canvas;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod history;
pub mod input;
pub mod mode;
pub mod renderer;
pub mod shape;
pub mod tools;

pub use app::SketchApp;
pub use canvas::{Canvas, CanvasError, Viewport};
pub use command::{Command, CommandDescriptor, CommandRegistry, Keymap, KeymapChain};
pub use config::{Preferences, UndoLimit};
pub use document::Document;
pub use error::{BoxError, BusError, ConfigError, EditError, ModeError, UndoError};
pub use event::{Bus, Publisher, QueueingPublisher};
pub use history::{Action, UndoHistory};
pub use input::{InputEvent, InputHandler};
pub use mode::{Mode, ModeKind, ModeStack};
pub use renderer::Renderer;
pub use shape::{Shape, ShapeKind};

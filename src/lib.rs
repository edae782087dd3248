pub mod core;
pub mod demo;
pub mod forms;
pub mod runtime;
pub mod session;
pub mod terminal;
pub mod ui;
pub mod widgets;

pub use crate::core::shape::{Field, PrimitiveKind, Shape};
pub use crate::core::symbols::SymbolTable;
pub use crate::core::value::Value;
pub use crate::core::value_path::ValuePath;

pub use crate::forms::{Form, Panel};
pub use crate::session::{
    Connection, Operation, Outcome, PluginElement, PluginFrame, PluginRegistry, SessionContext,
    UserLookup, UserProfile,
};
pub use crate::widgets::inspector::Inspector;

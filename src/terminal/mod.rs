pub mod backend;
pub mod terminal_event;

pub use backend::Terminal;
pub use terminal_event::{KeyCode, KeyEvent, KeyModifiers, TerminalEvent, TerminalSize};

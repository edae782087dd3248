use crate::core::value::Value;
use crate::runtime::event::WidgetAction;
use crate::terminal::KeyEvent;
use crate::ui::span::SpanLine;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    /// Node does not participate in focus cycling.
    None,
    /// A single focusable leaf (text input, checkbox, select, …).
    Leaf,
    /// A component that manages focus internally among its rows.
    Group,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// `Live` runs on keystrokes and tolerates partial input; `Submit` runs
/// before a request is dispatched and the value must be complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Live,
    Submit,
}

// ---------------------------------------------------------------------------
// Render context & output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Id of the widget that currently holds focus. Groups chain this down
    /// to their active row when they are the focused widget themselves.
    pub focused_id: Option<String>,
    pub width: u16,
}

impl RenderContext {
    pub fn new(focused_id: Option<String>, width: u16) -> Self {
        Self { focused_id, width }
    }

    /// Context for a child row: focus passes down only to `child_id`.
    pub fn for_child(&self, child_id: Option<String>) -> Self {
        Self {
            focused_id: child_id,
            width: self.width,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrawOutput {
    pub lines: Vec<SpanLine>,
}

// ---------------------------------------------------------------------------
// Drawable / Interactive
// ---------------------------------------------------------------------------

pub trait Drawable: Send {
    fn id(&self) -> &str;
    fn label(&self) -> &str {
        ""
    }
    fn draw(&self, ctx: &RenderContext) -> DrawOutput;
}

#[derive(Debug, Clone, Default)]
pub struct InteractionResult {
    pub handled: bool,
    pub request_render: bool,
    pub actions: Vec<WidgetAction>,
}

impl InteractionResult {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            request_render: true,
            actions: Vec::new(),
        }
    }

    /// Swallow the key without any visible effect (inert controls).
    pub fn consumed() -> Self {
        Self {
            handled: true,
            request_render: false,
            actions: Vec::new(),
        }
    }

    pub fn with_action(action: WidgetAction) -> Self {
        Self {
            handled: true,
            request_render: true,
            actions: vec![action],
        }
    }

    /// The widget's value changed; owners re-snapshot via `value()`.
    pub fn edited() -> Self {
        Self::with_action(WidgetAction::Edited)
    }

    pub fn input_done() -> Self {
        Self::with_action(WidgetAction::InputDone)
    }

    pub fn notify(message: impl Into<String>) -> Self {
        Self::with_action(WidgetAction::Notify {
            message: message.into(),
        })
    }

    pub fn edited_flag(&self) -> bool {
        self.actions
            .iter()
            .any(|action| matches!(action, WidgetAction::Edited))
    }

    pub fn merge(&mut self, other: Self) {
        self.handled |= other.handled;
        self.request_render |= other.request_render;
        self.actions.extend(other.actions);
    }
}

pub trait Interactive: Send {
    fn focus_mode(&self) -> FocusMode;

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult;

    /// Called when focus moves into a group from outside: `from_top` means
    /// the cursor arrived moving downward. Groups position their internal
    /// cursor on the first or last focusable row accordingly.
    fn focus_enter(&mut self, _from_top: bool) {}

    /// Polled from the event loop; channel-backed widgets drain here.
    fn on_tick(&mut self) -> InteractionResult {
        InteractionResult::ignored()
    }

    fn value(&self) -> Option<Value> {
        None
    }

    fn set_value(&mut self, _value: Value) {}

    fn validate(&self, _mode: ValidationMode) -> Result<(), String> {
        Ok(())
    }
}

/// Combined bound used wherever editors are boxed.
pub trait InteractiveNode: Drawable + Interactive {}
impl<T> InteractiveNode for T where T: Drawable + Interactive {}

use crate::core::shape::Shape;
use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::{Span, indent_lines};
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::editor::{DefaultFn, editor_for};
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, InteractiveNode,
    RenderContext, ValidationMode,
};

/// Presence wrapper around an inner editor. The toggle row is the header;
/// presence is always re-derived from whether an inner child exists, which
/// tracks `value != None` exactly. Toggling on builds the inner editor from
/// the caller-supplied default; toggling off discards it outright.
pub struct OptionalEditor {
    base: WidgetBase,
    inner_shape: Shape,
    default_value: DefaultFn,
    child: Option<Box<dyn InteractiveNode>>,
    /// 0 = toggle row, 1 = inner child.
    active: usize,
}

impl OptionalEditor {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        inner_shape: Shape,
        default_value: DefaultFn,
    ) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            inner_shape,
            default_value,
            child: None,
            active: 0,
        }
    }

    pub fn with_value(mut self, value: &Value) -> Self {
        self.set_value(value.clone());
        self
    }

    fn child_id(&self) -> String {
        format!("{}.some", self.base.id())
    }

    fn build_child(&self, value: &Value) -> Box<dyn InteractiveNode> {
        editor_for(&self.inner_shape, value, self.child_id().as_str(), "")
    }

    fn toggle(&mut self) -> InteractionResult {
        if self.child.is_some() {
            // discard unconditionally; the default, not the old value,
            // comes back on the next toggle
            self.child = None;
            self.active = 0;
        } else {
            let seeded = (self.default_value)();
            self.child = Some(self.build_child(&seeded));
        }
        InteractionResult::edited()
    }

    fn child_focusable(&self) -> bool {
        self.child
            .as_ref()
            .is_some_and(|child| !matches!(child.focus_mode(), FocusMode::None))
    }
}

impl Drawable for OptionalEditor {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let header_focused = focused && self.active == 0;

        let mut header = vec![Span::new(self.base.focus_marker(header_focused).to_string())];
        if !self.base.label().is_empty() {
            header.push(Span::new(format!("{}: ", self.base.label())));
        }
        let mut lines = Vec::new();
        match &self.child {
            None => {
                header.push(Span::styled("none", Style::new().color(Color::DarkGrey)));
                lines.push(header);
            }
            Some(child) => {
                header.push(Span::styled("set", Style::new().color(Color::Green)));
                lines.push(header);
                let child_ctx = ctx.for_child(if focused && self.active == 1 {
                    Some(child.id().to_string())
                } else {
                    None
                });
                let mut child_lines = child.draw(&child_ctx).lines;
                indent_lines(&mut child_lines, 2);
                lines.extend(child_lines);
            }
        }
        DrawOutput { lines }
    }
}

impl Interactive for OptionalEditor {
    fn focus_mode(&self) -> FocusMode {
        FocusMode::Group
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if self.active == 1 {
            if let Some(child) = self.child.as_mut() {
                let result = child.on_key(key);
                if result.handled {
                    return result;
                }
            }
        }

        // structural modifiers belong to an enclosing list editor
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return InteractionResult::ignored();
        }

        match key.code {
            KeyCode::Char(' ') if self.active == 0 && key.modifiers == KeyModifiers::NONE => {
                self.toggle()
            }
            KeyCode::Up => {
                if self.active == 1 {
                    self.active = 0;
                    return InteractionResult::handled();
                }
                InteractionResult::ignored()
            }
            KeyCode::Down => {
                if self.active == 0 && self.child_focusable() {
                    self.active = 1;
                    if let Some(child) = self.child.as_mut() {
                        child.focus_enter(true);
                    }
                    return InteractionResult::handled();
                }
                InteractionResult::ignored()
            }
            _ => InteractionResult::ignored(),
        }
    }

    fn focus_enter(&mut self, from_top: bool) {
        if from_top || !self.child_focusable() {
            self.active = 0;
            return;
        }
        self.active = 1;
        if let Some(child) = self.child.as_mut() {
            child.focus_enter(false);
        }
    }

    fn on_tick(&mut self) -> InteractionResult {
        match self.child.as_mut() {
            Some(child) => child.on_tick(),
            None => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        match &self.child {
            Some(child) => Some(child.value().unwrap_or(Value::None)),
            None => Some(Value::None),
        }
    }

    fn set_value(&mut self, value: Value) {
        if value.is_absent() {
            self.child = None;
            self.active = 0;
            return;
        }
        self.child = Some(self.build_child(&value));
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        match &self.child {
            Some(child) => child.validate(mode),
            None => Ok(()),
        }
    }
}

use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, RenderContext,
};

pub struct CheckboxInput {
    base: WidgetBase,
    checked: bool,
}

impl CheckboxInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            checked: false,
        }
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    fn toggle(&mut self) {
        self.checked = !self.checked;
    }
}

impl Drawable for CheckboxInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let (symbol, color) = if self.checked {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };
        DrawOutput {
            lines: vec![vec![
                Span::new(self.base.input_prefix(focused)),
                Span::styled(symbol, Style::new().color(color)),
            ]],
        }
    }
}

impl Interactive for CheckboxInput {
    fn focus_mode(&self) -> FocusMode {
        FocusMode::Leaf
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Char(' ') => {
                self.toggle();
                InteractionResult::edited()
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Bool(self.checked))
    }

    fn set_value(&mut self, value: Value) {
        if let Some(v) = value.as_bool() {
            self.checked = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CheckboxInput;
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Interactive;

    #[test]
    fn space_toggles_and_reports_edit() {
        let mut input = CheckboxInput::new("ready", "Ready");
        let result = input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert!(result.edited_flag());
        assert_eq!(input.value(), Some(Value::Bool(true)));
        input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert_eq!(input.value(), Some(Value::Bool(false)));
    }
}

use super::text_edit;
use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, RenderContext, ValidationMode,
};
use crate::widgets::validators::{Validator, run_validators};

pub struct TextInput {
    base: WidgetBase,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    validators: Vec<Validator>,
}

impl TextInput {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            validators: Vec::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_text(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = text_edit::char_count(self.value.as_str());
        self
    }
}

impl Drawable for TextInput {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let mut line = vec![Span::new(self.base.input_prefix(focused))];
        if self.value.is_empty() {
            if let Some(placeholder) = &self.placeholder {
                line.push(Span::styled(
                    placeholder.clone(),
                    Style::new().color(Color::DarkGrey),
                ));
            }
        } else {
            let style = if focused {
                Style::new().color(Color::Cyan)
            } else {
                Style::default()
            };
            line.push(Span::styled(self.value.clone(), style));
        }
        DrawOutput { lines: vec![line] }
    }
}

impl Interactive for TextInput {
    fn focus_mode(&self) -> FocusMode {
        FocusMode::Leaf
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return InteractionResult::ignored();
        }
        match key.code {
            KeyCode::Char(ch) if !ch.is_control() => {
                text_edit::insert_char(&mut self.value, &mut self.cursor, ch);
                InteractionResult::edited()
            }
            KeyCode::Backspace => {
                if text_edit::backspace_char(&mut self.value, &mut self.cursor) {
                    return InteractionResult::edited();
                }
                InteractionResult::ignored()
            }
            KeyCode::Delete => {
                if text_edit::delete_char(&mut self.value, &mut self.cursor) {
                    return InteractionResult::edited();
                }
                InteractionResult::ignored()
            }
            KeyCode::Left => {
                if text_edit::move_left(&mut self.cursor, self.value.as_str()) {
                    return InteractionResult::handled();
                }
                InteractionResult::ignored()
            }
            KeyCode::Right => {
                if text_edit::move_right(&mut self.cursor, self.value.as_str()) {
                    return InteractionResult::handled();
                }
                InteractionResult::ignored()
            }
            KeyCode::Home => {
                self.cursor = 0;
                InteractionResult::handled()
            }
            KeyCode::End => {
                self.cursor = text_edit::char_count(self.value.as_str());
                InteractionResult::handled()
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        Some(Value::Text(self.value.clone()))
    }

    fn set_value(&mut self, value: Value) {
        if let Some(text) = value.scalar_text() {
            self.value = text;
            self.cursor = text_edit::char_count(self.value.as_str());
        }
    }

    fn validate(&self, _mode: ValidationMode) -> Result<(), String> {
        run_validators(&self.validators, &Value::Text(self.value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::TextInput;
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Interactive;

    #[test]
    fn typing_edits_and_reports() {
        let mut input = TextInput::new("name", "Name");
        let result = input.on_key(KeyEvent::plain(KeyCode::Char('k')));
        assert!(result.edited_flag());
        assert_eq!(input.value(), Some(Value::text("k")));
    }

    #[test]
    fn enter_requests_submit() {
        let mut input = TextInput::new("name", "Name").with_text("kay");
        let result = input.on_key(KeyEvent::plain(KeyCode::Enter));
        assert!(result.handled);
        assert!(!result.edited_flag());
    }
}

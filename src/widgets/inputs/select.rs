use crate::core::symbols::SymbolTable;
use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, RenderContext,
};

/// Closed choice over a symbol table's numeric entries. The backing value —
/// never the label — is what `value()` reports.
pub struct EnumSelect {
    base: WidgetBase,
    table: SymbolTable,
    selected: usize,
}

impl EnumSelect {
    pub fn new(id: impl Into<String>, label: impl Into<String>, table: SymbolTable) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            table,
            selected: 0,
        }
    }

    pub fn with_backing(mut self, backing: i64) -> Self {
        if let Some(position) = self.table.position_of(backing) {
            self.selected = position;
        }
        self
    }

    fn move_selection(&mut self, delta: isize) -> bool {
        let len = self.table.len();
        if len == 0 {
            return false;
        }
        let len = len as isize;
        self.selected = ((self.selected as isize + delta + len) % len) as usize;
        true
    }

    fn selected_label(&self) -> &str {
        self.table.label_at(self.selected).unwrap_or("")
    }
}

impl Drawable for EnumSelect {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let style = if focused {
            Style::new().color(Color::Cyan)
        } else {
            Style::default()
        };
        DrawOutput {
            lines: vec![vec![
                Span::new(self.base.input_prefix(focused)),
                Span::styled(format!("‹ {} ›", self.selected_label()), style),
            ]],
        }
    }
}

impl Interactive for EnumSelect {
    fn focus_mode(&self) -> FocusMode {
        FocusMode::Leaf
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Left => {
                if self.move_selection(-1) {
                    return InteractionResult::edited();
                }
                InteractionResult::ignored()
            }
            KeyCode::Right => {
                if self.move_selection(1) {
                    return InteractionResult::edited();
                }
                InteractionResult::ignored()
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> Option<Value> {
        self.table.value_at(self.selected).map(Value::Int)
    }

    fn set_value(&mut self, value: Value) {
        if let Some(backing) = value.as_int()
            && let Some(position) = self.table.position_of(backing)
        {
            self.selected = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EnumSelect;
    use crate::core::symbols::SymbolTable;
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Interactive;

    fn vote_select() -> EnumSelect {
        EnumSelect::new(
            "vote",
            "Vote",
            SymbolTable::from_labels(["Approve", "Reject"]),
        )
    }

    #[test]
    fn cycling_reports_backing_values() {
        let mut select = vote_select();
        assert_eq!(select.value(), Some(Value::Int(0)));
        let result = select.on_key(KeyEvent::plain(KeyCode::Right));
        assert!(result.edited_flag());
        assert_eq!(select.value(), Some(Value::Int(1)));
        select.on_key(KeyEvent::plain(KeyCode::Right));
        assert_eq!(select.value(), Some(Value::Int(0)));
    }

    #[test]
    fn set_value_out_of_table_keeps_selection() {
        let mut select = vote_select();
        select.set_value(Value::Int(9));
        assert_eq!(select.value(), Some(Value::Int(0)));
    }
}

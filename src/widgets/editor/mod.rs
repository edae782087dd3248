pub mod list;
pub mod optional;
pub mod record;

use std::sync::Arc;

use crate::core::shape::{PrimitiveKind, Shape};
use crate::core::value::Value;
use crate::terminal::KeyEvent;
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::inputs::{CheckboxInput, EnumSelect, FloatInput, IntInput, TextInput};
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, InteractiveNode,
    RenderContext,
};

pub use list::ListEditor;
pub use optional::OptionalEditor;
pub use record::RecordEditor;

/// Caller-supplied default constructor handed to the optional and list
/// editors; the handlers never invent defaults themselves.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

pub fn blank_of(shape: &Shape) -> DefaultFn {
    let shape = shape.clone();
    Arc::new(move || shape.blank())
}

/// The edit-pipeline dispatcher: one editor per shape variant, seeded with
/// the current value. References and plugins have no edit mode; they pass
/// through as read-only rows so record reassembly keeps their value.
pub fn editor_for(
    shape: &Shape,
    value: &Value,
    id: &str,
    label: &str,
) -> Box<dyn InteractiveNode> {
    match shape {
        Shape::Primitive(PrimitiveKind::Text) => {
            let mut input = TextInput::new(id, label);
            input.set_value(value.clone());
            Box::new(input)
        }
        Shape::Primitive(PrimitiveKind::Int) => {
            let mut input = IntInput::new(id, label);
            input.set_value(value.clone());
            Box::new(input)
        }
        Shape::Primitive(PrimitiveKind::Float) => {
            let mut input = FloatInput::new(id, label);
            input.set_value(value.clone());
            Box::new(input)
        }
        Shape::Primitive(PrimitiveKind::Bool) => {
            let mut input = CheckboxInput::new(id, label);
            input.set_value(value.clone());
            Box::new(input)
        }
        Shape::Enum(table) => {
            let mut select = EnumSelect::new(id, label, table.clone());
            select.set_value(value.clone());
            Box::new(select)
        }
        Shape::Optional(inner) => Box::new(
            OptionalEditor::new(id, label, (**inner).clone(), blank_of(inner)).with_value(value),
        ),
        Shape::List(inner) => Box::new(
            ListEditor::new(id, label, (**inner).clone(), blank_of(inner)).with_value(value),
        ),
        Shape::Record(fields) => {
            Box::new(RecordEditor::new(id, label, fields.clone()).with_value(value))
        }
        Shape::Reference | Shape::Plugin { .. } => {
            Box::new(ReadOnlyRow::new(id, label, value.clone()))
        }
    }
}

/// Inert leaf for shapes the edit pipeline does not edit. Skipped by focus
/// cycling; `value()` echoes the seeded value unchanged.
pub struct ReadOnlyRow {
    base: WidgetBase,
    value: Value,
}

impl ReadOnlyRow {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: Value) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            value,
        }
    }
}

impl Drawable for ReadOnlyRow {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, _ctx: &RenderContext) -> DrawOutput {
        let mut line = vec![Span::new("  ")];
        if !self.base.label().is_empty() {
            line.push(Span::new(format!("{}: ", self.base.label())));
        }
        line.push(Span::styled(
            self.value.preview(48),
            Style::new().color(Color::DarkGrey),
        ));
        DrawOutput { lines: vec![line] }
    }
}

impl Interactive for ReadOnlyRow {
    fn focus_mode(&self) -> FocusMode {
        FocusMode::None
    }

    fn on_key(&mut self, _key: KeyEvent) -> InteractionResult {
        InteractionResult::ignored()
    }

    fn value(&self) -> Option<Value> {
        Some(self.value.clone())
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::editor_for;
    use crate::core::shape::{Field, Shape};
    use crate::core::symbols::SymbolTable;
    use crate::core::value::Value;

    #[test]
    fn dispatch_round_trips_a_nested_payload() {
        let shape = Shape::record(vec![
            Field::new("questId", Shape::int()),
            Field::new(
                "vote",
                Shape::enumeration(SymbolTable::from_labels(["Approve", "Reject"])),
            ),
            Field::new("members", Shape::list(Shape::text())),
            Field::new("note", Shape::optional(Shape::text())),
        ]);
        let value = Value::record(vec![
            ("questId".to_string(), Value::Int(2)),
            ("vote".to_string(), Value::Int(1)),
            (
                "members".to_string(),
                Value::List(vec![Value::text("u1"), Value::text("u2")]),
            ),
            ("note".to_string(), Value::None),
        ]);

        let editor = editor_for(&shape, &value, "payload", "");
        assert_eq!(editor.value(), Some(value));
    }

    #[test]
    fn reference_fields_pass_through_read_only() {
        let shape = Shape::record(vec![Field::new("leader", Shape::Reference)]);
        let value = Value::record(vec![("leader".to_string(), Value::text("u1"))]);
        let editor = editor_for(&shape, &value, "payload", "");
        assert_eq!(editor.value(), Some(value));
    }
}

use crate::core::shape::Field;
use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::{Span, indent_lines};
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::editor::editor_for;
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, InteractiveNode,
    RenderContext, ValidationMode,
};

/// Composes named fields in declaration order, delegating each to the
/// editor for its declared shape. No logic of its own beyond ordering and
/// labeling. A record with an empty label renders headerless (form roots).
pub struct RecordEditor {
    base: WidgetBase,
    fields: Vec<Field>,
    children: Vec<Box<dyn InteractiveNode>>,
    /// With a header: 0 = header, `i >= 1` = child `i - 1`.
    /// Headerless: `i >= 1` = child `i - 1`, row 0 unused.
    active: usize,
    collapsed: bool,
}

impl RecordEditor {
    pub fn new(id: impl Into<String>, label: impl Into<String>, fields: Vec<Field>) -> Self {
        let base = WidgetBase::new(id, label);
        let mut editor = Self {
            base,
            fields,
            children: Vec::new(),
            active: 0,
            collapsed: false,
        };
        let blank = Value::record(
            editor
                .fields
                .iter()
                .map(|field| (field.name.clone(), field.shape.blank())),
        );
        editor.rebuild_children(&blank);
        editor.active = editor.initial_active();
        editor
    }

    pub fn with_value(mut self, value: &Value) -> Self {
        self.set_value(value.clone());
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        if collapsed {
            self.active = 0;
        }
        self
    }

    fn has_header(&self) -> bool {
        !self.base.label().is_empty()
    }

    fn initial_active(&self) -> usize {
        if self.has_header() {
            return 0;
        }
        self.first_focusable_child()
            .map(|index| index + 1)
            .unwrap_or(1)
    }

    fn rebuild_children(&mut self, value: &Value) {
        let base_id = self.base.id().to_string();
        self.children = self
            .fields
            .iter()
            .map(|field| {
                let seeded = value
                    .field(field.name.as_str())
                    .cloned()
                    .unwrap_or_else(|| field.shape.blank());
                editor_for(
                    &field.shape,
                    &seeded,
                    format!("{base_id}.{}", field.name).as_str(),
                    field.name.as_str(),
                )
            })
            .collect();
    }

    fn child_focusable(&self, index: usize) -> bool {
        self.children
            .get(index)
            .is_some_and(|child| !matches!(child.focus_mode(), FocusMode::None))
    }

    fn first_focusable_child(&self) -> Option<usize> {
        (0..self.children.len()).find(|&index| self.child_focusable(index))
    }

    fn last_focusable_child(&self) -> Option<usize> {
        (0..self.children.len())
            .rev()
            .find(|&index| self.child_focusable(index))
    }

    fn move_active(&mut self, dir: isize) -> bool {
        let min_row = if self.has_header() { 0 } else { 1 };
        let mut row = self.active as isize;
        loop {
            row += dir;
            if row < min_row as isize {
                return false;
            }
            let row_usize = row as usize;
            if row_usize == 0 {
                self.active = 0;
                return true;
            }
            if self.collapsed || row_usize > self.children.len() {
                return false;
            }
            if self.child_focusable(row_usize - 1) {
                self.active = row_usize;
                if let Some(child) = self.children.get_mut(row_usize - 1) {
                    child.focus_enter(dir > 0);
                }
                return true;
            }
        }
    }
}

impl Drawable for RecordEditor {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let mut lines = Vec::new();
        let indent = if self.has_header() {
            let header_focused = focused && self.active == 0;
            let glyph = if self.collapsed { "▶ " } else { "▼ " };
            let mut header = vec![
                Span::new(self.base.focus_marker(header_focused).to_string()),
                Span::styled(
                    glyph,
                    if header_focused {
                        Style::new().color(Color::Cyan).bold()
                    } else {
                        Style::new().color(Color::DarkGrey)
                    },
                ),
                Span::styled(self.base.label().to_string(), Style::new().bold()),
            ];
            if self.collapsed {
                let preview = self.value().unwrap_or(Value::None).preview(48);
                header.push(Span::styled(
                    format!(" {preview}"),
                    Style::new().color(Color::DarkGrey),
                ));
            }
            lines.push(header);
            2
        } else {
            0
        };

        if !self.collapsed {
            for (index, child) in self.children.iter().enumerate() {
                let child_active = focused && self.active == index + 1;
                let child_ctx = ctx.for_child(child_active.then(|| child.id().to_string()));
                let mut block = child.draw(&child_ctx).lines;
                indent_lines(&mut block, indent);
                lines.extend(block);
            }
        }
        DrawOutput { lines }
    }
}

impl Interactive for RecordEditor {
    fn focus_mode(&self) -> FocusMode {
        FocusMode::Group
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if self.active >= 1 && !self.collapsed {
            let index = self.active - 1;
            if let Some(child) = self.children.get_mut(index) {
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
            KeyCode::Up => {
                if self.move_active(-1) {
                    InteractionResult::handled()
                } else {
                    InteractionResult::ignored()
                }
            }
            KeyCode::Down => {
                if self.move_active(1) {
                    InteractionResult::handled()
                } else {
                    InteractionResult::ignored()
                }
            }
            KeyCode::Right if self.has_header() && self.active == 0 => {
                if self.collapsed {
                    self.collapsed = false;
                    InteractionResult::handled()
                } else {
                    InteractionResult::ignored()
                }
            }
            KeyCode::Left if self.has_header() && self.active == 0 => {
                if self.collapsed {
                    InteractionResult::ignored()
                } else {
                    self.collapsed = true;
                    self.active = 0;
                    InteractionResult::handled()
                }
            }
            _ => InteractionResult::ignored(),
        }
    }

    fn focus_enter(&mut self, from_top: bool) {
        if self.collapsed {
            self.active = 0;
            return;
        }
        if from_top {
            self.active = self.initial_active();
            if !self.has_header()
                && let Some(index) = self.first_focusable_child()
                && let Some(child) = self.children.get_mut(index)
            {
                child.focus_enter(true);
            }
            return;
        }
        match self.last_focusable_child() {
            Some(index) => {
                self.active = index + 1;
                if let Some(child) = self.children.get_mut(index) {
                    child.focus_enter(false);
                }
            }
            None => self.active = 0,
        }
    }

    fn on_tick(&mut self) -> InteractionResult {
        let mut result = InteractionResult::ignored();
        for child in &mut self.children {
            result.merge(child.on_tick());
        }
        result
    }

    fn value(&self) -> Option<Value> {
        Some(Value::record(self.fields.iter().zip(&self.children).map(
            |(field, child)| {
                (
                    field.name.clone(),
                    child.value().unwrap_or(Value::None),
                )
            },
        )))
    }

    fn set_value(&mut self, value: Value) {
        self.rebuild_children(&value);
        self.active = self.initial_active();
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        for (field, child) in self.fields.iter().zip(&self.children) {
            if let Err(err) = child.validate(mode) {
                return Err(format!("{}: {}", field.name, err));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RecordEditor;
    use crate::core::shape::{Field, Shape};
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Interactive;

    fn vote_record() -> RecordEditor {
        RecordEditor::new(
            "payload",
            "",
            vec![
                Field::new("questId", Shape::int()),
                Field::new("comment", Shape::text()),
            ],
        )
    }

    #[test]
    fn value_preserves_field_order() {
        let editor = vote_record().with_value(&Value::record(vec![
            ("questId".to_string(), Value::Int(2)),
            ("comment".to_string(), Value::text("go")),
        ]));
        let value = editor.value().expect("value");
        let record = value.as_record().expect("record");
        assert_eq!(
            record.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["questId", "comment"]
        );
    }

    #[test]
    fn editing_one_field_leaves_the_rest_alone() {
        let mut editor = vote_record().with_value(&Value::record(vec![
            ("questId".to_string(), Value::Int(2)),
            ("comment".to_string(), Value::text("go")),
        ]));
        // headerless root: first field is active; type a digit
        let result = editor.on_key(KeyEvent::plain(KeyCode::Char('7')));
        assert!(result.edited_flag());
        let value = editor.value().expect("value");
        assert_eq!(value.field("questId"), Some(&Value::Int(27)));
        assert_eq!(value.field("comment"), Some(&Value::text("go")));
    }

    #[test]
    fn missing_seed_fields_fall_back_to_blanks() {
        let editor = vote_record()
            .with_value(&Value::record(vec![("questId".to_string(), Value::Int(1))]));
        let value = editor.value().expect("value");
        assert_eq!(value.field("comment"), Some(&Value::Text(String::new())));
    }
}

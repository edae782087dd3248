use crate::core::collapse::default_collapsed;
use crate::core::list_ops;
use crate::core::shape::Shape;
use crate::core::value::Value;
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::{Span, indent_lines};
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::editor::{DefaultFn, editor_for};
use crate::widgets::viewport::Viewport;
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, InteractiveNode,
    RenderContext, ValidationMode,
};

const SCALAR_WINDOW: usize = 6;
const PREVIEW_CHARS: usize = 48;

/// Homogeneous ordered sequence of one inner shape.
///
/// Child editor instances move with their items on reorder, so nested
/// cursor/collapse state follows the item, and ids stay stable (a
/// monotonic sequence number, not the index, suffixes them). Every
/// structural edit leaves the sequence readable as one complete snapshot
/// through `value()`.
pub struct ListEditor {
    base: WidgetBase,
    inner_shape: Shape,
    default_item: DefaultFn,
    children: Vec<Box<dyn InteractiveNode>>,
    /// 0 = header row, `i >= 1` = child `i - 1`.
    active: usize,
    collapsed: bool,
    scroll: Viewport,
    next_seq: u64,
}

impl ListEditor {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        inner_shape: Shape,
        default_item: DefaultFn,
    ) -> Self {
        let scroll = if inner_shape.is_composite() {
            Viewport::unbounded()
        } else {
            Viewport::capped(SCALAR_WINDOW)
        };
        Self {
            base: WidgetBase::new(id, label),
            inner_shape,
            default_item,
            children: Vec::new(),
            active: 0,
            collapsed: false,
            scroll,
            next_seq: 0,
        }
    }

    /// Seeds items and computes the mount-time collapse default. The
    /// heuristic runs here once; later growth or shrinkage never
    /// re-evaluates it.
    pub fn with_value(mut self, value: &Value) -> Self {
        self.rebuild_children(value.as_list().unwrap_or(&[]));
        self.collapsed = default_collapsed(self.children.len(), self.inner_shape.is_composite());
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    fn build_child(&mut self, item: &Value) -> Box<dyn InteractiveNode> {
        let id = format!("{}#{}", self.base.id(), self.next_seq);
        self.next_seq += 1;
        editor_for(&self.inner_shape, item, id.as_str(), "")
    }

    fn rebuild_children(&mut self, items: &[Value]) {
        self.children = Vec::with_capacity(items.len());
        for item in items {
            let child = self.build_child(item);
            self.children.push(child);
        }
        self.clamp_active();
    }

    fn clamp_active(&mut self) {
        if self.collapsed || self.children.is_empty() {
            self.active = self.active.min(if self.collapsed { 0 } else { self.children.len() });
        } else if self.active > self.children.len() {
            self.active = self.children.len();
        }
        if self.active >= 1 {
            self.scroll
                .follow(self.active - 1, self.children.len());
        }
    }

    fn child_focusable(&self, index: usize) -> bool {
        self.children
            .get(index)
            .is_some_and(|child| !matches!(child.focus_mode(), FocusMode::None))
    }

    /// Next focusable row from `self.active` in `dir` (−1 up, +1 down);
    /// row 0 (the header) is always focusable, children only when the list
    /// is expanded.
    fn move_active(&mut self, dir: isize) -> bool {
        let mut row = self.active as isize;
        loop {
            row += dir;
            if row < 0 {
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
                self.scroll
                    .follow(row_usize - 1, self.children.len());
                if let Some(child) = self.children.get_mut(row_usize - 1) {
                    child.focus_enter(dir > 0);
                }
                return true;
            }
        }
    }

    fn append_item(&mut self) -> InteractionResult {
        let item = (self.default_item)();
        let child = self.build_child(&item);
        list_ops::append(&mut self.children, child);
        if !self.collapsed {
            self.active = self.children.len();
            self.scroll
                .follow(self.children.len() - 1, self.children.len());
        }
        InteractionResult::edited()
    }

    fn delete_active(&mut self) -> InteractionResult {
        if self.active == 0 {
            return InteractionResult::ignored();
        }
        let index = self.active - 1;
        if list_ops::remove_at(&mut self.children, index).is_none() {
            return InteractionResult::ignored();
        }
        if self.active > self.children.len() {
            self.active = self.children.len();
        }
        self.clamp_active();
        InteractionResult::edited()
    }

    fn swap_active(&mut self, delta: isize) -> InteractionResult {
        if self.active == 0 {
            return InteractionResult::ignored();
        }
        let index = self.active - 1;
        if !list_ops::swap_adjacent(&mut self.children, index, delta) {
            // boundary: the control is inert, not an error
            return InteractionResult::consumed();
        }
        self.active = (self.active as isize + delta) as usize;
        self.scroll
            .follow(self.active - 1, self.children.len());
        InteractionResult::edited()
    }

    fn header_line(&self, focused: bool) -> Vec<Span> {
        let header_focused = focused && self.active == 0;
        let glyph = if self.collapsed { "▶ " } else { "▼ " };
        let mut line = vec![
            Span::new(self.base.focus_marker(header_focused).to_string()),
            Span::styled(
                glyph,
                if header_focused {
                    Style::new().color(Color::Cyan).bold()
                } else {
                    Style::new().color(Color::DarkGrey)
                },
            ),
        ];
        if !self.base.label().is_empty() {
            line.push(Span::styled(
                format!("{} ", self.base.label()),
                Style::new().bold(),
            ));
        }
        line.push(Span::styled(
            format!("({})", self.children.len()),
            Style::new().color(Color::DarkGrey),
        ));
        if self.collapsed {
            let preview = self.value().unwrap_or(Value::None).preview(PREVIEW_CHARS);
            line.push(Span::styled(
                format!(" {preview}"),
                Style::new().color(Color::DarkGrey),
            ));
        }
        line
    }
}

impl Drawable for ListEditor {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let mut lines = vec![self.header_line(focused)];
        if self.collapsed {
            return DrawOutput { lines };
        }

        if self.inner_shape.is_composite() {
            // composite items lay out as full blocks, one after another
            for (index, child) in self.children.iter().enumerate() {
                let child_active = focused && self.active == index + 1;
                let caption_style = if child_active {
                    Style::new().color(Color::Cyan)
                } else {
                    Style::new().color(Color::DarkGrey)
                };
                lines.push(vec![
                    Span::new("  "),
                    Span::styled(format!("[{index}]"), caption_style),
                ]);
                let child_ctx = ctx.for_child(child_active.then(|| child.id().to_string()));
                let mut block = child.draw(&child_ctx).lines;
                indent_lines(&mut block, 4);
                lines.extend(block);
            }
        } else {
            // scalar items run vertically inside a capped window
            let total = self.children.len();
            for index in self.scroll.range(total) {
                let child = &self.children[index];
                let child_active = focused && self.active == index + 1;
                let child_ctx = ctx.for_child(child_active.then(|| child.id().to_string()));
                let mut line = vec![
                    Span::new("  "),
                    Span::styled(
                        format!("[{index}] "),
                        Style::new().color(Color::DarkGrey),
                    ),
                ];
                line.extend(
                    child
                        .draw(&child_ctx)
                        .lines
                        .into_iter()
                        .next()
                        .unwrap_or_default(),
                );
                lines.push(line);
            }
            if let Some(footer) = self.scroll.footer(total) {
                lines.push(vec![
                    Span::new("  "),
                    Span::styled(footer, Style::new().color(Color::DarkGrey)),
                ]);
            }
        }
        DrawOutput { lines }
    }
}

impl Interactive for ListEditor {
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

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => self.append_item(),
                KeyCode::Char('d') => self.delete_active(),
                KeyCode::Up => self.swap_active(-1),
                KeyCode::Down => self.swap_active(1),
                _ => InteractionResult::ignored(),
            };
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
            KeyCode::Right if self.active == 0 => {
                if self.collapsed {
                    self.collapsed = false;
                    self.clamp_active();
                    InteractionResult::handled()
                } else {
                    InteractionResult::ignored()
                }
            }
            KeyCode::Left if self.active == 0 => {
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
        if from_top || self.collapsed || self.children.is_empty() {
            self.active = 0;
            return;
        }
        // entering from below lands on the last focusable row
        self.active = 0;
        let mut row = self.children.len();
        while row >= 1 {
            if self.child_focusable(row - 1) {
                self.active = row;
                if let Some(child) = self.children.get_mut(row - 1) {
                    child.focus_enter(false);
                }
                break;
            }
            row -= 1;
        }
        self.clamp_active();
    }

    fn on_tick(&mut self) -> InteractionResult {
        let mut result = InteractionResult::ignored();
        for child in &mut self.children {
            result.merge(child.on_tick());
        }
        result
    }

    fn value(&self) -> Option<Value> {
        Some(Value::List(
            self.children
                .iter()
                .map(|child| child.value().unwrap_or(Value::None))
                .collect(),
        ))
    }

    fn set_value(&mut self, value: Value) {
        self.rebuild_children(value.as_list().unwrap_or(&[]));
    }

    fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        for (index, child) in self.children.iter().enumerate() {
            if let Err(err) = child.validate(mode) {
                return Err(format!("item {}: {}", index + 1, err));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ListEditor;
    use crate::core::shape::Shape;
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Interactive;

    fn scalar_list(items: &[i64]) -> ListEditor {
        let value = Value::List(items.iter().copied().map(Value::Int).collect());
        ListEditor::new("ids", "Ids", Shape::int(), Arc::new(|| Value::Int(0)))
            .with_value(&value)
    }

    fn items_of(editor: &ListEditor) -> Vec<Value> {
        let Some(Value::List(items)) = editor.value() else {
            panic!("expected list value");
        };
        items
    }

    #[test]
    fn mount_heuristic_follows_thresholds() {
        assert!(scalar_list(&[1, 2, 3, 4, 5]).collapsed);
        assert!(!scalar_list(&[1, 2, 3, 4]).collapsed);

        let one_record = Value::List(vec![Value::record(vec![(
            "id".to_string(),
            Value::Int(1),
        )])]);
        let editor = ListEditor::new(
            "quests",
            "Quests",
            Shape::record(vec![crate::core::shape::Field::new("id", Shape::int())]),
            Arc::new(|| Value::None),
        )
        .with_value(&one_record);
        assert!(!editor.collapsed);
    }

    #[test]
    fn append_then_delete_last_restores_sequence() {
        let mut editor = scalar_list(&[1, 2, 3]);
        let original = items_of(&editor);
        editor.on_key(KeyEvent::ctrl(KeyCode::Char('a')));
        assert_eq!(items_of(&editor).len(), 4);
        editor.on_key(KeyEvent::ctrl(KeyCode::Char('d')));
        assert_eq!(items_of(&editor), original);
    }

    #[test]
    fn swap_twice_restores_order_and_boundary_is_inert() {
        let mut editor = scalar_list(&[1, 2, 3]);
        let original = items_of(&editor);

        // focus the first item row
        editor.on_key(KeyEvent::plain(KeyCode::Down));
        let down = editor.on_key(KeyEvent::ctrl(KeyCode::Down));
        assert!(down.edited_flag());
        assert_eq!(
            items_of(&editor),
            vec![Value::Int(2), Value::Int(1), Value::Int(3)]
        );
        let up = editor.on_key(KeyEvent::ctrl(KeyCode::Up));
        assert!(up.edited_flag());
        assert_eq!(items_of(&editor), original);

        // top boundary going up: inert, no reorder
        let inert = editor.on_key(KeyEvent::ctrl(KeyCode::Up));
        assert!(inert.handled);
        assert!(!inert.edited_flag());
        assert_eq!(items_of(&editor), original);
    }

    #[test]
    fn per_item_edit_leaves_other_indices_untouched() {
        let mut editor = scalar_list(&[1, 2]);
        editor.on_key(KeyEvent::plain(KeyCode::Down));
        editor.on_key(KeyEvent::plain(KeyCode::Down));
        // active is now item [1]; type a digit into it
        editor.on_key(KeyEvent::plain(KeyCode::Char('7')));
        let items = items_of(&editor);
        assert_eq!(items[0], Value::Int(1));
        assert_eq!(items[1], Value::Int(27));
    }

    #[test]
    fn reorder_moves_child_state_with_the_item() {
        let mut editor = scalar_list(&[5, 6]);
        editor.on_key(KeyEvent::plain(KeyCode::Down));
        // edit item [0] to 50, then move it down
        editor.on_key(KeyEvent::plain(KeyCode::Char('0')));
        editor.on_key(KeyEvent::ctrl(KeyCode::Down));
        let items = items_of(&editor);
        assert_eq!(items, vec![Value::Int(6), Value::Int(50)]);
        // the moved row stays active; further typing follows it
        editor.on_key(KeyEvent::plain(KeyCode::Char('1')));
        assert_eq!(items_of(&editor)[1], Value::Int(501));
    }
}

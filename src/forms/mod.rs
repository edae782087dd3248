pub mod panel;

use std::sync::mpsc::{Receiver, TryRecvError};

use crate::core::value::Value;
use crate::runtime::event::WidgetAction;
use crate::session::{Operation, Outcome, SessionContext};
use crate::terminal::KeyEvent;
use crate::ui::span::{Span, indent_lines};
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::editor::editor_for;
use crate::widgets::traits::{
    DrawOutput, InteractionResult, InteractiveNode, RenderContext, ValidationMode,
};

pub use panel::Panel;

/// One staged request. The payload starts from the operation's factory, is
/// replaced wholesale on every edit, and is rebuilt from the factory after
/// every submit completion — success or error. A submit while one is in
/// flight is refused (single-flight guard).
pub struct Form {
    base: WidgetBase,
    operation: Operation,
    staged: Value,
    editor: Box<dyn InteractiveNode>,
    pending: Option<Receiver<Outcome>>,
}

impl Form {
    pub fn new(operation: Operation) -> Self {
        let base = WidgetBase::new(
            format!("form__{}", operation.name()),
            operation.name().to_string(),
        );
        let staged = operation.default_payload();
        let editor = build_editor(&operation, &staged, base.id());
        Self {
            base,
            operation,
            staged,
            editor,
            pending: None,
        }
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }

    pub fn name(&self) -> &str {
        self.operation.name()
    }

    pub fn staged(&self) -> &Value {
        &self.staged
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn focus_enter(&mut self) {
        self.editor.focus_enter(true);
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &SessionContext) -> InteractionResult {
        let inner = self.editor.on_key(key);
        self.absorb(inner, ctx)
    }

    fn absorb(&mut self, inner: InteractionResult, ctx: &SessionContext) -> InteractionResult {
        let mut out = InteractionResult {
            handled: inner.handled,
            request_render: inner.request_render,
            actions: Vec::new(),
        };
        let mut submit_requested = false;
        for action in inner.actions {
            match action {
                WidgetAction::Edited => {
                    // one complete snapshot per edit, never a partial patch
                    self.staged = self.editor.value().unwrap_or(Value::None);
                }
                WidgetAction::InputDone => submit_requested = true,
                other => out.actions.push(other),
            }
        }
        if submit_requested {
            out.merge(self.submit(ctx));
        }
        out
    }

    fn submit(&mut self, ctx: &SessionContext) -> InteractionResult {
        if self.pending.is_some() {
            return InteractionResult::notify(format!(
                "{}: submission already in flight",
                self.operation.name()
            ));
        }
        if let Err(err) = self.editor.validate(ValidationMode::Submit) {
            return InteractionResult::notify(format!("{}: {}", self.operation.name(), err));
        }
        if let Err(err) = self.operation.validate(&self.staged) {
            return InteractionResult::notify(format!("{}: {}", self.operation.name(), err));
        }
        self.pending = Some(
            ctx.connection
                .submit(self.operation.name(), self.staged.clone()),
        );
        InteractionResult::handled()
    }

    /// Polls the in-flight submission. Any completion — success, error, or
    /// a dropped connection — resets the staged payload to a fresh factory
    /// default; error messages surface as notices.
    pub fn tick(&mut self) -> InteractionResult {
        let mut result = self.editor.on_tick();

        let outcome = match &self.pending {
            Some(receiver) => match receiver.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(TryRecvError::Disconnected) => {
                    Some(Outcome::Error("connection closed".to_string()))
                }
                Err(TryRecvError::Empty) => None,
            },
            None => None,
        };

        if let Some(outcome) = outcome {
            self.pending = None;
            if let Outcome::Error(message) = outcome {
                result.merge(InteractionResult::notify(message));
            }
            self.reset();
            result.merge(InteractionResult::handled());
        }
        result
    }

    fn reset(&mut self) {
        self.staged = self.operation.default_payload();
        self.editor = build_editor(&self.operation, &self.staged, self.base.id());
    }

    pub fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let mut title = vec![
            Span::new(self.base.focus_marker(focused).to_string()),
            Span::styled(
                self.operation.name().to_string(),
                if focused {
                    Style::new().color(Color::Cyan).bold()
                } else {
                    Style::new().bold()
                },
            ),
        ];
        if self.pending.is_some() {
            title.push(Span::styled(
                " … submitting",
                Style::new().color(Color::Yellow),
            ));
        }
        let mut lines = vec![title];

        let editor_ctx = ctx.for_child(focused.then(|| self.editor.id().to_string()));
        let mut body = self.editor.draw(&editor_ctx).lines;
        indent_lines(&mut body, 2);
        lines.extend(body);
        DrawOutput { lines }
    }
}

fn build_editor(operation: &Operation, staged: &Value, form_id: &str) -> Box<dyn InteractiveNode> {
    editor_for(
        operation.payload_shape(),
        staged,
        format!("{form_id}__payload").as_str(),
        "",
    )
}

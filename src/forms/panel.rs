use crate::forms::Form;
use crate::runtime::event::WidgetAction;
use crate::runtime::notices::NoticeQueue;
use crate::session::SessionContext;
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::inspector::Inspector;
use crate::widgets::traits::{Drawable, InteractionResult, Interactive, RenderContext};

const NOTICE_TTL_TICKS: u32 = 40;
const NOTICE_MAX: usize = 3;

/// Dismissible overlay stacking one form per operation above the state
/// inspector. Tab cycles focus, Esc dismisses, notices collect at the
/// foot. Presentation glue only — all behavior lives in the forms and the
/// inspector.
pub struct Panel {
    forms: Vec<Form>,
    inspector: Inspector,
    notices: NoticeQueue,
    /// `0..forms.len()` → that form; `forms.len()` → the inspector.
    focus: usize,
    visible: bool,
}

impl Panel {
    pub fn new(forms: Vec<Form>, inspector: Inspector) -> Self {
        let mut panel = Self {
            forms,
            inspector,
            notices: NoticeQueue::new(NOTICE_TTL_TICKS, NOTICE_MAX),
            focus: 0,
            visible: true,
        };
        if let Some(form) = panel.forms.get_mut(0) {
            form.focus_enter();
        }
        panel
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn set_snapshot(&mut self, ctx: &SessionContext) {
        self.inspector.set_snapshot(ctx);
    }

    fn focus_slots(&self) -> usize {
        self.forms.len() + 1
    }

    fn cycle_focus(&mut self, delta: isize) {
        let slots = self.focus_slots() as isize;
        self.focus = ((self.focus as isize + delta + slots) % slots) as usize;
        if let Some(form) = self.forms.get_mut(self.focus) {
            form.focus_enter();
        }
    }

    /// Returns true when a re-render is needed.
    pub fn handle_key(&mut self, key: KeyEvent, ctx: &SessionContext) -> bool {
        if !self.visible {
            return false;
        }
        match key.code {
            KeyCode::Esc => {
                self.dismiss();
                return true;
            }
            KeyCode::Tab => {
                self.cycle_focus(1);
                return true;
            }
            KeyCode::BackTab => {
                self.cycle_focus(-1);
                return true;
            }
            // drop the oldest notice
            KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.notices.dismiss();
            }
            _ => {}
        }

        let result = if self.focus < self.forms.len() {
            self.forms[self.focus].handle_key(key, ctx)
        } else {
            self.inspector.on_key(key)
        };
        self.collect(result)
    }

    /// Drives channel polling (submissions, lookups, plugin errors) and
    /// notice expiry.
    pub fn tick(&mut self) -> bool {
        let mut render = false;
        let mut results = Vec::new();
        for form in &mut self.forms {
            results.push(form.tick());
        }
        results.push(self.inspector.on_tick());
        for result in results {
            render |= self.collect(result);
        }
        render |= self.notices.tick();
        render
    }

    fn collect(&mut self, result: InteractionResult) -> bool {
        let mut render = result.request_render;
        for action in result.actions {
            if let WidgetAction::Notify { message } = action {
                self.notices.push(message);
                render = true;
            }
        }
        render
    }

    pub fn draw(&self, width: u16) -> Vec<SpanLine> {
        if !self.visible {
            return Vec::new();
        }
        let mut lines: Vec<SpanLine> = Vec::new();
        lines.push(vec![
            Span::styled("┌ request console ", Style::new().color(Color::Blue).bold()),
            Span::styled(
                "(Tab cycle · Esc dismiss · ^A append · ^D delete · ^↑/^↓ move · ^X clear notice)",
                Style::new().color(Color::DarkGrey),
            ),
        ]);

        for (index, form) in self.forms.iter().enumerate() {
            let ctx = RenderContext::new(
                (self.focus == index).then(|| form.id().to_string()),
                width,
            );
            lines.extend(form.draw(&ctx).lines);
            lines.push(vec![Span::styled(
                "·".repeat((width as usize).min(40)),
                Style::new().color(Color::DarkGrey),
            )]);
        }

        let inspector_ctx = RenderContext::new(
            (self.focus == self.forms.len()).then(|| self.inspector.id().to_string()),
            width,
        );
        lines.extend(self.inspector.draw(&inspector_ctx).lines);

        for notice in self.notices.iter() {
            lines.push(vec![
                Span::styled("• ", Style::new().color(Color::Red).bold()),
                Span::new(notice.message.clone()),
            ]);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::mpsc::{Receiver, channel};

    use super::Panel;
    use crate::core::shape::{Field, Shape};
    use crate::core::value::Value;
    use crate::forms::Form;
    use crate::session::{
        Connection, Operation, Outcome, PluginRegistry, SessionContext, UserLookup, UserProfile,
    };
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::inspector::Inspector;

    struct FailingConnection;

    impl Connection for FailingConnection {
        fn submit(&self, _operation: &str, _payload: Value) -> Receiver<Outcome> {
            let (sender, receiver) = channel();
            let _ = sender.send(Outcome::Error("already voted".to_string()));
            receiver
        }
    }

    struct NullLookup;

    impl UserLookup for NullLookup {
        fn lookup(&self, _id: &str) -> Receiver<Option<UserProfile>> {
            let (_sender, receiver) = channel();
            receiver
        }
    }

    fn panel_and_ctx() -> (Panel, SessionContext) {
        let operation = Operation::blank(
            "voteInQuest",
            Shape::record(vec![Field::new("questId", Shape::int())]),
        );
        let inspector = Inspector::new(
            "inspector",
            "state",
            Shape::record(vec![]),
            PluginRegistry::new(),
        );
        let mut ctx = SessionContext::new(
            Arc::new(FailingConnection),
            Arc::new(NullLookup),
            UserProfile::new("me", "human"),
        );
        ctx.apply_snapshot(Value::record(vec![]), 1);
        let mut panel = Panel::new(vec![Form::new(operation)], inspector);
        panel.set_snapshot(&ctx);
        (panel, ctx)
    }

    #[test]
    fn esc_dismisses_the_overlay() {
        let (mut panel, ctx) = panel_and_ctx();
        assert!(panel.is_visible());
        panel.handle_key(KeyEvent::plain(KeyCode::Esc), &ctx);
        assert!(!panel.is_visible());
        assert!(panel.draw(80).is_empty());
    }

    #[test]
    fn submit_error_lands_in_the_notice_queue() {
        let (mut panel, ctx) = panel_and_ctx();
        panel.handle_key(KeyEvent::plain(KeyCode::Enter), &ctx);
        assert!(panel.tick());
        let messages: Vec<_> = panel
            .notices()
            .iter()
            .map(|notice| notice.message.as_str())
            .collect();
        assert_eq!(messages, vec!["already voted"]);
    }

    #[test]
    fn tab_cycles_between_forms_and_inspector() {
        let (mut panel, ctx) = panel_and_ctx();
        assert_eq!(panel.focus, 0);
        panel.handle_key(KeyEvent::plain(KeyCode::Tab), &ctx);
        assert_eq!(panel.focus, 1);
        panel.handle_key(KeyEvent::plain(KeyCode::Tab), &ctx);
        assert_eq!(panel.focus, 0);
    }
}

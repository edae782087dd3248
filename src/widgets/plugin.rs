use std::sync::mpsc::Receiver;

use crate::session::{PluginElement, PluginFrame, PluginRegistry};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};

/// The engine's only cross-boundary extension point. The bridge owns the
/// registered element for the duration of its mount, forwards the latest
/// session frame before every draw, and relays the element's error events
/// to the notice surface. It never looks past this interface.
pub struct PluginBridge {
    element_id: String,
    element: Option<Box<dyn PluginElement>>,
    errors: Option<Receiver<String>>,
}

impl PluginBridge {
    pub fn mount(element_id: impl Into<String>, registry: &mut PluginRegistry) -> Self {
        let element_id = element_id.into();
        let mut element = registry.take(element_id.as_str());
        let errors = element.as_mut().map(|element| element.subscribe_errors());
        Self {
            element_id,
            element,
            errors,
        }
    }

    /// Returns the element to the registry; dropping the receiver ends the
    /// error subscription.
    pub fn unmount(self, registry: &mut PluginRegistry) {
        if let Some(element) = self.element {
            registry.register(self.element_id, element);
        }
    }

    pub fn element_id(&self) -> &str {
        self.element_id.as_str()
    }

    pub fn is_registered(&self) -> bool {
        self.element.is_some()
    }

    /// Pushes the latest snapshot into the element. Called on every
    /// re-render cause (inbound snapshot, tick) so the element always
    /// observes current state without being reconstructed.
    pub fn forward(&mut self, frame: PluginFrame) {
        if let Some(element) = self.element.as_mut() {
            element.update(frame);
        }
    }

    /// Error events raised by the element since the last drain.
    pub fn drain_errors(&mut self) -> Vec<String> {
        let Some(receiver) = self.errors.as_ref() else {
            return Vec::new();
        };
        let mut drained = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            drained.push(message);
        }
        drained
    }

    pub fn draw_lines(&self) -> Vec<SpanLine> {
        match &self.element {
            Some(element) => element.draw(),
            None => vec![vec![Span::styled(
                format!("<no element registered for {}>", self.element_id),
                Style::new().color(Color::DarkGrey),
            )]],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{Receiver, Sender, channel};

    use super::PluginBridge;
    use crate::core::value::Value;
    use crate::session::{
        Connection, Outcome, PluginElement, PluginFrame, PluginRegistry, SessionContext,
        UserLookup, UserProfile,
    };
    use crate::ui::span::{Span, SpanLine};
    use std::sync::Arc;

    struct NullConnection;

    impl Connection for NullConnection {
        fn submit(&self, _operation: &str, _payload: Value) -> Receiver<Outcome> {
            let (sender, receiver) = channel();
            let _ = sender.send(Outcome::Success);
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

    struct EchoElement {
        last_seen: Option<u64>,
        error_sender: Option<Sender<String>>,
    }

    impl EchoElement {
        fn new() -> Self {
            Self {
                last_seen: None,
                error_sender: None,
            }
        }
    }

    impl PluginElement for EchoElement {
        fn update(&mut self, frame: PluginFrame) {
            self.last_seen = Some(frame.updated_at);
            if frame.value.is_absent()
                && let Some(sender) = &self.error_sender
            {
                let _ = sender.send("board value missing".to_string());
            }
        }

        fn draw(&self) -> Vec<SpanLine> {
            vec![vec![Span::new(format!(
                "seen@{}",
                self.last_seen.unwrap_or(0)
            ))]]
        }

        fn subscribe_errors(&mut self) -> Receiver<String> {
            let (sender, receiver) = channel();
            self.error_sender = Some(sender);
            receiver
        }
    }

    fn context() -> SessionContext {
        let mut ctx = SessionContext::new(
            Arc::new(NullConnection),
            Arc::new(NullLookup),
            UserProfile::new("me", "human"),
        );
        ctx.apply_snapshot(Value::record(vec![]), 7);
        ctx
    }

    #[test]
    fn forwards_frames_and_relays_errors() {
        let mut registry = PluginRegistry::new();
        registry.register("board-view", Box::new(EchoElement::new()));
        let mut bridge = PluginBridge::mount("board-view", &mut registry);
        assert!(bridge.is_registered());

        let ctx = context();
        bridge.forward(ctx.plugin_frame(&Value::Int(1)));
        assert_eq!(bridge.draw_lines()[0][0].text, "seen@7");
        assert!(bridge.drain_errors().is_empty());

        bridge.forward(ctx.plugin_frame(&Value::None));
        assert_eq!(bridge.drain_errors(), vec!["board value missing"]);
    }

    #[test]
    fn unmount_returns_element_to_registry() {
        let mut registry = PluginRegistry::new();
        registry.register("board-view", Box::new(EchoElement::new()));
        let bridge = PluginBridge::mount("board-view", &mut registry);
        assert!(!registry.contains("board-view"));
        bridge.unmount(&mut registry);
        assert!(registry.contains("board-view"));
    }

    #[test]
    fn missing_element_degrades_to_placeholder() {
        let mut registry = PluginRegistry::new();
        let mut bridge = PluginBridge::mount("absent", &mut registry);
        assert!(!bridge.is_registered());
        bridge.forward(context().plugin_frame(&Value::Int(1)));
        assert!(bridge.draw_lines()[0][0].text.contains("absent"));
        assert!(bridge.drain_errors().is_empty());
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crate::core::shape::Shape;
use crate::core::value::Value;
use crate::ui::span::SpanLine;
use crate::widgets::validators::{Validator, run_validators};

/// Result of one request submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success,
    Error(String),
}

/// The network collaborator. Submission is fire-and-forget: the caller
/// polls the returned receiver from its tick; there is no cancellation,
/// timeout or retry.
pub trait Connection: Send + Sync {
    fn submit(&self, operation: &str, payload: Value) -> Receiver<Outcome>;
}

/// Resolved description of an opaque user identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub kind: String,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

/// Remote identity lookup. `None` means unresolved, not necessarily an
/// error; a dropped sender reads the same way to the caller.
pub trait UserLookup: Send + Sync {
    fn lookup(&self, id: &str) -> Receiver<Option<UserProfile>>;
}

/// Snapshot handed into a plugin element on every re-render.
#[derive(Clone)]
pub struct PluginFrame {
    pub value: Value,
    pub connection: Arc<dyn Connection>,
    pub user: UserProfile,
    pub state: Value,
    pub updated_at: u64,
}

/// An externally registered rendering element. The engine forwards the
/// latest frame before each draw and listens on the error channel for the
/// duration of the bridge's mount; it never inspects the element beyond
/// this surface.
pub trait PluginElement: Send {
    fn update(&mut self, frame: PluginFrame);
    fn draw(&self) -> Vec<SpanLine>;
    fn subscribe_errors(&mut self) -> Receiver<String>;
}

#[derive(Default)]
pub struct PluginRegistry {
    elements: HashMap<String, Box<dyn PluginElement>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, element_id: impl Into<String>, element: Box<dyn PluginElement>) {
        self.elements.insert(element_id.into(), element);
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.elements.contains_key(element_id)
    }

    pub fn get_mut(&mut self, element_id: &str) -> Option<&mut Box<dyn PluginElement>> {
        self.elements.get_mut(element_id)
    }

    /// Hands the element to a mounting bridge; `register` puts it back on
    /// unmount.
    pub fn take(&mut self, element_id: &str) -> Option<Box<dyn PluginElement>> {
        self.elements.remove(element_id)
    }
}

/// Ambient session state passed explicitly down the render tree.
/// Constructed once per top-level mount; `apply_snapshot` replaces the
/// state wholesale whenever the backend pushes a new one, so the display
/// pipeline always reflects the latest snapshot.
#[derive(Clone)]
pub struct SessionContext {
    pub connection: Arc<dyn Connection>,
    pub lookup: Arc<dyn UserLookup>,
    pub user: UserProfile,
    pub state: Value,
    pub updated_at: u64,
}

impl SessionContext {
    pub fn new(
        connection: Arc<dyn Connection>,
        lookup: Arc<dyn UserLookup>,
        user: UserProfile,
    ) -> Self {
        Self {
            connection,
            lookup,
            user,
            state: Value::None,
            updated_at: 0,
        }
    }

    pub fn apply_snapshot(&mut self, state: Value, updated_at: u64) {
        self.state = state;
        self.updated_at = updated_at;
    }

    pub fn plugin_frame(&self, value: &Value) -> PluginFrame {
        PluginFrame {
            value: value.clone(),
            connection: Arc::clone(&self.connection),
            user: self.user.clone(),
            state: self.state.clone(),
            updated_at: self.updated_at,
        }
    }
}

pub type PayloadFactory = Box<dyn Fn() -> Value + Send + Sync>;

/// One outgoing request kind: payload shape, the default-value factory the
/// editors reset to after every submit attempt, and submit-time validators
/// over the staged payload.
pub struct Operation {
    name: String,
    payload: Shape,
    factory: PayloadFactory,
    validators: Vec<Validator>,
}

impl Operation {
    pub fn new(name: impl Into<String>, payload: Shape, factory: PayloadFactory) -> Self {
        Self {
            name: name.into(),
            payload,
            factory,
            validators: Vec::new(),
        }
    }

    /// Default factory producing the shape's structural blank.
    pub fn blank(name: impl Into<String>, payload: Shape) -> Self {
        let blank_shape = payload.clone();
        Self::new(name, payload, Box::new(move || blank_shape.blank()))
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn payload_shape(&self) -> &Shape {
        &self.payload
    }

    pub fn default_payload(&self) -> Value {
        (self.factory)()
    }

    pub fn validate(&self, payload: &Value) -> Result<(), String> {
        run_validators(&self.validators, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::Operation;
    use crate::core::shape::{Field, Shape};
    use crate::core::value::Value;

    #[test]
    fn blank_operation_defaults_to_structural_zero() {
        let op = Operation::blank(
            "join",
            Shape::record(vec![Field::new("name", Shape::text())]),
        );
        let payload = op.default_payload();
        assert_eq!(payload.field("name"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn factory_runs_fresh_per_call() {
        let op = Operation::new(
            "voteInQuest",
            Shape::record(vec![Field::new("questId", Shape::int())]),
            Box::new(|| Value::record(vec![("questId".to_string(), Value::Int(2))])),
        );
        assert_eq!(op.default_payload(), op.default_payload());
        assert_eq!(
            op.default_payload().field("questId"),
            Some(&Value::Int(2))
        );
    }
}

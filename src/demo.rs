//! Sample quest-game schema and loopback collaborators used by the binary
//! and the end-to-end tests. This is the "concrete application" side of the
//! engine: shapes, symbol tables, operations with default payloads, a
//! connection, a user directory and a board plugin.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::core::shape::{Field, Shape};
use crate::core::symbols::SymbolTable;
use crate::core::value::Value;
use crate::session::{
    Connection, Operation, Outcome, PluginElement, PluginFrame, PluginRegistry, UserLookup,
    UserProfile,
};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::validators::{Validator, int_range, required_text};

pub const BOARD_ELEMENT: &str = "board-view";

/// Vote table as the backend serializes it: numeric constants plus the
/// reverse string aliases the engine must filter out.
pub fn vote_table() -> SymbolTable {
    SymbolTable::from_entries(vec![
        ("Approve".to_string(), Value::Int(0)),
        ("0".to_string(), Value::text("Approve")),
        ("Reject".to_string(), Value::Int(1)),
        ("1".to_string(), Value::text("Reject")),
    ])
}

pub fn phase_table() -> SymbolTable {
    SymbolTable::from_labels(["Lobby", "Proposal", "Voting", "Quest", "Finished"])
}

fn outcome_table() -> SymbolTable {
    SymbolTable::from_labels(["Success", "Fail"])
}

fn player_shape() -> Shape {
    Shape::record(vec![
        Field::new("id", Shape::Reference),
        Field::new("name", Shape::text()),
        Field::new("ready", Shape::boolean()),
    ])
}

fn quest_shape() -> Shape {
    Shape::record(vec![
        Field::new("questId", Shape::int()),
        Field::new("leader", Shape::Reference),
        Field::new("votes", Shape::list(Shape::enumeration(vote_table()))),
        Field::new("outcome", Shape::optional(Shape::enumeration(outcome_table()))),
    ])
}

/// The live state object the inspector renders.
pub fn state_shape() -> Shape {
    Shape::record(vec![
        Field::new("phase", Shape::enumeration(phase_table())),
        Field::new("players", Shape::list(player_shape())),
        Field::new("quests", Shape::list(quest_shape())),
        Field::new("board", Shape::plugin(BOARD_ELEMENT)),
    ])
}

pub fn sample_state() -> Value {
    let player = |id: &str, name: &str, ready: bool| {
        Value::record(vec![
            ("id".to_string(), Value::text(id)),
            ("name".to_string(), Value::text(name)),
            ("ready".to_string(), Value::Bool(ready)),
        ])
    };
    let quest = |quest_id: i64, leader: &str, votes: Vec<i64>, outcome: Option<i64>| {
        Value::record(vec![
            ("questId".to_string(), Value::Int(quest_id)),
            ("leader".to_string(), Value::text(leader)),
            (
                "votes".to_string(),
                Value::List(votes.into_iter().map(Value::Int).collect()),
            ),
            (
                "outcome".to_string(),
                outcome.map(Value::Int).unwrap_or(Value::None),
            ),
        ])
    };
    Value::record(vec![
        ("phase".to_string(), Value::Int(2)),
        (
            "players".to_string(),
            Value::List(vec![
                player("u1", "Kasia", true),
                player("u2", "Jas", true),
                player("u3", "Ola", false),
                player("u4", "Piotr", true),
                player("u5", "Magda", false),
            ]),
        ),
        (
            "quests".to_string(),
            Value::List(vec![
                quest(0, "u2", vec![0, 0, 1, 0, 0], Some(0)),
                quest(1, "u4", vec![0, 1, 1], None),
            ]),
        ),
        ("board".to_string(), Value::None),
    ])
}

fn field_validator(
    field: &'static str,
    inner: Validator,
) -> Validator {
    Box::new(move |payload: &Value| {
        let value = payload.field(field).cloned().unwrap_or(Value::None);
        inner(&value)
    })
}

/// One form per request kind, each with its payload shape and default
/// factory.
pub fn operations() -> Vec<Operation> {
    vec![
        Operation::blank(
            "join",
            Shape::record(vec![Field::new("name", Shape::text())]),
        )
        .with_validator(field_validator("name", required_text("name is required"))),
        Operation::blank("start", Shape::record(vec![])),
        Operation::blank(
            "propose",
            Shape::record(vec![
                Field::new("questId", Shape::int()),
                Field::new("members", Shape::list(Shape::text())),
            ]),
        )
        .with_validator(field_validator(
            "questId",
            int_range(0, 4, "quest id must be 0-4"),
        )),
        Operation::blank(
            "voteOnProposal",
            Shape::record(vec![
                Field::new("proposalId", Shape::int()),
                Field::new("vote", Shape::enumeration(vote_table())),
            ]),
        ),
        Operation::blank(
            "voteInQuest",
            Shape::record(vec![
                Field::new("questId", Shape::int()),
                Field::new("vote", Shape::enumeration(vote_table())),
            ]),
        )
        .with_validator(field_validator(
            "questId",
            int_range(0, 4, "quest id must be 0-4"),
        )),
        Operation::blank(
            "create",
            Shape::record(vec![
                Field::new("name", Shape::text()),
                Field::new("maxPlayers", Shape::optional(Shape::int())),
            ]),
        ),
    ]
}

/// In-process backend stand-in: every submission succeeds except a repeat
/// quest vote, which reports the error the real backend would.
pub struct LoopbackConnection {
    voted_quests: Mutex<HashSet<i64>>,
}

impl LoopbackConnection {
    pub fn new() -> Self {
        Self {
            voted_quests: Mutex::new(HashSet::new()),
        }
    }
}

impl Default for LoopbackConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for LoopbackConnection {
    fn submit(&self, operation: &str, payload: Value) -> Receiver<Outcome> {
        let (sender, receiver) = channel();
        let outcome = if operation == "voteInQuest" {
            let quest_id = payload
                .field("questId")
                .and_then(Value::as_int)
                .unwrap_or(-1);
            let mut voted = match self.voted_quests.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if voted.insert(quest_id) {
                Outcome::Success
            } else {
                Outcome::Error("already voted".to_string())
            }
        } else {
            Outcome::Success
        };
        let _ = sender.send(outcome);
        receiver
    }
}

/// Fixed user directory; unknown ids resolve to `None`.
pub struct DirectoryLookup {
    users: HashMap<String, UserProfile>,
}

impl DirectoryLookup {
    pub fn new() -> Self {
        let mut users = HashMap::new();
        for (id, kind) in [
            ("u1", "human"),
            ("u2", "human"),
            ("u3", "bot"),
            ("u4", "human"),
            ("u5", "bot"),
        ] {
            users.insert(id.to_string(), UserProfile::new(id, kind));
        }
        Self { users }
    }
}

impl Default for DirectoryLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl UserLookup for DirectoryLookup {
    fn lookup(&self, id: &str) -> Receiver<Option<UserProfile>> {
        let (sender, receiver) = channel();
        let _ = sender.send(self.users.get(id).cloned());
        receiver
    }
}

/// The externally supplied board renderer. Observes every forwarded frame
/// and reports through the error channel when handed an absent board value.
pub struct QuestBoard {
    last_updated: u64,
    quest_count: usize,
    errors: Option<Sender<String>>,
}

impl QuestBoard {
    pub fn new() -> Self {
        Self {
            last_updated: 0,
            quest_count: 0,
            errors: None,
        }
    }
}

impl Default for QuestBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginElement for QuestBoard {
    fn update(&mut self, frame: PluginFrame) {
        self.last_updated = frame.updated_at;
        self.quest_count = frame
            .state
            .field("quests")
            .and_then(Value::as_list)
            .map(<[Value]>::len)
            .unwrap_or(0);
        if frame.value.is_absent() && self.quest_count == 0
            && let Some(sender) = &self.errors
        {
            let _ = sender.send("board has nothing to draw".to_string());
        }
    }

    fn draw(&self) -> Vec<SpanLine> {
        vec![vec![
            Span::styled("◼ ", Style::new().color(Color::Magenta)),
            Span::new(format!(
                "quest board · {} quests · snapshot @{}",
                self.quest_count, self.last_updated
            )),
        ]]
    }

    fn subscribe_errors(&mut self) -> Receiver<String> {
        let (sender, receiver) = channel();
        self.errors = Some(sender);
        receiver
    }
}

pub fn plugin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(BOARD_ELEMENT, Box::new(QuestBoard::new()));
    registry
}

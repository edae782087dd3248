mod rows;

use std::collections::{HashMap, HashSet};

use crate::core::collapse::{Disclosure, default_collapsed};
use crate::core::shape::Shape;
use crate::core::value::Value;
use crate::core::value_path::ValuePath;
use crate::runtime::event::WidgetAction;
use crate::session::{PluginRegistry, SessionContext};
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::base::WidgetBase;
use crate::widgets::plugin::PluginBridge;
use crate::widgets::reference::ReferenceSlot;
use crate::widgets::viewport::Viewport;
use crate::widgets::traits::{
    DrawOutput, Drawable, FocusMode, InteractionResult, Interactive, RenderContext,
};

pub use rows::{Row, RowKind};

const PREVIEW_CHARS: usize = 40;

/// Read-only display pipeline: flattens the latest session snapshot against
/// its shape into navigable rows. Collapse state is positional and sticky,
/// reference and plugin nodes keep per-path slots for their lifetime, and a
/// degraded subtree (unresolved reference, out-of-range enum, missing
/// plugin element) never stops its siblings from rendering.
pub struct Inspector {
    base: WidgetBase,
    shape: Shape,
    ctx: Option<SessionContext>,
    disclosure: Disclosure,
    refs: HashMap<ValuePath, ReferenceSlot>,
    plugins: HashMap<ValuePath, PluginBridge>,
    registry: PluginRegistry,
    rows: Vec<Row>,
    active: usize,
    scroll: Viewport,
}

struct WalkEnv<'a> {
    ctx: &'a SessionContext,
    disclosure: &'a mut Disclosure,
    refs: &'a mut HashMap<ValuePath, ReferenceSlot>,
    plugins: &'a mut HashMap<ValuePath, PluginBridge>,
    registry: &'a mut PluginRegistry,
    rows: &'a mut Vec<Row>,
    live: &'a mut HashSet<ValuePath>,
}

impl Inspector {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        shape: Shape,
        registry: PluginRegistry,
    ) -> Self {
        Self {
            base: WidgetBase::new(id, label),
            shape,
            ctx: None,
            disclosure: Disclosure::new(),
            refs: HashMap::new(),
            plugins: HashMap::new(),
            registry,
            rows: Vec::new(),
            active: 0,
            scroll: Viewport::unbounded(),
        }
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.scroll.set_limit(Some(max_visible));
        self
    }

    /// Inbound value feed: adopt the latest snapshot wholesale.
    pub fn set_snapshot(&mut self, ctx: &SessionContext) {
        self.ctx = Some(ctx.clone());
        self.resync();
    }

    pub fn rows(&self) -> &[Row] {
        self.rows.as_slice()
    }

    fn resync(&mut self) {
        let Self {
            shape,
            ctx,
            disclosure,
            refs,
            plugins,
            registry,
            rows,
            ..
        } = self;
        rows.clear();
        let Some(ctx) = ctx.as_ref() else {
            return;
        };

        let mut live = HashSet::new();
        {
            let mut env = WalkEnv {
                ctx,
                disclosure: &mut *disclosure,
                refs: &mut *refs,
                plugins: &mut *plugins,
                registry: &mut *registry,
                rows: &mut *rows,
                live: &mut live,
            };
            walk(
                &mut env,
                &ctx.state,
                shape,
                ValuePath::root(),
                0,
                "state",
            );
        }

        // nodes that left the tree lose their state; a reappearing path
        // mounts fresh
        disclosure.retain(|path| live.contains(path));
        refs.retain(|path, _| live.contains(path));
        let dead: Vec<ValuePath> = plugins
            .keys()
            .filter(|path| !live.contains(*path))
            .cloned()
            .collect();
        for path in dead {
            if let Some(bridge) = plugins.remove(&path) {
                bridge.unmount(registry);
            }
        }

        Viewport::clamp(&mut self.active, self.rows.len());
        self.scroll.follow(self.active, self.rows.len());
    }

    fn move_active(&mut self, delta: isize) -> bool {
        let len = self.rows.len();
        if len == 0 {
            return false;
        }
        let next = self.active as isize + delta;
        if next < 0 || next >= len as isize {
            return false;
        }
        self.active = next as usize;
        self.scroll.follow(self.active, len);
        true
    }

    fn expand_active(&mut self) -> bool {
        let Some(row) = self.rows.get(self.active) else {
            return false;
        };
        if !row.is_collapsible() || !self.disclosure.is_collapsed(&row.path) {
            return false;
        }
        self.disclosure.set(&row.path, false);
        self.resync();
        true
    }

    fn collapse_active(&mut self) -> bool {
        let Some(row) = self.rows.get(self.active) else {
            return false;
        };
        if row.is_collapsible() && !self.disclosure.is_collapsed(&row.path) {
            self.disclosure.set(&row.path, true);
            self.resync();
            return true;
        }
        // on a leaf (or an already-collapsed node): jump to the parent row
        let Some(parent) = row.path.parent() else {
            return false;
        };
        if let Some(position) = self.rows.iter().position(|r| r.path == parent) {
            self.active = position;
            self.scroll.follow(self.active, self.rows.len());
            return true;
        }
        false
    }

    fn row_line(&self, row: &Row, focused: bool, active: bool) -> SpanLine {
        let marker_style = if active && focused {
            Style::new().color(Color::Cyan).bold()
        } else {
            Style::new().color(Color::DarkGrey)
        };
        let label_style = if active && focused {
            Style::new().color(Color::Cyan).bold()
        } else {
            Style::default()
        };
        let dim = Style::new().color(Color::DarkGrey);

        let mut line = vec![
            Span::styled(if active && focused { "❯" } else { " " }, marker_style),
            Span::new(" ".repeat(row.depth * 2 + 1)),
        ];
        match &row.kind {
            RowKind::Scalar { text } => {
                line.push(Span::styled(format!("{}: ", row.label), label_style));
                line.push(Span::new(text.clone()));
            }
            RowKind::EnumLabel { label, raw } => {
                line.push(Span::styled(format!("{}: ", row.label), label_style));
                match label {
                    Some(label) => line.push(Span::new(label.clone())),
                    None => line.push(Span::styled(raw.to_string(), dim)),
                }
            }
            RowKind::Absent => {
                line.push(Span::styled(format!("{}: ", row.label), label_style));
                line.push(Span::styled("none", dim));
            }
            RowKind::Composite {
                count,
                collapsed,
                preview,
            } => {
                line.push(Span::styled(
                    if *collapsed { "▶ " } else { "▼ " },
                    marker_style,
                ));
                line.push(Span::styled(
                    row.label.clone(),
                    Style::new().color(Color::Blue).bold(),
                ));
                line.push(Span::styled(format!(" ({count})"), dim));
                if let Some(preview) = preview {
                    line.push(Span::styled(format!(" {preview}"), dim));
                }
            }
            RowKind::Reference {
                ident,
                resolved,
                collapsed,
            } => {
                if *resolved {
                    line.push(Span::styled(
                        if *collapsed { "▶ " } else { "▼ " },
                        marker_style,
                    ));
                } else {
                    line.push(Span::new("  "));
                }
                line.push(Span::styled(format!("{}: ", row.label), label_style));
                line.push(Span::styled("@", Style::new().color(Color::Magenta)));
                line.push(Span::new(ident.clone()));
            }
            RowKind::Plugin {
                element_id,
                collapsed,
            } => {
                line.push(Span::styled(
                    if *collapsed { "▶ " } else { "▼ " },
                    marker_style,
                ));
                line.push(Span::styled(
                    row.label.clone(),
                    Style::new().color(Color::Blue).bold(),
                ));
                line.push(Span::styled(format!(" ⟨{element_id}⟩"), dim));
            }
        }
        line
    }
}

fn walk(env: &mut WalkEnv<'_>, value: &Value, shape: &Shape, path: ValuePath, depth: usize, label: &str) {
    match shape {
        Shape::Primitive(kind) => env.rows.push(Row {
            path,
            depth,
            label: label.to_string(),
            kind: RowKind::Scalar {
                text: rows::scalar_text(value, *kind),
            },
        }),
        Shape::Enum(table) => match value.as_int() {
            Some(raw) => env.rows.push(Row {
                path,
                depth,
                label: label.to_string(),
                kind: RowKind::EnumLabel {
                    label: table.label_for(raw).map(str::to_string),
                    raw,
                },
            }),
            None => env.rows.push(Row {
                path,
                depth,
                label: label.to_string(),
                kind: RowKind::Scalar {
                    text: value.preview(PREVIEW_CHARS),
                },
            }),
        },
        Shape::Optional(inner) => {
            if value.is_absent() {
                env.rows.push(Row {
                    path,
                    depth,
                    label: label.to_string(),
                    kind: RowKind::Absent,
                });
            } else {
                walk(env, value, inner, path, depth, label);
            }
        }
        Shape::List(inner) => {
            env.live.insert(path.clone());
            let items = value.as_list().unwrap_or(&[]);
            let collapsed = env.disclosure.sight(
                &path,
                default_collapsed(items.len(), inner.is_composite()),
            );
            env.rows.push(Row {
                path: path.clone(),
                depth,
                label: label.to_string(),
                kind: RowKind::Composite {
                    count: items.len(),
                    collapsed,
                    preview: collapsed.then(|| value.preview(PREVIEW_CHARS)),
                },
            });
            if !collapsed {
                for (index, item) in items.iter().enumerate() {
                    walk(
                        env,
                        item,
                        inner,
                        path.clone().index(index),
                        depth + 1,
                        format!("[{index}]").as_str(),
                    );
                }
            }
        }
        Shape::Record(fields) => {
            env.live.insert(path.clone());
            let collapsed = env.disclosure.sight(&path, false);
            env.rows.push(Row {
                path: path.clone(),
                depth,
                label: label.to_string(),
                kind: RowKind::Composite {
                    count: fields.len(),
                    collapsed,
                    preview: collapsed.then(|| value.preview(PREVIEW_CHARS)),
                },
            });
            if !collapsed {
                let absent = Value::None;
                for field in fields {
                    let child = value.field(field.name.as_str()).unwrap_or(&absent);
                    walk(
                        env,
                        child,
                        &field.shape,
                        path.clone().key(field.name.as_str()),
                        depth + 1,
                        field.name.as_str(),
                    );
                }
            }
        }
        Shape::Reference => {
            env.live.insert(path.clone());
            let ident = value.as_text().unwrap_or("").to_string();
            let ctx = env.ctx;
            let slot = env
                .refs
                .entry(path.clone())
                .or_insert_with(|| ReferenceSlot::new(ident.as_str(), ctx.lookup.as_ref()));
            slot.refresh(ident.as_str(), ctx.lookup.as_ref());

            let resolved = slot.is_resolved();
            let collapsed = if resolved {
                env.disclosure.sight(&path, true)
            } else {
                true
            };
            env.rows.push(Row {
                path: path.clone(),
                depth,
                label: label.to_string(),
                kind: RowKind::Reference {
                    ident,
                    resolved,
                    collapsed,
                },
            });
            if resolved && !collapsed
                && let Some(profile) = env.refs.get(&path).and_then(ReferenceSlot::profile)
            {
                env.rows.push(Row {
                    path: path.clone().key("id"),
                    depth: depth + 1,
                    label: "id".to_string(),
                    kind: RowKind::Scalar {
                        text: profile.id.clone(),
                    },
                });
                env.rows.push(Row {
                    path: path.clone().key("kind"),
                    depth: depth + 1,
                    label: "kind".to_string(),
                    kind: RowKind::Scalar {
                        text: profile.kind.clone(),
                    },
                });
            }
        }
        Shape::Plugin { element_id } => {
            env.live.insert(path.clone());
            if !env.plugins.contains_key(&path) {
                let bridge = PluginBridge::mount(element_id.as_str(), env.registry);
                env.plugins.insert(path.clone(), bridge);
            }
            if let Some(bridge) = env.plugins.get_mut(&path) {
                // the element observes the latest snapshot on every re-render
                bridge.forward(env.ctx.plugin_frame(value));
            }
            let collapsed = env.disclosure.sight(&path, false);
            env.rows.push(Row {
                path,
                depth,
                label: label.to_string(),
                kind: RowKind::Plugin {
                    element_id: element_id.clone(),
                    collapsed,
                },
            });
        }
    }
}

impl Drawable for Inspector {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let focused = self.base.is_focused(ctx);
        let mut lines = Vec::new();
        if !self.base.label().is_empty() {
            lines.push(vec![Span::styled(
                self.base.label().to_string(),
                Style::new().bold(),
            )]);
        }

        let total = self.rows.len();
        for position in self.scroll.range(total) {
            let row = &self.rows[position];
            let active = position == self.active;
            lines.push(self.row_line(row, focused, active));

            // splice plugin body lines under their expanded header
            if let RowKind::Plugin { collapsed: false, .. } = row.kind
                && let Some(bridge) = self.plugins.get(&row.path)
            {
                for mut body_line in bridge.draw_lines() {
                    body_line.insert(0, Span::new(" ".repeat(row.depth * 2 + 4)));
                    lines.push(body_line);
                }
            }
        }
        if let Some(footer) = self.scroll.footer(total) {
            lines.push(vec![Span::styled(
                footer,
                Style::new().color(Color::DarkGrey),
            )]);
        }
        DrawOutput { lines }
    }
}

impl Interactive for Inspector {
    fn focus_mode(&self) -> FocusMode {
        FocusMode::Group
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if key.modifiers != KeyModifiers::NONE {
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
            KeyCode::Right => {
                if self.expand_active() {
                    InteractionResult::handled()
                } else {
                    InteractionResult::ignored()
                }
            }
            KeyCode::Left => {
                if self.collapse_active() {
                    InteractionResult::handled()
                } else {
                    InteractionResult::ignored()
                }
            }
            _ => InteractionResult::ignored(),
        }
    }

    fn on_tick(&mut self) -> InteractionResult {
        let mut result = InteractionResult::ignored();

        let mut resolved_any = false;
        for slot in self.refs.values_mut() {
            if slot.poll() {
                resolved_any = true;
            }
        }

        for bridge in self.plugins.values_mut() {
            for message in bridge.drain_errors() {
                result.merge(InteractionResult::with_action(WidgetAction::Notify {
                    message,
                }));
            }
        }

        if resolved_any {
            self.resync();
            result.merge(InteractionResult::handled());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::sync::mpsc::{Receiver, Sender, channel};

    use super::{Inspector, RowKind};
    use crate::core::shape::{Field, Shape};
    use crate::core::symbols::SymbolTable;
    use crate::core::value::Value;
    use crate::session::{
        Connection, Outcome, PluginRegistry, SessionContext, UserLookup, UserProfile,
    };
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Interactive;

    struct NullConnection;

    impl Connection for NullConnection {
        fn submit(&self, _operation: &str, _payload: Value) -> Receiver<Outcome> {
            let (sender, receiver) = channel();
            let _ = sender.send(Outcome::Success);
            receiver
        }
    }

    #[derive(Default)]
    struct ManualLookup {
        senders: Mutex<HashMap<String, Vec<Sender<Option<UserProfile>>>>>,
    }

    impl ManualLookup {
        fn resolve(&self, id: &str, profile: Option<UserProfile>) {
            let mut senders = self.senders.lock().expect("lock");
            if let Some(list) = senders.get_mut(id) {
                for sender in list.drain(..) {
                    let _ = sender.send(profile.clone());
                }
            }
        }
    }

    impl UserLookup for ManualLookup {
        fn lookup(&self, id: &str) -> Receiver<Option<UserProfile>> {
            let (sender, receiver) = channel();
            self.senders
                .lock()
                .expect("lock")
                .entry(id.to_string())
                .or_default()
                .push(sender);
            receiver
        }
    }

    fn context(lookup: Arc<ManualLookup>, state: Value) -> SessionContext {
        let mut ctx = SessionContext::new(
            Arc::new(NullConnection),
            lookup,
            UserProfile::new("me", "human"),
        );
        ctx.apply_snapshot(state, 1);
        ctx
    }

    fn scalar_list_shape() -> Shape {
        Shape::record(vec![Field::new("ids", Shape::list(Shape::int()))])
    }

    fn int_list(n: i64) -> Value {
        Value::record(vec![(
            "ids".to_string(),
            Value::List((0..n).map(Value::Int).collect()),
        )])
    }

    #[test]
    fn mount_heuristic_collapses_long_scalar_lists() {
        let lookup = Arc::new(ManualLookup::default());
        let mut inspector = Inspector::new(
            "state",
            "",
            scalar_list_shape(),
            PluginRegistry::new(),
        );

        inspector.set_snapshot(&context(Arc::clone(&lookup), int_list(5)));
        let list_row = &inspector.rows()[1];
        let RowKind::Composite { collapsed, count, .. } = &list_row.kind else {
            panic!("expected composite row");
        };
        assert!(*collapsed);
        assert_eq!(*count, 5);
        // only the headers are visible
        assert_eq!(inspector.rows().len(), 2);
    }

    #[test]
    fn short_scalar_lists_mount_expanded() {
        let lookup = Arc::new(ManualLookup::default());
        let mut inspector = Inspector::new(
            "state",
            "",
            scalar_list_shape(),
            PluginRegistry::new(),
        );
        inspector.set_snapshot(&context(Arc::clone(&lookup), int_list(4)));
        // root + list header + 4 items
        assert_eq!(inspector.rows().len(), 6);
    }

    #[test]
    fn collapse_state_survives_snapshot_growth() {
        let lookup = Arc::new(ManualLookup::default());
        let mut inspector = Inspector::new(
            "state",
            "",
            scalar_list_shape(),
            PluginRegistry::new(),
        );
        inspector.set_snapshot(&context(Arc::clone(&lookup), int_list(4)));
        assert_eq!(inspector.rows().len(), 6);

        // grows past the threshold; the mount-time default is not re-run
        inspector.set_snapshot(&context(Arc::clone(&lookup), int_list(9)));
        assert_eq!(inspector.rows().len(), 11);
    }

    #[test]
    fn out_of_range_enum_renders_raw_without_panic() {
        let lookup = Arc::new(ManualLookup::default());
        let shape = Shape::record(vec![Field::new(
            "phase",
            Shape::enumeration(SymbolTable::from_labels(["Lobby", "Playing"])),
        )]);
        let state = Value::record(vec![("phase".to_string(), Value::Int(9))]);
        let mut inspector = Inspector::new("state", "", shape, PluginRegistry::new());
        inspector.set_snapshot(&context(Arc::clone(&lookup), state));

        let RowKind::EnumLabel { label, raw } = &inspector.rows()[1].kind else {
            panic!("expected enum row");
        };
        assert_eq!(label, &None);
        assert_eq!(*raw, 9);
    }

    #[test]
    fn reference_upgrades_in_place_and_expands_to_two_fields() {
        let lookup = Arc::new(ManualLookup::default());
        let shape = Shape::record(vec![Field::new("leader", Shape::Reference)]);
        let state = Value::record(vec![("leader".to_string(), Value::text("u1"))]);
        let mut inspector = Inspector::new("state", "", shape, PluginRegistry::new());
        inspector.set_snapshot(&context(Arc::clone(&lookup), state));

        let RowKind::Reference { resolved, .. } = &inspector.rows()[1].kind else {
            panic!("expected reference row");
        };
        assert!(!resolved);

        lookup.resolve("u1", Some(UserProfile::new("u1", "human")));
        inspector.on_tick();
        let RowKind::Reference { resolved, collapsed, .. } = &inspector.rows()[1].kind else {
            panic!("expected reference row");
        };
        assert!(*resolved);
        assert!(*collapsed);

        // navigate onto the reference row and expand it
        inspector.on_key(KeyEvent::plain(KeyCode::Down));
        inspector.on_key(KeyEvent::plain(KeyCode::Right));
        let labels: Vec<&str> = inspector
            .rows()
            .iter()
            .map(|row| row.label.as_str())
            .collect();
        assert_eq!(labels, vec!["state", "leader", "id", "kind"]);
    }

    #[test]
    fn failed_lookup_stays_raw_without_crash() {
        let lookup = Arc::new(ManualLookup::default());
        let shape = Shape::record(vec![Field::new("leader", Shape::Reference)]);
        let state = Value::record(vec![("leader".to_string(), Value::text("u2"))]);
        let mut inspector = Inspector::new("state", "", shape, PluginRegistry::new());
        inspector.set_snapshot(&context(Arc::clone(&lookup), state));

        lookup.resolve("u2", None);
        inspector.on_tick();
        let RowKind::Reference { resolved, ident, .. } = &inspector.rows()[1].kind else {
            panic!("expected reference row");
        };
        assert!(!resolved);
        assert_eq!(ident.as_str(), "u2");
    }
}

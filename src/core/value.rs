use indexmap::IndexMap;

use crate::core::value_path::{PathSegment, ValuePath};

/// Runtime data handled by the engine. Every `Value` matches exactly one
/// [`Shape`](crate::core::shape::Shape) variant structurally; `None` doubles
/// as the absent state of an optional field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Record(IndexMap<String, Value>),
}

impl Value {
    pub fn record<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self::Record(fields.into_iter().collect())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_record().and_then(|map| map.get(name))
    }

    pub fn item(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Scalar values rendered as a single token; composites yield `None`.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Text(v) => Some(v.clone()),
            Self::None | Self::List(_) | Self::Record(_) => None,
        }
    }

    pub fn get_path(&self, path: &ValuePath) -> Option<&Value> {
        let mut current = self;
        for segment in path.segments() {
            current = match segment {
                PathSegment::Key(key) => current.field(key.as_str())?,
                PathSegment::Index(index) => current.item(*index)?,
            };
        }
        Some(current)
    }

    /// Writes `value` at `path`, materializing intermediate records/lists as
    /// needed. Wrong-kind intermediates are replaced, list gaps fill with
    /// `None`.
    pub fn set_path(&mut self, path: &ValuePath, value: Value) {
        *self.ensure_path_mut(path) = value;
    }

    fn ensure_path_mut(&mut self, path: &ValuePath) -> &mut Value {
        let segments = path.segments();
        let mut current = self;
        for (pos, segment) in segments.iter().enumerate() {
            let next = segments.get(pos + 1);
            match segment {
                PathSegment::Key(key) => {
                    if !matches!(current, Value::Record(_)) {
                        *current = Value::Record(IndexMap::new());
                    }
                    let Value::Record(map) = current else {
                        unreachable!("record ensured above");
                    };
                    current = map
                        .entry(key.clone())
                        .or_insert_with(|| container_for(next));
                }
                PathSegment::Index(index) => {
                    if !matches!(current, Value::List(_)) {
                        *current = Value::List(Vec::new());
                    }
                    let Value::List(items) = current else {
                        unreachable!("list ensured above");
                    };
                    if items.len() <= *index {
                        items.resize_with(index + 1, || Value::None);
                    }
                    if matches!(items[*index], Value::None) {
                        items[*index] = container_for(next);
                    }
                    current = &mut items[*index];
                }
            }
        }
        current
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::None => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(v) => serde_json::Value::String(v.clone()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Self::Record(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(v) => Self::Bool(v),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(v) => Self::Int(v),
                None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(v) => Self::Text(v),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Record(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// One-line rendition for collapsed composites; scalars pass through,
    /// composites become truncated compact JSON.
    pub fn preview(&self, max_chars: usize) -> String {
        if let Some(scalar) = self.scalar_text() {
            return truncate_chars(scalar.as_str(), max_chars);
        }
        match self {
            Self::None => "none".to_string(),
            _ => truncate_chars(self.to_json().to_string().as_str(), max_chars),
        }
    }
}

fn container_for(next: Option<&PathSegment>) -> Value {
    match next {
        Some(PathSegment::Index(_)) => Value::List(Vec::new()),
        Some(PathSegment::Key(_)) => Value::Record(IndexMap::new()),
        None => Value::None,
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    let count = input.chars().count();
    if count <= max_chars {
        return input.to_string();
    }
    let mut out = input
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::core::value_path::ValuePath;

    #[test]
    fn set_path_materializes_nested_structure() {
        let mut root = Value::None;
        let path = ValuePath::root().key("quests").index(1).key("leader");
        root.set_path(&path, Value::text("u3"));

        assert_eq!(root.get_path(&path).and_then(Value::as_text), Some("u3"));
        let gap = ValuePath::root().key("quests").index(0);
        assert_eq!(root.get_path(&gap), Some(&Value::None));
    }

    #[test]
    fn set_path_overwrites_existing_leaf() {
        let mut root = Value::None;
        let path = ValuePath::root().key("started");
        root.set_path(&path, Value::Bool(false));
        root.set_path(&path, Value::Bool(true));
        assert_eq!(root.get_path(&path).and_then(Value::as_bool), Some(true));
    }

    #[test]
    fn json_round_trip_preserves_structure() {
        let value = Value::record(vec![
            ("id".to_string(), Value::Int(2)),
            (
                "tags".to_string(),
                Value::List(vec![Value::text("a"), Value::text("b")]),
            ),
        ]);
        assert_eq!(Value::from_json(value.to_json()), value);
    }

    #[test]
    fn preview_truncates_long_composites() {
        let value = Value::List(vec![Value::text("abcdefghij"); 8]);
        let preview = value.preview(20);
        assert_eq!(preview.chars().count(), 20);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn preview_renders_absent_as_none() {
        assert_eq!(Value::None.preview(10), "none");
    }
}

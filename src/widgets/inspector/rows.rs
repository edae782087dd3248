use crate::core::shape::PrimitiveKind;
use crate::core::value::Value;
use crate::core::value_path::ValuePath;

/// One visible line of the flattened value tree. Collapsed subtrees emit
/// their header row only, so the row list is exactly what is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub path: ValuePath,
    pub depth: usize,
    pub label: String,
    pub kind: RowKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Scalar {
        text: String,
    },
    /// Enum backing value with its positional label; `None` label is the
    /// documented degraded form for out-of-range values.
    EnumLabel {
        label: Option<String>,
        raw: i64,
    },
    /// An optional in its absent state.
    Absent,
    /// List or record header.
    Composite {
        count: usize,
        collapsed: bool,
        preview: Option<String>,
    },
    /// Reference node; `resolved` upgrades it to a collapsible panel.
    Reference {
        ident: String,
        resolved: bool,
        collapsed: bool,
    },
    /// Plugin host header; the bridge's lines are spliced in below it.
    Plugin {
        element_id: String,
        collapsed: bool,
    },
}

impl Row {
    pub fn is_collapsible(&self) -> bool {
        matches!(
            self.kind,
            RowKind::Composite { .. }
                | RowKind::Plugin { .. }
                | RowKind::Reference { resolved: true, .. }
        )
    }
}

/// Scalar display form; a shape/value mismatch falls back to the preview so
/// one bad subtree never takes siblings down with it.
pub fn scalar_text(value: &Value, kind: PrimitiveKind) -> String {
    let matches_kind = matches!(
        (kind, value),
        (PrimitiveKind::Text, Value::Text(_))
            | (PrimitiveKind::Int, Value::Int(_))
            | (PrimitiveKind::Float, Value::Float(_) | Value::Int(_))
            | (PrimitiveKind::Bool, Value::Bool(_))
    );
    if matches_kind {
        value.scalar_text().unwrap_or_default()
    } else {
        value.preview(32)
    }
}

#[cfg(test)]
mod tests {
    use super::scalar_text;
    use crate::core::shape::PrimitiveKind;
    use crate::core::value::Value;

    #[test]
    fn matching_scalars_render_plainly() {
        assert_eq!(scalar_text(&Value::Int(4), PrimitiveKind::Int), "4");
        assert_eq!(scalar_text(&Value::Bool(true), PrimitiveKind::Bool), "true");
        assert_eq!(
            scalar_text(&Value::Int(4), PrimitiveKind::Float),
            "4"
        );
    }

    #[test]
    fn mismatches_degrade_to_previews() {
        assert_eq!(
            scalar_text(&Value::text("oops"), PrimitiveKind::Int),
            "oops"
        );
        assert_eq!(scalar_text(&Value::None, PrimitiveKind::Text), "none");
    }
}

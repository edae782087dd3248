use crate::core::value::Value;

/// Ordered label → numeric value table backing an enumeration shape.
///
/// Source tables may carry string-valued reverse aliases next to the numeric
/// constants (`{"Approve": 0, "0": "Approve"}`); construction keeps the
/// numeric-valued entries only, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    entries: Vec<(String, i64)>,
}

impl SymbolTable {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            entries: entries
                .into_iter()
                .filter_map(|(label, value)| value.as_int().map(|backing| (label, backing)))
                .collect(),
        }
    }

    /// Convenience for tables whose values are their positions.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            entries: labels
                .into_iter()
                .enumerate()
                .map(|(pos, label)| (label.into(), pos as i64))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, i64)] {
        self.entries.as_slice()
    }

    pub fn label_at(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(|(label, _)| label.as_str())
    }

    pub fn value_at(&self, position: usize) -> Option<i64> {
        self.entries.get(position).map(|(_, backing)| *backing)
    }

    pub fn position_of(&self, backing: i64) -> Option<usize> {
        self.entries.iter().position(|(_, value)| *value == backing)
    }

    /// Display-mode lookup: the label at position `backing` among the
    /// numeric entries. Out-of-range values (including negatives) resolve
    /// to `None` — the degraded form, never a panic.
    pub fn label_for(&self, backing: i64) -> Option<&str> {
        usize::try_from(backing).ok().and_then(|pos| self.label_at(pos))
    }
}

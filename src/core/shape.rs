use crate::core::symbols::SymbolTable;
use crate::core::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Text,
    Int,
    Float,
    Bool,
}

/// A named field of a record shape, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
}

impl Field {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// Static description of how to interpret a [`Value`]. Built once per
/// concrete application schema and shared by the display and edit
/// pipelines; dispatch happens on the tag, never by sniffing the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    Enum(SymbolTable),
    Optional(Box<Shape>),
    List(Box<Shape>),
    Record(Vec<Field>),
    /// Opaque identifier resolved lazily through the session's user lookup.
    Reference,
    /// Externally registered rendering element, addressed by id.
    Plugin { element_id: String },
}

impl Shape {
    pub fn text() -> Self {
        Self::Primitive(PrimitiveKind::Text)
    }

    pub fn int() -> Self {
        Self::Primitive(PrimitiveKind::Int)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Bool)
    }

    pub fn enumeration(table: SymbolTable) -> Self {
        Self::Enum(table)
    }

    pub fn optional(inner: Shape) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(inner: Shape) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn record(fields: Vec<Field>) -> Self {
        Self::Record(fields)
    }

    pub fn plugin(element_id: impl Into<String>) -> Self {
        Self::Plugin {
            element_id: element_id.into(),
        }
    }

    /// Drives the list collapse heuristic and the list layout branch.
    /// Optional wrappers are transparent to the test.
    pub fn is_composite(&self) -> bool {
        match self {
            Self::List(_) | Self::Record(_) => true,
            Self::Optional(inner) => inner.is_composite(),
            Self::Primitive(_) | Self::Enum(_) | Self::Reference | Self::Plugin { .. } => false,
        }
    }

    /// Structural zero value for this shape, used where the caller supplies
    /// no explicit default factory.
    pub fn blank(&self) -> Value {
        match self {
            Self::Primitive(PrimitiveKind::Text) => Value::Text(String::new()),
            Self::Primitive(PrimitiveKind::Int) => Value::Int(0),
            Self::Primitive(PrimitiveKind::Float) => Value::Float(0.0),
            Self::Primitive(PrimitiveKind::Bool) => Value::Bool(false),
            Self::Enum(table) => Value::Int(table.value_at(0).unwrap_or(0)),
            Self::Optional(_) => Value::None,
            Self::List(_) => Value::List(Vec::new()),
            Self::Record(fields) => Value::record(
                fields
                    .iter()
                    .map(|field| (field.name.clone(), field.shape.blank())),
            ),
            Self::Reference => Value::Text(String::new()),
            Self::Plugin { .. } => Value::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, Shape};
    use crate::core::symbols::SymbolTable;
    use crate::core::value::Value;

    #[test]
    fn composite_test_sees_through_optional() {
        assert!(Shape::list(Shape::int()).is_composite());
        assert!(Shape::optional(Shape::record(vec![])).is_composite());
        assert!(!Shape::optional(Shape::text()).is_composite());
        assert!(!Shape::Reference.is_composite());
    }

    #[test]
    fn blank_record_has_every_field_in_order() {
        let shape = Shape::record(vec![
            Field::new("id", Shape::int()),
            Field::new("name", Shape::text()),
        ]);
        let blank = shape.blank();
        let record = blank.as_record().expect("record");
        assert_eq!(
            record.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["id", "name"]
        );
        assert_eq!(record.get("id"), Some(&Value::Int(0)));
    }

    #[test]
    fn blank_enum_uses_first_table_entry() {
        let table = SymbolTable::from_entries(vec![
            ("Approve".to_string(), Value::Int(0)),
            ("Reject".to_string(), Value::Int(1)),
        ]);
        assert_eq!(Shape::enumeration(table).blank(), Value::Int(0));
    }
}

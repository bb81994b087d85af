//! Typed prop schema descriptors
//!
//! Each component type declares a [`PropSchema`]: prop name to [`PropSpec`].
//! Descriptors are checked structurally against `serde_json::Value`s.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Shape descriptor for a single prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKind {
    /// Anything, including null
    Any,
    String,
    /// Any JSON number
    Number,
    /// A number with no fractional part
    Integer,
    Bool,
    /// One of a fixed set of literal values
    Enum(Vec<Value>),
    /// Array whose elements all match the inner kind
    ArrayOf(Box<PropKind>),
    /// Object whose values all match the inner kind
    ObjectOf(Box<PropKind>),
    /// Object with named fields; fields not listed are ignored
    Shape(BTreeMap<String, PropSpec>),
    /// Matches if any alternative matches
    Union(Vec<PropKind>),
}

impl PropKind {
    pub fn enumeration<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        PropKind::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn array_of(kind: PropKind) -> Self {
        PropKind::ArrayOf(Box::new(kind))
    }

    pub fn object_of(kind: PropKind) -> Self {
        PropKind::ObjectOf(Box::new(kind))
    }

    pub fn shape<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, PropSpec)>,
        K: Into<String>,
    {
        PropKind::Shape(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn union(kinds: impl IntoIterator<Item = PropKind>) -> Self {
        PropKind::Union(kinds.into_iter().collect())
    }
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropKind::Any => f.write_str("any"),
            PropKind::String => f.write_str("string"),
            PropKind::Number => f.write_str("number"),
            PropKind::Integer => f.write_str("integer"),
            PropKind::Bool => f.write_str("boolean"),
            PropKind::Enum(values) => {
                let listed: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "one of [{}]", listed.join(", "))
            }
            PropKind::ArrayOf(inner) => write!(f, "array of {inner}"),
            PropKind::ObjectOf(inner) => write!(f, "object of {inner}"),
            PropKind::Shape(fields) => {
                let names: Vec<&str> = fields.keys().map(String::as_str).collect();
                write!(f, "shape {{{}}}", names.join(", "))
            }
            PropKind::Union(kinds) => {
                let listed: Vec<String> = kinds.iter().map(ToString::to_string).collect();
                write!(f, "one of type [{}]", listed.join(", "))
            }
        }
    }
}

/// Declared kind plus required flag.
#[derive(Debug, Clone, PartialEq)]
pub struct PropSpec {
    pub kind: PropKind,
    pub required: bool,
}

impl PropSpec {
    pub fn required(kind: PropKind) -> Self {
        Self {
            kind,
            required: true,
        }
    }

    pub fn optional(kind: PropKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }
}

/// All declared props of one component type.
///
/// Built once through [`PropSchemaBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PropSchema {
    component_type: String,
    props: BTreeMap<String, PropSpec>,
    disallow_unknown: bool,
}

impl PropSchema {
    pub fn builder(component_type: impl Into<String>) -> PropSchemaBuilder {
        PropSchemaBuilder {
            schema: PropSchema {
                component_type: component_type.into(),
                props: BTreeMap::new(),
                disallow_unknown: false,
            },
        }
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// Declared props in name order
    pub fn props(&self) -> impl Iterator<Item = (&str, &PropSpec)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn prop(&self, name: &str) -> Option<&PropSpec> {
        self.props.get(name)
    }

    pub fn disallows_unknown(&self) -> bool {
        self.disallow_unknown
    }
}

pub struct PropSchemaBuilder {
    schema: PropSchema,
}

impl PropSchemaBuilder {
    pub fn required(mut self, name: impl Into<String>, kind: PropKind) -> Self {
        self.schema.props.insert(name.into(), PropSpec::required(kind));
        self
    }

    pub fn optional(mut self, name: impl Into<String>, kind: PropKind) -> Self {
        self.schema.props.insert(name.into(), PropSpec::optional(kind));
        self
    }

    /// Flag props that are not declared instead of ignoring them.
    pub fn disallow_unknown(mut self) -> Self {
        self.schema.disallow_unknown = true;
        self
    }

    pub fn build(self) -> PropSchema {
        self.schema
    }
}

/// A value that did not match its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mismatch {
    /// Path below the prop, e.g. `[2].color`; empty at the top level
    pub path: String,
    pub expected: String,
    pub actual: Value,
}

/// JS-style type name used in messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl PropKind {
    /// Check `value` against this descriptor, reporting the innermost mismatch.
    pub(crate) fn check(&self, value: &Value) -> Result<(), Mismatch> {
        let leaf = |ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(Mismatch {
                    path: String::new(),
                    expected: self.to_string(),
                    actual: value.clone(),
                })
            }
        };

        match self {
            PropKind::Any => Ok(()),
            PropKind::String => leaf(value.is_string()),
            PropKind::Number => leaf(value.is_number()),
            PropKind::Integer => leaf(value.is_i64() || value.is_u64() || is_integral_float(value)),
            PropKind::Bool => leaf(value.is_boolean()),
            PropKind::Enum(values) => leaf(values.iter().any(|v| enum_member_eq(v, value))),
            PropKind::Union(kinds) => leaf(kinds.iter().any(|k| k.check(value).is_ok())),
            PropKind::ArrayOf(inner) => {
                let Some(items) = value.as_array() else {
                    return leaf(false);
                };
                for (i, item) in items.iter().enumerate() {
                    inner.check(item).map_err(|m| m.nested(&format!("[{i}]")))?;
                }
                Ok(())
            }
            PropKind::ObjectOf(inner) => {
                let Some(map) = value.as_object() else {
                    return leaf(false);
                };
                for (key, item) in map {
                    inner.check(item).map_err(|m| m.nested(&format!(".{key}")))?;
                }
                Ok(())
            }
            PropKind::Shape(fields) => {
                let Some(map) = value.as_object() else {
                    return leaf(false);
                };
                for (name, spec) in fields {
                    match map.get(name) {
                        None | Some(Value::Null) if spec.required => {
                            return Err(Mismatch {
                                path: format!(".{name}"),
                                expected: spec.kind.to_string(),
                                actual: Value::Null,
                            });
                        }
                        None | Some(Value::Null) => {}
                        Some(field) => spec
                            .kind
                            .check(field)
                            .map_err(|m| m.nested(&format!(".{name}")))?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Enum membership. Numbers compare by value, so `1` matches `1.0`.
fn enum_member_eq(member: &Value, value: &Value) -> bool {
    match (member, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => member == value,
    }
}

fn is_integral_float(value: &Value) -> bool {
    value.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

impl Mismatch {
    fn nested(mut self, segment: &str) -> Self {
        self.path.insert_str(0, segment);
        self
    }
}

//! Identifiers for graph nodes and callbacks.
//!
//! A node is a `(component id, prop name)` pair. Its textual form is
//! `"componentId.propName"`, which is also the key the rendering layer uses
//! for `profile.graphLayout.positions`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a node key cannot be parsed or constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeKeyError {
    #[error("node key `{0}` has no `.` separating component id and prop name")]
    MissingSeparator(String),

    #[error("invalid component id `{0}`")]
    InvalidComponentId(String),

    #[error("invalid prop name `{0}`")]
    InvalidPropName(String),
}

/// Returns true if a component id can be used as the left half of a node key.
///
/// Rules:
/// - Must be non-empty
/// - Must not contain `.` (the key separator)
/// - Must not contain control characters
pub fn is_valid_component_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(|c| c == '.' || c.is_control())
}

/// Returns true if a prop name can be used as the right half of a node key.
pub fn is_valid_prop_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Identity of a graph node: one property of one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    component_id: String,
    prop_name: String,
}

impl NodeKey {
    /// Create a key, validating both halves.
    pub fn new(
        component_id: impl Into<String>,
        prop_name: impl Into<String>,
    ) -> Result<Self, NodeKeyError> {
        let component_id = component_id.into();
        let prop_name = prop_name.into();
        if !is_valid_component_id(&component_id) {
            return Err(NodeKeyError::InvalidComponentId(component_id));
        }
        if !is_valid_prop_name(&prop_name) {
            return Err(NodeKeyError::InvalidPropName(prop_name));
        }
        Ok(Self {
            component_id,
            prop_name,
        })
    }

    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn prop_name(&self) -> &str {
        &self.prop_name
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component_id, self.prop_name)
    }
}

impl FromStr for NodeKey {
    type Err = NodeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Component ids never contain '.', so the first one is the separator.
        let (component_id, prop_name) = s
            .split_once('.')
            .ok_or_else(|| NodeKeyError::MissingSeparator(s.to_string()))?;
        Self::new(component_id, prop_name)
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of a registered callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(String);

impl CallbackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the id the framework assigns from a callback's outputs.
    ///
    /// A single output is its own key (`out.children`); several outputs are
    /// wrapped as `..a.children...b.style..`.
    pub fn from_outputs(outputs: &[NodeKey]) -> Self {
        match outputs {
            [single] => Self(single.to_string()),
            many => {
                let joined = many
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("...");
                Self(format!("..{joined}.."))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> NodeKey {
        s.parse().unwrap()
    }

    #[test]
    fn parses_component_and_prop() {
        let k = key("new-item.value");
        assert_eq!(k.component_id(), "new-item");
        assert_eq!(k.prop_name(), "value");
        assert_eq!(k.to_string(), "new-item.value");
    }

    #[test]
    fn prop_name_may_contain_dots() {
        let k = key("graph.figure.layout");
        assert_eq!(k.component_id(), "graph");
        assert_eq!(k.prop_name(), "figure.layout");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert_eq!(
            "nodot".parse::<NodeKey>(),
            Err(NodeKeyError::MissingSeparator("nodot".into()))
        );
        assert!(matches!(
            ".value".parse::<NodeKey>(),
            Err(NodeKeyError::InvalidComponentId(_))
        ));
        assert!(matches!(
            "btn.".parse::<NodeKey>(),
            Err(NodeKeyError::InvalidPropName(_))
        ));
        assert!(NodeKey::new("a.b", "c").is_err());
    }

    #[test]
    fn serializes_as_dotted_string() {
        let json = serde_json::to_string(&key("btn.n_clicks")).unwrap();
        assert_eq!(json, "\"btn.n_clicks\"");
        let back: NodeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key("btn.n_clicks"));
        assert!(serde_json::from_str::<NodeKey>("\"broken\"").is_err());
    }

    #[test]
    fn callback_id_from_outputs() {
        assert_eq!(
            CallbackId::from_outputs(&[key("totals.children")]).as_str(),
            "totals.children"
        );
        assert_eq!(
            CallbackId::from_outputs(&[key("a.children"), key("b.style")]).as_str(),
            "..a.children...b.style.."
        );
    }
}

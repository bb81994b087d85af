//! Prop validation against registered schemas

use hashbrown::HashMap;
use serde_json::{Map, Value};

use super::schema::{PropSchema, type_name};

/// Why a prop was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Value present but of the wrong type or shape
    TypeMismatch,
    /// Required prop absent or null
    MissingRequired,
    /// Prop not declared by a schema that disallows unknown props
    Disallowed,
}

/// One invalid prop found during a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationViolation {
    pub component_type: String,
    pub component_id: Option<String>,
    /// Prop name, extended with a path for nested mismatches (`options[1].label`)
    pub prop_name: String,
    pub expected_kind: String,
    pub actual_value: Value,
    pub kind: ViolationKind,
    /// Console-ready description
    pub message: String,
}

/// Registry of component schemas plus the validation walk.
#[derive(Debug, Default)]
pub struct PropValidator {
    schemas: HashMap<String, PropSchema>,
}

impl PropValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the schema for a component type.
    ///
    /// Redeclaring a type replaces its schema wholesale; the previous one is
    /// returned. A declared schema is never edited in place.
    pub fn register(&mut self, schema: PropSchema) -> Option<PropSchema> {
        let component_type = schema.component_type().to_string();
        let previous = self.schemas.insert(component_type, schema);
        if let Some(previous) = &previous {
            tracing::debug!(
                component_type = %previous.component_type(),
                "prop schema redeclared, replacing"
            );
        }
        previous
    }

    pub fn schema(&self, component_type: &str) -> Option<&PropSchema> {
        self.schemas.get(component_type)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Check `props` against the schema for `component_type`.
    ///
    /// Undeclared component types produce no violations. Null counts as absent.
    pub fn validate(
        &self,
        component_type: &str,
        component_id: Option<&str>,
        props: &Map<String, Value>,
    ) -> Vec<ValidationViolation> {
        let Some(schema) = self.schemas.get(component_type) else {
            return Vec::new();
        };

        let violation = |prop_name: String, expected: String, actual: Value, kind: ViolationKind| {
            let message = format_message(
                component_type,
                component_id,
                &prop_name,
                &expected,
                &actual,
                kind,
            );
            ValidationViolation {
                component_type: component_type.to_string(),
                component_id: component_id.map(str::to_string),
                prop_name,
                expected_kind: expected,
                actual_value: actual,
                kind,
                message,
            }
        };

        let mut violations = Vec::new();

        for (name, spec) in schema.props() {
            match props.get(name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        violations.push(violation(
                            name.to_string(),
                            spec.kind.to_string(),
                            Value::Null,
                            ViolationKind::MissingRequired,
                        ));
                    }
                }
                Some(value) => {
                    if let Err(mismatch) = spec.kind.check(value) {
                        let kind = if mismatch.path.is_empty() || !mismatch.actual.is_null() {
                            ViolationKind::TypeMismatch
                        } else {
                            ViolationKind::MissingRequired
                        };
                        violations.push(violation(
                            format!("{name}{}", mismatch.path),
                            mismatch.expected,
                            mismatch.actual,
                            kind,
                        ));
                    }
                }
            }
        }

        if schema.disallows_unknown() {
            let mut unknown: Vec<&String> = props
                .keys()
                .filter(|k| schema.prop(k).is_none())
                .collect();
            unknown.sort();
            for name in unknown {
                violations.push(violation(
                    name.clone(),
                    "no such prop".to_string(),
                    props[name.as_str()].clone(),
                    ViolationKind::Disallowed,
                ));
            }
        }

        violations
    }
}

fn format_message(
    component_type: &str,
    component_id: Option<&str>,
    prop_name: &str,
    expected: &str,
    actual: &Value,
    kind: ViolationKind,
) -> String {
    let with_id = component_id
        .map(|id| format!(" with ID \"{id}\""))
        .unwrap_or_default();

    match kind {
        ViolationKind::MissingRequired => format!(
            "Required argument `{prop_name}` was not specified in {component_type}{with_id}.\n\
             Expected `{expected}`."
        ),
        ViolationKind::Disallowed => format!(
            "Invalid argument `{prop_name}` passed into {component_type}{with_id}.\n\
             {component_type} does not declare a prop named `{prop_name}`.\n\
             Value provided: {actual}"
        ),
        ViolationKind::TypeMismatch => format!(
            "Invalid argument `{prop_name}` passed into {component_type}{with_id}.\n\
             Expected `{expected}`.\n\
             Was supplied type `{}`.\n\
             Value provided: {actual}",
            type_name(actual)
        ),
    }
}

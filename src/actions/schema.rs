//! Declared shape of every action and the checks derived from it.
//!
//! The same [`FieldSpec`] table drives request validation and the tool
//! descriptor handed to tool-calling frameworks, so the two cannot drift.

use serde_json::{json, Map, Value};
use std::fmt;

use super::types::{ActionKind, ActionRequest};
use crate::constants::{MAX_MORPH_STEPS, MAX_PRESET_NAME_LEN, TOOL_DESCRIPTION, TOOL_NAME};
use crate::utils::{BridgeError, Result};

const ACTION_NAMES: &[&str] = &["load_preset", "set_parameter", "list_presets", "morph"];
const CATEGORY_NAMES: &[&str] = &["bass", "pad", "lead", "arp", "fx", "percussion"];

/// A field of the request wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Action,
    Preset,
    Category,
    Track,
    Parameter,
    Value,
    Steps,
}

impl Field {
    /// Declaration order; validation reports the first violation in this order
    pub const ALL: [Field; 7] = [
        Field::Action,
        Field::Preset,
        Field::Category,
        Field::Track,
        Field::Parameter,
        Field::Value,
        Field::Steps,
    ];

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Check an integer against this field's declared bounds
    pub fn check_integer(&self, n: i64) -> Result<()> {
        check_value(*self, FieldValue::Integer(n))
    }

    pub fn spec(&self) -> FieldSpec {
        match self {
            Field::Action => FieldSpec {
                name: "action",
                description: "Action to perform on Surge",
                field_type: FieldType::Choice {
                    options: ACTION_NAMES,
                },
            },
            Field::Preset => FieldSpec {
                name: "preset",
                description: "Preset name to load (for load_preset action)",
                field_type: FieldType::Text {
                    max_len: MAX_PRESET_NAME_LEN,
                },
            },
            Field::Category => FieldSpec {
                name: "category",
                description: "Preset category for semantic search",
                field_type: FieldType::Choice {
                    options: CATEGORY_NAMES,
                },
            },
            Field::Track => FieldSpec {
                name: "track",
                description: "Track index in Reaper (0-based)",
                field_type: FieldType::Integer { min: 0, max: None },
            },
            Field::Parameter => FieldSpec {
                name: "parameter",
                description: "Parameter ID to modify",
                field_type: FieldType::Integer { min: 0, max: None },
            },
            Field::Value => FieldSpec {
                name: "value",
                description: "Parameter value (0-1)",
                field_type: FieldType::Number { min: 0.0, max: 1.0 },
            },
            Field::Steps => FieldSpec {
                name: "steps",
                description: "Interpolation steps for morph (bridge default of 20 when omitted)",
                field_type: FieldType::Integer {
                    min: 1,
                    max: Some(MAX_MORPH_STEPS),
                },
            },
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type and bounds of a single field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    Text { max_len: usize },
    Integer { min: i64, max: Option<i64> },
    Number { min: f64, max: f64 },
    Choice { options: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub field_type: FieldType,
}

/// Declared shape of one action kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub description: &'static str,
    pub required: &'static [Field],
    pub optional: &'static [Field],
    /// At least one of these must be present; earlier entries win when several are
    pub one_of: &'static [Field],
}

/// A present field value, borrowed from either a typed request or raw JSON
#[derive(Debug, Clone, Copy)]
enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Number(f64),
}

/// Stateless registry of action shapes
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaRegistry;

impl SchemaRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Declared shape for an action kind
    pub fn describe(&self, kind: ActionKind) -> ActionSpec {
        match kind {
            ActionKind::LoadPreset => ActionSpec {
                kind,
                description: "Load a preset by exact name, or by category search",
                required: &[],
                optional: &[Field::Track],
                one_of: &[Field::Preset, Field::Category],
            },
            ActionKind::SetParameter => ActionSpec {
                kind,
                description: "Set a parameter to a normalized value",
                required: &[Field::Parameter, Field::Value],
                optional: &[],
                one_of: &[],
            },
            ActionKind::ListPresets => ActionSpec {
                kind,
                description: "List available presets",
                required: &[],
                optional: &[],
                one_of: &[],
            },
            ActionKind::Morph => ActionSpec {
                kind,
                description: "Interpolate a parameter toward a target value",
                required: &[Field::Parameter, Field::Value],
                optional: &[Field::Steps],
                one_of: &[],
            },
        }
    }

    /// Check a typed request against its action's declared shape.
    ///
    /// Fails with `InvalidRequest` naming the first violated field. Bounds
    /// are checked on every present field, whether or not the action uses it.
    pub fn validate(&self, request: &ActionRequest) -> Result<()> {
        let spec = self.describe(request.kind);

        for field in Field::ALL {
            match field_value(request, field) {
                Some(value) => check_value(field, value)?,
                None if spec.required.contains(&field) => {
                    return Err(BridgeError::invalid(
                        field,
                        format!("is required for {}", request.kind),
                    ));
                }
                None => {}
            }

            if spec.one_of.first() == Some(&field)
                && spec
                    .one_of
                    .iter()
                    .all(|candidate| field_value(request, *candidate).is_none())
            {
                let names: Vec<&str> = spec.one_of.iter().map(Field::name).collect();
                return Err(BridgeError::invalid(
                    field,
                    format!("one of {} is required for {}", names.join(" or "), request.kind),
                ));
            }
        }

        Ok(())
    }

    /// Check raw JSON input before it is deserialized into an `ActionRequest`.
    ///
    /// Verifies object shape, field types and bounds. Unknown keys are
    /// ignored and `null` counts as absent.
    pub fn validate_json(&self, input: &Value) -> Result<()> {
        let object = input
            .as_object()
            .ok_or_else(|| BridgeError::invalid(Field::Action, "request must be a JSON object"))?;

        for field in Field::ALL {
            match object.get(field.name()) {
                None | Some(Value::Null) if field == Field::Action => {
                    return Err(BridgeError::invalid(field, "is required"));
                }
                None | Some(Value::Null) => {}
                Some(raw) => check_value(field, json_value(field, raw)?)?,
            }
        }

        Ok(())
    }

    /// Machine-readable tool descriptor for external tool-calling frameworks
    pub fn tool_descriptor(&self) -> Value {
        let mut properties = Map::new();
        for field in Field::ALL {
            properties.insert(field.name().to_string(), property_schema(&field.spec()));
        }

        json!({
            "name": TOOL_NAME,
            "description": TOOL_DESCRIPTION,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": [Field::Action.name()],
            }
        })
    }
}

fn field_value(request: &ActionRequest, field: Field) -> Option<FieldValue<'_>> {
    match field {
        Field::Action => Some(FieldValue::Text(request.kind.as_str())),
        Field::Preset => request.preset.as_deref().map(FieldValue::Text),
        Field::Category => request.category.map(|c| FieldValue::Text(c.as_str())),
        Field::Track => Some(FieldValue::Integer(request.track)),
        Field::Parameter => request.parameter.map(FieldValue::Integer),
        Field::Value => request.value.map(FieldValue::Number),
        Field::Steps => request.steps.map(FieldValue::Integer),
    }
}

fn json_value(field: Field, raw: &Value) -> Result<FieldValue<'_>> {
    match field.spec().field_type {
        FieldType::Text { .. } | FieldType::Choice { .. } => raw
            .as_str()
            .map(FieldValue::Text)
            .ok_or_else(|| BridgeError::invalid(field, "must be a string")),
        FieldType::Integer { .. } => raw
            .as_i64()
            .map(FieldValue::Integer)
            .ok_or_else(|| BridgeError::invalid(field, "must be an integer")),
        FieldType::Number { .. } => raw
            .as_f64()
            .map(FieldValue::Number)
            .ok_or_else(|| BridgeError::invalid(field, "must be a number")),
    }
}

fn check_value(field: Field, value: FieldValue<'_>) -> Result<()> {
    match (field.spec().field_type, value) {
        (FieldType::Text { max_len }, FieldValue::Text(text)) => {
            if text.trim().is_empty() {
                return Err(BridgeError::invalid(field, "must not be empty"));
            }
            if text.chars().count() > max_len {
                return Err(BridgeError::invalid(
                    field,
                    format!("must be at most {} characters", max_len),
                ));
            }
            if text.chars().any(char::is_control) {
                return Err(BridgeError::invalid(field, "must not contain control characters"));
            }
            Ok(())
        }
        (FieldType::Choice { options }, FieldValue::Text(text)) => {
            if options.contains(&text) {
                Ok(())
            } else {
                Err(BridgeError::invalid(
                    field,
                    format!("'{}' is not one of {}", text, options.join(", ")),
                ))
            }
        }
        (FieldType::Integer { min, max }, FieldValue::Integer(n)) => {
            if n < min || max.is_some_and(|max| n > max) {
                let bound = match max {
                    Some(max) => format!("must be within [{}, {}]", min, max),
                    None => format!("must be at least {}", min),
                };
                return Err(BridgeError::invalid(field, format!("{} (got {})", bound, n)));
            }
            Ok(())
        }
        (FieldType::Number { min, max }, FieldValue::Number(x)) => {
            // NaN fails the range check
            if !(min..=max).contains(&x) {
                return Err(BridgeError::invalid(
                    field,
                    format!("must be within [{}, {}] (got {})", min, max, x),
                ));
            }
            Ok(())
        }
        _ => Err(BridgeError::invalid(field, "has the wrong type")),
    }
}

fn property_schema(spec: &FieldSpec) -> Value {
    let mut property = Map::new();
    match spec.field_type {
        FieldType::Text { max_len } => {
            property.insert("type".into(), json!("string"));
            property.insert("minLength".into(), json!(1));
            property.insert("maxLength".into(), json!(max_len));
        }
        FieldType::Choice { options } => {
            property.insert("type".into(), json!("string"));
            property.insert("enum".into(), json!(options));
        }
        FieldType::Integer { min, max } => {
            property.insert("type".into(), json!("integer"));
            property.insert("minimum".into(), json!(min));
            if let Some(max) = max {
                property.insert("maximum".into(), json!(max));
            }
        }
        FieldType::Number { min, max } => {
            property.insert("type".into(), json!("number"));
            property.insert("minimum".into(), json!(min));
            property.insert("maximum".into(), json!(max));
        }
    }
    property.insert("description".into(), json!(spec.description));
    Value::Object(property)
}

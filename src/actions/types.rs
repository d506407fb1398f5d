use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The closed set of operations the bridge can request of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Load a preset by name or by category search
    LoadPreset,
    /// Set a single parameter to a normalized value
    SetParameter,
    /// List the presets the host knows about
    ListPresets,
    /// Move a parameter toward a target over several steps
    Morph,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::LoadPreset,
        ActionKind::SetParameter,
        ActionKind::ListPresets,
        ActionKind::Morph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadPreset => "load_preset",
            Self::SetParameter => "set_parameter",
            Self::ListPresets => "list_presets",
            Self::Morph => "morph",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preset categories understood by the host's semantic search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetCategory {
    Bass,
    Pad,
    Lead,
    Arp,
    Fx,
    Percussion,
}

impl PresetCategory {
    pub const ALL: [PresetCategory; 6] = [
        PresetCategory::Bass,
        PresetCategory::Pad,
        PresetCategory::Lead,
        PresetCategory::Arp,
        PresetCategory::Fx,
        PresetCategory::Percussion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bass => "bass",
            Self::Pad => "pad",
            Self::Lead => "lead",
            Self::Arp => "arp",
            Self::Fx => "fx",
            Self::Percussion => "percussion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == s)
    }
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured request from an agent or intent classifier.
///
/// Integer fields are signed so that out-of-range input survives
/// deserialization and is rejected by validation with the field named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PresetCategory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub track: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Morph step override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
}

/// `null` means "not given", same as an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ActionRequest {
    fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            preset: None,
            category: None,
            track: 0,
            parameter: None,
            value: None,
            steps: None,
        }
    }

    pub fn load_preset(preset: impl Into<String>) -> Self {
        Self {
            preset: Some(preset.into()),
            ..Self::new(ActionKind::LoadPreset)
        }
    }

    pub fn load_category(category: PresetCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::new(ActionKind::LoadPreset)
        }
    }

    pub fn set_parameter(parameter: i64, value: f64) -> Self {
        Self {
            parameter: Some(parameter),
            value: Some(value),
            ..Self::new(ActionKind::SetParameter)
        }
    }

    pub fn list_presets() -> Self {
        Self::new(ActionKind::ListPresets)
    }

    pub fn morph(parameter: i64, target: f64) -> Self {
        Self {
            parameter: Some(parameter),
            value: Some(target),
            ..Self::new(ActionKind::Morph)
        }
    }

    pub fn on_track(mut self, track: i64) -> Self {
        self.track = track;
        self
    }
}

/// Which stage a failed dispatch stopped at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected by schema validation; never reached the host
    InvalidRequest,
    /// Registry and compiler disagree; a defect, not a user error
    Compile,
    /// The payload or its reply was lost on the way
    Transport,
    /// The host answered with a well-formed `ERROR`
    Host,
}

/// Uniform outcome handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data.into()),
            error: None,
            kind: None,
        }
    }

    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.into()),
            kind: Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_uses_wire_names() {
        let request: ActionRequest = serde_json::from_value(json!({
            "action": "set_parameter",
            "parameter": 10,
            "value": 0.8
        }))
        .unwrap();

        assert_eq!(request, ActionRequest::set_parameter(10, 0.8));
    }

    #[test]
    fn test_negative_track_survives_deserialization() {
        let request: ActionRequest =
            serde_json::from_value(json!({"action": "list_presets", "track": -2})).unwrap();
        assert_eq!(request.track, -2);
    }

    #[test]
    fn test_null_track_means_default() {
        let request: ActionRequest =
            serde_json::from_value(json!({"action": "list_presets", "track": null})).unwrap();
        assert_eq!(request, ActionRequest::list_presets());
    }

    #[test]
    fn test_failure_result_omits_success_fields() {
        let result = ActionResult::failure(FailureKind::Host, "out_of_range");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "error": "out_of_range", "kind": "host"})
        );
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::parse("delete_everything"), None);
    }
}

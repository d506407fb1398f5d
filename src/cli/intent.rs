//! Keyword mapping from plain-language requests to actions.
//!
//! Deliberately small: a stand-in for a real intent classifier, which only
//! has to produce an `ActionRequest`.

use crate::actions::{ActionKind, ActionRequest, ActionResult, PresetCategory};

/// Filter cutoff on Surge's default patch layout
const FILTER_CUTOFF_PARAMETER: i64 = 10;
const BRIGHT_CUTOFF_VALUE: f64 = 0.8;

/// Map a request like "give me a deep bass sound" onto an action
pub fn parse_intent(text: &str) -> Option<ActionRequest> {
    let text = text.to_lowercase();

    if text.contains("bass sound") || text.contains("deep bass") {
        Some(ActionRequest::load_category(PresetCategory::Bass).on_track(0))
    } else if text.contains("warm pad") {
        Some(ActionRequest::load_preset("WarmPad").on_track(0))
    } else if text.contains("brighten") || text.contains("filter") {
        Some(ActionRequest::set_parameter(
            FILTER_CUTOFF_PARAMETER,
            BRIGHT_CUTOFF_VALUE,
        ))
    } else if text.contains("list presets") || text.contains("which presets") {
        Some(ActionRequest::list_presets())
    } else {
        None
    }
}

/// Conversational reply for a dispatched intent
pub fn describe_outcome(request: &ActionRequest, result: &ActionResult) -> String {
    if !result.success {
        return format!(
            "I encountered an issue: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    match request.kind {
        ActionKind::LoadPreset => "I've loaded the preset as requested.".to_string(),
        ActionKind::SetParameter | ActionKind::Morph => {
            "I've adjusted the parameter as requested.".to_string()
        }
        ActionKind::ListPresets => format!(
            "Available presets: {}",
            result.data.as_deref().unwrap_or_default()
        ),
    }
}

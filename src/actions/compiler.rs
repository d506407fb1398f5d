//! Builds ReaScript (Lua) payloads from validated requests.
//!
//! Templates are trusted text. Values reach them only through typed slots:
//! integers and floats are formatted by Rust, enumerations come from their
//! closed sets, and free text (preset names, configured script paths) is
//! emitted as an escaped Lua string literal. Every payload is wrapped so
//! the host prints exactly one `OK[:payload]` or `ERROR[:reason]` line,
//! even when the Lua body raises.

use std::fmt::Write as _;

use super::types::{ActionKind, ActionRequest, PresetCategory};
use super::Field;
use crate::constants::{DEFAULT_CLIENT_SCRIPT, DEFAULT_INTEGRATION_SCRIPT, DEFAULT_MORPH_STEPS};
use crate::utils::{BridgeError, Result};

/// Reply shape the host is expected to produce for a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseGrammar {
    /// One line: `OK`, `OK:<payload>`, `ERROR` or `ERROR:<reason>`
    StatusLine,
}

/// Host-native payload for a single dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCommand {
    pub action: ActionKind,
    pub script: String,
    pub grammar: ResponseGrammar,
}

/// Tunables and host script locations, relative to REAPER's resource path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub morph_steps: u32,
    pub integration_script: String,
    pub client_script: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            morph_steps: DEFAULT_MORPH_STEPS,
            integration_script: DEFAULT_INTEGRATION_SCRIPT.to_string(),
            client_script: DEFAULT_CLIENT_SCRIPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandCompiler {
    options: CompilerOptions,
}

impl CommandCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a validated request. Pure: the same request always yields the same script.
    pub fn compile(&self, request: &ActionRequest) -> Result<CompiledCommand> {
        let body = match request.kind {
            ActionKind::LoadPreset => {
                let track = track_slot(request)?;
                // An explicit name beats a category search
                match (&request.preset, request.category) {
                    (Some(preset), _) => self.load_named(preset, track),
                    (None, Some(category)) => self.load_category(category, track),
                    (None, None) => {
                        return Err(missing(request.kind, Field::Preset));
                    }
                }
            }
            ActionKind::SetParameter => {
                let parameter = require(request.kind, Field::Parameter, request.parameter)?;
                let value = require(request.kind, Field::Value, request.value)?;
                self.set_parameter(parameter, value)
            }
            ActionKind::ListPresets => self.list_presets(),
            ActionKind::Morph => {
                let parameter = require(request.kind, Field::Parameter, request.parameter)?;
                let target = require(request.kind, Field::Value, request.value)?;
                let steps = match request.steps {
                    Some(steps) => steps,
                    None => i64::from(self.options.morph_steps),
                };
                // Covers the configured default, which never passes through validation
                Field::Steps
                    .check_integer(steps)
                    .map_err(|e| BridgeError::Compile(e.to_string()))?;
                self.morph(parameter, target, steps)
            }
        };

        Ok(CompiledCommand {
            action: request.kind,
            script: wrap(request.kind, &body),
            grammar: ResponseGrammar::StatusLine,
        })
    }

    fn load_named(&self, preset: &str, track: i64) -> String {
        format!(
            "{load}\n\
             local result = ai.loadPreset({preset}, {track})\n\
             if result.success then return \"OK:\" .. tostring(result.preset or \"\") end\n\
             return \"ERROR:\" .. tostring(result.error or \"load_preset failed\")",
            load = self.require_integration(),
            preset = lua_string(preset),
            track = track,
        )
    }

    fn load_category(&self, category: PresetCategory, track: i64) -> String {
        format!(
            "{load}\n\
             local result = ai.processAICommand({{\n\
             \x20 action = \"load_preset\",\n\
             \x20 category = {category},\n\
             \x20 track = {track}\n\
             }})\n\
             if result.success then return \"OK\" end\n\
             return \"ERROR:\" .. tostring(result.error or \"load_preset failed\")",
            load = self.require_integration(),
            category = lua_string(category.as_str()),
            track = track,
        )
    }

    fn set_parameter(&self, parameter: i64, value: f64) -> String {
        format!(
            "{connect}\n\
             local result = surge:setParameter({parameter}, {value})\n\
             if result.status == \"ok\" then return \"OK\" end\n\
             return \"ERROR:\" .. tostring(result.error or result.status)",
            connect = self.connect_client(),
            parameter = parameter,
            value = value,
        )
    }

    fn list_presets(&self) -> String {
        format!(
            "{connect}\n\
             local result = surge:getPresetList()\n\
             if result.status == \"ok\" then return \"OK:\" .. table.concat(result.presets, \",\") end\n\
             return \"ERROR:\" .. tostring(result.error or result.status)",
            connect = self.connect_client(),
        )
    }

    fn morph(&self, parameter: i64, target: f64, steps: i64) -> String {
        format!(
            "{load}\n\
             local result = ai.processAICommand({{\n\
             \x20 action = \"morph_parameter\",\n\
             \x20 param = {parameter},\n\
             \x20 target = {target},\n\
             \x20 steps = {steps}\n\
             }})\n\
             if result.success then return \"OK\" end\n\
             return \"ERROR:\" .. tostring(result.error or \"morph failed\")",
            load = self.require_integration(),
            parameter = parameter,
            target = target,
            steps = steps,
        )
    }

    fn require_integration(&self) -> String {
        format!(
            "local ai = dofile(reaper.GetResourcePath() .. \"/\" .. {})",
            lua_string(&self.options.integration_script)
        )
    }

    fn connect_client(&self) -> String {
        format!(
            "local SurgeClient = dofile(reaper.GetResourcePath() .. \"/\" .. {})\n\
             local surge = SurgeClient:new()",
            lua_string(&self.options.client_script)
        )
    }
}

/// Wrap a body that returns a status string so the chunk always prints one line
fn wrap(kind: ActionKind, body: &str) -> String {
    let mut script = String::new();
    let _ = writeln!(script, "-- surge_control: {}", kind);
    script.push_str("local function run()\n");
    for line in body.lines() {
        let _ = writeln!(script, "  {}", line);
    }
    script.push_str(
        "end\n\
         local ok, reply = pcall(run)\n\
         if not ok then reply = \"ERROR:\" .. tostring(reply) end\n\
         reply = (tostring(reply):gsub(\"[\\r\\n]+\", \" \"))\n\
         if print then print(reply) end\n\
         return reply\n",
    );
    script
}

/// Quote text as a double-quoted Lua string literal
pub(crate) fn lua_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(quoted, "\\{:03}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn track_slot(request: &ActionRequest) -> Result<i64> {
    if request.track < 0 {
        return Err(BridgeError::Compile(format!(
            "negative track {} reached the compiler",
            request.track
        )));
    }
    Ok(request.track)
}

fn require<T>(kind: ActionKind, field: Field, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| missing(kind, field))
}

fn missing(kind: ActionKind, field: Field) -> BridgeError {
    BridgeError::Compile(format!("{} has no {} after validation", kind, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(request: &ActionRequest) -> String {
        CommandCompiler::default().compile(request).unwrap().script
    }

    #[test]
    fn test_compile_is_deterministic() {
        let compiler = CommandCompiler::default();
        let request = ActionRequest::morph(5, 0.25);
        assert_eq!(
            compiler.compile(&request).unwrap(),
            compiler.compile(&request).unwrap()
        );
    }

    #[test]
    fn test_named_preset_beats_category() {
        let mut request = ActionRequest::load_preset("WarmPad").on_track(0);
        request.category = Some(PresetCategory::Bass);

        let script = compile(&request);
        assert!(script.contains("ai.loadPreset(\"WarmPad\", 0)"));
        assert!(!script.contains("processAICommand"));
        assert!(!script.contains("bass"));
    }

    #[test]
    fn test_category_search_path() {
        let request = ActionRequest::load_category(PresetCategory::Bass).on_track(2);
        let script = compile(&request);
        assert!(script.contains("ai.processAICommand({"));
        assert!(script.contains("category = \"bass\","));
        assert!(script.contains("track = 2"));
        assert!(!script.contains("loadPreset"));
    }

    #[test]
    fn test_set_parameter_payload() {
        let script = compile(&ActionRequest::set_parameter(10, 0.8));
        assert!(script.contains("local surge = SurgeClient:new()"));
        assert!(script.contains("surge:setParameter(10, 0.8)"));
        assert!(script.contains("Scripts/surge_tcp_client.lua"));
    }

    #[test]
    fn test_morph_uses_default_steps() {
        let script = compile(&ActionRequest::morph(5, 1.0));
        assert!(script.contains("action = \"morph_parameter\","));
        assert!(script.contains("param = 5,"));
        assert!(script.contains("target = 1,"));
        assert!(script.contains("steps = 20"));
    }

    #[test]
    fn test_morph_steps_override_and_option() {
        let mut request = ActionRequest::morph(5, 0.5);
        request.steps = Some(64);
        assert!(compile(&request).contains("steps = 64"));

        let compiler = CommandCompiler::new(CompilerOptions {
            morph_steps: 8,
            ..CompilerOptions::default()
        });
        let script = compiler.compile(&ActionRequest::morph(5, 0.5)).unwrap().script;
        assert!(script.contains("steps = 8"));
    }

    #[test]
    fn test_out_of_range_default_steps_is_compile_error() {
        let compiler = CommandCompiler::new(CompilerOptions {
            morph_steps: 0,
            ..CompilerOptions::default()
        });
        let err = compiler.compile(&ActionRequest::morph(5, 1.0)).unwrap_err();
        assert!(matches!(err, BridgeError::Compile(_)));
        assert!(err.to_string().contains("steps"));

        // An explicit in-range override still compiles
        let mut request = ActionRequest::morph(5, 1.0);
        request.steps = Some(10);
        assert!(compiler.compile(&request).is_ok());
    }

    #[test]
    fn test_list_presets_replies_with_ok_payload() {
        let script = compile(&ActionRequest::list_presets());
        assert!(script.contains("surge:getPresetList()"));
        assert!(script.contains("return \"OK:\" .. table.concat(result.presets, \",\")"));
    }

    #[test]
    fn test_every_payload_is_guarded() {
        for request in [
            ActionRequest::load_preset("WarmPad"),
            ActionRequest::load_category(PresetCategory::Lead),
            ActionRequest::set_parameter(1, 0.0),
            ActionRequest::list_presets(),
            ActionRequest::morph(1, 0.5),
        ] {
            let script = compile(&request);
            assert!(script.starts_with(&format!("-- surge_control: {}\n", request.kind)));
            assert!(script.contains("local ok, reply = pcall(run)"));
            assert!(script.ends_with("return reply\n"));
        }
    }

    #[test]
    fn test_preset_name_cannot_break_out_of_string() {
        let hostile = "x\") os.execute(\"rm -rf ~\") --";
        let script = compile(&ActionRequest::load_preset(hostile));
        assert!(script.contains(r#"ai.loadPreset("x\") os.execute(\"rm -rf ~\") --", 0)"#));
        assert!(!script.contains("\") os.execute(\"rm"));
    }

    #[test]
    fn test_lua_string_escapes() {
        assert_eq!(lua_string("plain"), "\"plain\"");
        assert_eq!(lua_string("a\\b\"c"), "\"a\\\\b\\\"c\"");
        assert_eq!(lua_string("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(lua_string("bell\u{7}"), "\"bell\\007\"");
        assert_eq!(lua_string("Größe"), "\"Größe\"");
    }

    #[test]
    fn test_missing_fields_are_compile_errors() {
        let mut request = ActionRequest::set_parameter(3, 0.5);
        request.value = None;
        let err = CommandCompiler::default().compile(&request).unwrap_err();
        assert!(matches!(err, BridgeError::Compile(_)));

        let request = ActionRequest::list_presets().on_track(-1);
        // list_presets ignores track, so this compiles
        assert!(CommandCompiler::default().compile(&request).is_ok());

        let request = ActionRequest::load_preset("WarmPad").on_track(-1);
        let err = CommandCompiler::default().compile(&request).unwrap_err();
        assert!(matches!(err, BridgeError::Compile(_)));
    }
}

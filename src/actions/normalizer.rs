use tracing::debug;

use super::compiler::{CompiledCommand, ResponseGrammar};
use super::types::{ActionResult, FailureKind};
use crate::constants::{GENERIC_FAILURE, REPLY_ERROR, REPLY_OK};

/// A parsed status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostReply {
    Ok(String),
    Error(Option<String>),
    Unrecognized,
}

/// Parse the first non-empty line of host output.
///
/// `OK` and `ERROR` match case-sensitively and only as a whole word or
/// followed by `:`; `OKAY` is unrecognized.
pub fn parse_status_line(text: &str) -> HostReply {
    let Some(line) = text.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return HostReply::Unrecognized;
    };

    if let Some(rest) = strip_status(line, REPLY_OK) {
        return HostReply::Ok(rest.to_string());
    }
    if let Some(rest) = strip_status(line, REPLY_ERROR) {
        let reason = Some(rest).filter(|r| !r.is_empty()).map(str::to_string);
        return HostReply::Error(reason);
    }
    HostReply::Unrecognized
}

fn strip_status<'a>(line: &'a str, status: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(status)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix(':')
    }
}

/// Turn raw host output into an `ActionResult`. Never fails; unexpected text is a failure result.
pub fn normalize(text: &str) -> ActionResult {
    match parse_status_line(text) {
        HostReply::Ok(payload) => ActionResult::success("Host reported success", payload),
        HostReply::Error(reason) => ActionResult::failure(
            FailureKind::Host,
            reason.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        ),
        HostReply::Unrecognized => {
            debug!("Unrecognized host reply: {:?}", text);
            ActionResult::failure(FailureKind::Host, GENERIC_FAILURE)
        }
    }
}

/// Normalize a reply using the grammar declared by the compiled command
pub fn normalize_reply(command: &CompiledCommand, text: &str) -> ActionResult {
    match command.grammar {
        ResponseGrammar::StatusLine => {
            let mut result = normalize(text);
            if result.success {
                result.message = Some(format!("Successfully executed {}", command.action));
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionKind, ActionRequest, CommandCompiler};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ok_with_and_without_payload() {
        let result = normalize("OK:payload");
        assert!(result.success);
        assert_eq!(result.data.as_deref(), Some("payload"));
        assert_eq!(result.error, None);

        let result = normalize("OK");
        assert!(result.success);
        assert_eq!(result.data.as_deref(), Some(""));
    }

    #[test]
    fn test_payload_keeps_inner_colons() {
        assert_eq!(
            parse_status_line("OK:Init Saw,Pads: Warm,Lead 1\n"),
            HostReply::Ok("Init Saw,Pads: Warm,Lead 1".to_string())
        );
    }

    #[test]
    fn test_error_with_reason() {
        let result = normalize("ERROR:out_of_range");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("out_of_range"));
        assert_eq!(result.kind, Some(FailureKind::Host));
        assert_eq!(result.message, None);
        assert_eq!(result.data, None);
    }

    #[test]
    fn test_bare_error_and_garbage_get_generic_message() {
        for text in ["ERROR", "ERROR:", "", "   \n", "okay", "OKAY", "Ok:lowercase", "segfault"] {
            let result = normalize(text);
            assert!(!result.success, "{:?} should fail", text);
            assert_eq!(result.error.as_deref(), Some(GENERIC_FAILURE));
        }
    }

    #[test]
    fn test_first_non_empty_line_decides() {
        assert_eq!(parse_status_line("\r\nOK:1\r\nERROR:2\r\n"), HostReply::Ok("1".into()));
        assert_eq!(
            parse_status_line("\nERROR:busy\nOK"),
            HostReply::Error(Some("busy".into()))
        );
    }

    #[test]
    fn test_normalize_reply_names_action() {
        let command = CommandCompiler::default()
            .compile(&ActionRequest::set_parameter(10, 0.8))
            .unwrap();
        assert_eq!(command.action, ActionKind::SetParameter);

        let result = normalize_reply(&command, "OK\n");
        assert_eq!(result, ActionResult::success("Successfully executed set_parameter", ""));
    }
}

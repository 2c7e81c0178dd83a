//! Response sanitizing.
//!
//! Models served through Groq occasionally print a tool call as text
//! (`<function=duckduckgo_search{...}</function>`) instead of emitting a
//! structured call. Those lines are dropped; an answer that is empty after
//! filtering is replaced by the stage's placeholder document.

use super::{DegradeReason, Stage, StageOutcome, prompts};
use crate::constants::pipeline::TOOL_ECHO_MARKER;
use crate::types::CompanyName;

/// Line boundaries: `\r\n` plus every single-character break below
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split on every line boundary. A trailing boundary does not start an
/// extra empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(&LINE_BREAKS[..]) {
        lines.push(&rest[..pos]);
        let tail = &rest[pos..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[width..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Remove tool-call echo lines, keeping every other line in order
pub fn strip_tool_echoes(raw: &str) -> String {
    split_lines(raw)
        .into_iter()
        .filter(|line| !line.starts_with(TOOL_ECHO_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sanitize and tag: `Success` with the filtered text, or `Degraded`
/// carrying the stage's placeholder when nothing usable remains.
pub fn sanitize_outcome(raw: &str, company: &CompanyName, stage: Stage) -> StageOutcome {
    let clean = strip_tool_echoes(raw);
    if clean.trim().is_empty() {
        StageOutcome::Degraded {
            reason: DegradeReason::EmptyOutput,
            text: prompts::empty_document(stage, company),
        }
    } else {
        StageOutcome::Success { text: clean }
    }
}

/// Sanitized text; never empty
pub fn sanitize(raw: &str, company: &CompanyName, stage: Stage) -> String {
    sanitize_outcome(raw, company, stage).into_text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn acme() -> CompanyName {
        CompanyName::parse("Acme Corp").unwrap()
    }

    #[test]
    fn test_strips_echo_lines() {
        let raw = "**Overview**\n<function=duckduckgo_search{\"query\": \"Acme\"}</function>\nAcme makes anvils.";
        assert_eq!(
            sanitize(raw, &acme(), Stage::Research),
            "**Overview**\nAcme makes anvils."
        );
    }

    #[test]
    fn test_indented_marker_is_kept() {
        // Only lines that begin with the marker are echoes
        let raw = "  <function=duckduckgo_search>";
        assert_eq!(sanitize(raw, &acme(), Stage::UseCases), raw);
    }

    #[test]
    fn test_crlf_input_normalized() {
        let raw = "line one\r\n<function=duckduckgo_search{}\r\nline two";
        assert_eq!(strip_tool_echoes(raw), "line one\nline two");
    }

    #[test]
    fn test_lone_carriage_return_separates_lines() {
        let raw = "intro\r<function=duckduckgo_search{}\u{2028}outro\x0cend\n";
        assert_eq!(strip_tool_echoes(raw), "intro\noutro\nend");
    }

    #[test]
    fn test_split_lines_boundaries() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\r\nb\r\rc"), vec!["a", "b", "", "c"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
        assert_eq!(split_lines("\u{85}x"), vec!["", "x"]);
    }

    #[test]
    fn test_empty_input_uses_fallback() {
        let outcome = sanitize_outcome("", &acme(), Stage::Research);
        assert!(outcome.is_degraded());
        assert!(
            outcome
                .text()
                .starts_with("**Overview**\nNo research data found for Acme Corp.")
        );
    }

    #[test]
    fn test_only_echoes_uses_fallback() {
        let raw = "<function=duckduckgo_search{\"query\": \"a\"}</function>\n   \n";
        let outcome = sanitize_outcome(raw, &acme(), Stage::Resources);
        assert!(matches!(
            outcome,
            StageOutcome::Degraded {
                reason: DegradeReason::EmptyOutput,
                ..
            }
        ));
        assert!(outcome.text().starts_with("**Resources for AI Use Cases**"));
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9 *#.-]{0,20}",
            "[a-z ]{0,10}".prop_map(|s| format!("{}{}", TOOL_ECHO_MARKER, s)),
            Just(String::new()),
            Just("   ".to_string()),
        ]
    }

    fn stage_strategy() -> impl Strategy<Value = Stage> {
        prop_oneof![
            Just(Stage::Research),
            Just(Stage::UseCases),
            Just(Stage::Resources)
        ]
    }

    proptest! {
        #[test]
        fn prop_never_blank(lines in prop::collection::vec(line_strategy(), 0..12), stage in stage_strategy()) {
            let raw = lines.join("\n");
            let out = sanitize(&raw, &acme(), stage);
            prop_assert!(!out.trim().is_empty());
        }

        #[test]
        fn prop_echoes_removed_and_order_kept(lines in prop::collection::vec(line_strategy(), 1..12)) {
            let raw = lines.join("\n");
            let out = strip_tool_echoes(&raw);

            let expected: Vec<&str> = split_lines(&raw)
                .into_iter()
                .filter(|l| !l.starts_with(TOOL_ECHO_MARKER))
                .collect();
            let actual: Vec<&str> = out.lines().collect();

            prop_assert!(actual.iter().all(|l| !l.starts_with(TOOL_ECHO_MARKER)));
            // A trailing empty line is dropped, so compare trimmed ends
            let expected_joined = expected.join("\n");
            prop_assert_eq!(out.trim_end_matches('\n'), expected_joined.trim_end_matches('\n'));
            prop_assert!(actual.len() <= expected.len());
        }
    }
}

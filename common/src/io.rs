use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::{RESULT_PREFIX, RUN_OUTPUT_TAIL},
    scoring::MatchResult,
};

// ============================================================================
// Result Line
// ============================================================================

// The single stdout line a finished game process writes
pub fn format_result_line(result: &MatchResult) -> serde_json::Result<String> {
    Ok(format!("{RESULT_PREFIX} {}", serde_json::to_string(result)?))
}

// Payload of the first `RESULT:` line, trimmed. Everything else on stdout is noise.
#[must_use]
pub fn find_result_line(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(RESULT_PREFIX))
        .map(str::trim)
}

// ============================================================================
// Run Report
// ============================================================================

// How a runner sees one finished (or killed) game process. Serializes to
// `{"ok":true,"result":...}` or `{"ok":false,"error":...,"stdout":...,"stderr":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returncode: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl RunReport {
    #[must_use]
    pub const fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
            returncode: None,
            raw: None,
            stdout: None,
            stderr: None,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>, stdout: &str, stderr: &str) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
            returncode: None,
            raw: None,
            stdout: Some(tail(stdout, RUN_OUTPUT_TAIL).to_string()),
            stderr: Some(tail(stderr, RUN_OUTPUT_TAIL).to_string()),
        }
    }

    // The result decoded as a match result, when the run succeeded with one
    #[must_use]
    pub fn match_result(&self) -> Option<MatchResult> {
        self.result.clone().and_then(|value| serde_json::from_value(value).ok())
    }
}

// Last `max_chars` characters of `text`
fn tail(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let skip = count - max_chars;
    text.char_indices().nth(skip).map_or("", |(start, _)| &text[start..])
}

// Classify a finished game process. `exit_code` is `None` when the process was killed
// (timeout) and never reported a status.
#[must_use]
pub fn parse_run_output(exit_code: Option<i32>, stdout: &str, stderr: &str) -> RunReport {
    let Some(code) = exit_code else {
        return RunReport::failure("Game process timed out", stdout, stderr);
    };
    if code != 0 {
        return RunReport {
            returncode: Some(code),
            ..RunReport::failure("Game process failed", stdout, stderr)
        };
    }

    let Some(line) = find_result_line(stdout).filter(|line| !line.is_empty()) else {
        return RunReport::failure("Missing RESULT line in stdout", stdout, stderr);
    };

    match serde_json::from_str::<Value>(line) {
        Ok(payload) => RunReport::success(payload),
        Err(err) => RunReport {
            raw: Some(line.to_string()),
            ..RunReport::failure(format!("Invalid RESULT JSON: {err}"), stdout, stderr)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ResultMeta;

    fn sample() -> MatchResult {
        MatchResult {
            scores: [100, 100, 25, 0],
            winner: 0,
            team_scores: [200, 50],
            meta: ResultMeta {
                mode: "jam".to_string(),
                finished: 3,
                team_game: true,
                level: "The Maze".to_string(),
                ticks: 4321,
            },
        }
    }

    #[test]
    fn test_result_line_survives_log_noise() {
        let line = format_result_line(&sample()).expect("serializable");
        assert!(line.starts_with("RESULT: {"));

        let stdout = format!("loading level\n{line}\nbye\n");
        let report = parse_run_output(Some(0), &stdout, "");
        assert!(report.ok);
        assert_eq!(report.match_result(), Some(sample()));

        let json = serde_json::to_value(&report).expect("serializable");
        assert_eq!(json["ok"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failures_are_classified() {
        let timeout = parse_run_output(None, "partial", "");
        assert!(!timeout.ok);
        assert_eq!(timeout.error.as_deref(), Some("Game process timed out"));

        let crashed = parse_run_output(Some(101), "RESULT: {}", "panicked");
        assert_eq!(crashed.returncode, Some(101));
        assert_eq!(crashed.stderr.as_deref(), Some("panicked"));

        let missing = parse_run_output(Some(0), "no result here", "");
        assert_eq!(missing.error.as_deref(), Some("Missing RESULT line in stdout"));

        let garbled = parse_run_output(Some(0), "RESULT: {scores", "");
        assert!(garbled.error.as_deref().is_some_and(|e| e.starts_with("Invalid RESULT JSON")));
        assert_eq!(garbled.raw.as_deref(), Some("{scores"));
    }

    #[test]
    fn test_output_tails_are_bounded() {
        let noisy = "é".repeat(RUN_OUTPUT_TAIL + 10);
        let report = parse_run_output(Some(1), &noisy, "short");
        assert_eq!(report.stdout.as_deref().map(|s| s.chars().count()), Some(RUN_OUTPUT_TAIL));
        assert_eq!(report.stderr.as_deref(), Some("short"));
    }
}

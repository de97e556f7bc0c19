//! JSON support for match results.
//!
//! Lets recorded matches be stored as fixtures and replayed through the
//! mapper without re-running the pattern. The JSON shape is
//! `{"groups": [{"name": "0", "captures": ["..."]}, ...]}`.

use crate::match_result::MatchResult;

/// Read a match result from a JSON string.
pub fn match_from_json_str(json: &str) -> Result<MatchResult, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid match result JSON: {}", e))
}

/// Read a match result from a `serde_json::Value`.
pub fn match_from_json(value: serde_json::Value) -> Result<MatchResult, String> {
    serde_json::from_value(value).map_err(|e| format!("invalid match result JSON: {}", e))
}

/// Write a match result as a JSON string.
pub fn match_to_json_string(m: &MatchResult, pretty: bool) -> Result<String, String> {
    let result = if pretty {
        serde_json::to_string_pretty(m)
    } else {
        serde_json::to_string(m)
    };
    result.map_err(|e| format!("cannot serialize match result: {}", e))
}

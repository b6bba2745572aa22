use super::StrategyError;

/// Top-level sections a strategy document is expected to carry.
pub const STRATEGY_SECTIONS: &[&str] = &["scenarios", "risk_assessment", "recommended_actions"];

/// Strip one surrounding Markdown code fence, if present.
///
/// Handles ```` ``` ```` and ```` ```json ```` (any info string) on the opening
/// line. Text without an opening fence is returned trimmed and otherwise
/// untouched. A missing closing fence is tolerated since replies can be cut
/// off at the token limit.
pub fn unwrap_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(after_ticks) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. `json`) up to the end of the opening line.
    let body = match after_ticks.find('\n') {
        Some(idx) => &after_ticks[idx + 1..],
        None => after_ticks
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Unwrap the optional code fence, then strictly parse the rest as JSON.
pub fn parse_strategy_reply(reply: &str) -> Result<serde_json::Value, StrategyError> {
    let body = unwrap_code_fence(reply);
    if body.is_empty() {
        return Err(StrategyError::JsonParsing("empty reply".into()));
    }
    serde_json::from_str(body).map_err(|e| StrategyError::JsonParsing(e.to_string()))
}

/// Expected sections missing from (or not arrays in) a parsed strategy.
pub fn missing_sections(strategy: &serde_json::Value) -> Vec<&'static str> {
    STRATEGY_SECTIONS
        .iter()
        .copied()
        .filter(|section| !strategy.get(*section).is_some_and(|v| v.is_array()))
        .collect()
}

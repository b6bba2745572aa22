//! Fixed instruction template for strategy generation.
//!
//! The dashboard renders the reply directly, so the JSON keys and the
//! scenario/severity vocabulary below are part of the client contract.

const STRATEGY_PREAMBLE: &str = "\
You are a senior risk analyst advising an investment portfolio team. \
Below is a structured analysis report produced from a regulatory or \
geopolitical document.

ANALYSIS REPORT:
";

const STRATEGY_INSTRUCTIONS: &str = r#"

Using only the report above, produce a strategy with exactly three parts:

1. "scenarios": two narrative scenarios, one with "type": "optimiste" and one
   with "type": "pessimiste". Each has a "description" and an
   "impact_portefeuille" describing the effect on the portfolio.
2. "risk_assessment": one entry per risk domain (for example regulatory,
   supply chain, market, geopolitical). Each has "domaine", "niveau" (one of
   "faible", "modéré", "élevé"), "secteurs_affectes" and
   "zones_geographiques".
3. "recommended_actions": one entry per group of affected entities. Each has
   "entreprises_concernees" and "actions_proposees".

Respond with a single JSON object and nothing else, in this shape:
{
  "scenarios": [{"type": "...", "description": "...", "impact_portefeuille": "..."}],
  "risk_assessment": [{"domaine": "...", "niveau": "...", "secteurs_affectes": "...", "zones_geographiques": "..."}],
  "recommended_actions": [{"entreprises_concernees": "...", "actions_proposees": "..."}]
}"#;

/// Embed the report verbatim (pretty-printed JSON) into the instruction template.
pub fn build_strategy_prompt(report: &serde_json::Value) -> String {
    let report_json =
        serde_json::to_string_pretty(report).unwrap_or_else(|_| report.to_string());

    let mut prompt =
        String::with_capacity(STRATEGY_PREAMBLE.len() + report_json.len() + STRATEGY_INSTRUCTIONS.len());
    prompt.push_str(STRATEGY_PREAMBLE);
    prompt.push_str(&report_json);
    prompt.push_str(STRATEGY_INSTRUCTIONS);
    prompt
}

use log::{debug, warn};
use serde_json::{Value, json};
use strum::IntoEnumIterator;

use crate::{
    LLM_CONTRACT_ATTEMPTS_DEFAULT,
    error::{StkvalError, StkvalResult},
    fundamentals::FundamentalsRecord,
    llm::{self, ChatCompletionOptions, ChatMessage, Role},
    scenario::{ScenarioAssumptions, ScenarioKey},
    utils,
};

/// Literal line separating the narrative report from the scenario JSON in
/// the model response
pub static SCENARIO_JSON_MARKER: &str = "SCENARIO_JSON_START";

static LLM_SYSTEM: &str = "You are an equity analyst.";

/// Narrative report plus the scenario assumptions suggested by the model
#[derive(Debug)]
pub struct InvestmentSummary {
    pub report: String,
    pub assumptions: ScenarioAssumptions,
}

/// Ask the model for an investment summary. The textual contract (marker
/// line + strict JSON) is re-requested up to the bounded attempt count
/// when the response violates it; transport errors are not retried.
pub async fn generate(
    cfg: &llm::Config,
    record: &FundamentalsRecord,
    assumptions: &ScenarioAssumptions,
) -> StkvalResult<InvestmentSummary> {
    let prompt = build_prompt(record, assumptions);
    debug!("[Summary prompt] {prompt}");

    let messages: Vec<ChatMessage> = vec![
        ChatMessage {
            role: Role::System,
            content: LLM_SYSTEM.to_string(),
            reasoning: None,
        },
        ChatMessage {
            role: Role::User,
            content: prompt,
            reasoning: None,
        },
    ];

    let mut last_err = None;
    for attempt in 1..=LLM_CONTRACT_ATTEMPTS_DEFAULT {
        let bot_message =
            llm::chat_completion(cfg, &messages, &ChatCompletionOptions::default()).await?;
        debug!("[Summary LLM] {bot_message:?}");

        match split_report(&bot_message.content) {
            Ok(summary) => return Ok(summary),
            Err(err) => {
                warn!("Model response violated the scenario contract (attempt {attempt}): {err}");
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or(StkvalError::Invalid(
        "LLM_CONTRACT",
        "Model returned no usable response".to_string(),
    )))
}

/// Split a model response at the marker line into the verbatim report and
/// the parsed scenario assumptions. Code fences around the JSON are
/// stripped before parsing; a missing marker or unparsable JSON fails.
pub fn split_report(text: &str) -> StkvalResult<InvestmentSummary> {
    let Some((report, json_part)) = text.split_once(SCENARIO_JSON_MARKER) else {
        return Err(StkvalError::Invalid(
            "LLM_CONTRACT",
            format!("Marker '{SCENARIO_JSON_MARKER}' not found in model output"),
        ));
    };

    let json_str = json_part.trim();
    let json: Value = match serde_json::from_str(json_str) {
        Ok(json) => json,
        Err(_) => serde_json::from_str(&utils::markdown::extract_code_block(json_str))?,
    };

    if !json.is_object() {
        return Err(StkvalError::Invalid(
            "LLM_CONTRACT",
            "Scenario payload is not a JSON object".to_string(),
        ));
    }

    Ok(InvestmentSummary {
        report: report.to_string(),
        assumptions: ScenarioAssumptions::from_json(&json),
    })
}

fn build_prompt(record: &FundamentalsRecord, assumptions: &ScenarioAssumptions) -> String {
    let ticker = &record.ticker;

    let fundamentals_json = serde_json::to_string_pretty(&json!({
        "ticker": ticker.symbol,
        "share_price": record.share_price,
        "shares_outstanding": record.shares_outstanding,
        "market_cap": record.market_cap(),
        "revenue_qtr": record.revenue_qtr,
        "cogs": record.cogs,
        "gross_profit": record.gross_profit(),
        "gross_margin": record.gross_margin(),
        "opex": record.opex,
        "operating_profit": record.operating_profit,
        "operating_margin": record.operating_margin(),
        "ebitda_ps": record.ebitda_per_share(),
        "cash": record.cash,
        "debt": record.debt,
        "net_cash": record.net_cash(),
    }))
    .unwrap_or_default();

    let scenario_slots = ScenarioKey::iter()
        .map(|key| {
            let pair = assumptions.get(key);
            format!(
                "- {} ({}): mid={}, good={}",
                key.label(),
                key,
                pair.mid.map(|v| v.to_string()).unwrap_or("null".to_string()),
                pair.good
                    .map(|v| v.to_string())
                    .unwrap_or("null".to_string()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
Identify the company with ticker {ticker} using your own knowledge, and make
sure the description matches that ticker.

Ticker: {ticker}

FUNDAMENTALS (values in thousands USD, except per-share figures and
percentages as decimal fractions):
{fundamentals_json}

SCENARIO INPUTS (current values, null means unset):
{scenario_slots}

Write a Markdown report with these sections:

### 1. Company snapshot
 (use your own reasoning, do not just repeat the fundamentals)
### 2. Pros
 (use your own reasoning, do not just repeat the fundamentals)
### 3. Cons
 (use your own reasoning, do not just repeat the fundamentals)
### 4. Scenario Suggestions
 (suggest a mid-case and a good-case value for each scenario input, with a
 one-sentence rationale each)

Keep the whole report concise, less than 200 words.

AFTER you finish the report, on a new line write exactly:
{SCENARIO_JSON_MARKER}

On the next line output ONLY a valid JSON object with numeric mid/good
values for each scenario key, with this exact structure (percentages as
decimals, e.g. 0.35 for 35%):

{{
  "expected_rev_cagr_5y": {{ "mid": 0.35, "good": 0.50 }},
  "expected_op_margin": {{ "mid": 0.25, "good": 0.35 }},
  "expected_dilution": {{ "mid": 0.05, "good": 0.10 }},
  "lt_net_debt": {{ "mid": 0, "good": 0 }},
  "interest_rate_debt": {{ "mid": 0.05, "good": 0.06 }},
  "tax_rate": {{ "mid": 0.20, "good": 0.20 }},
  "lt_earning_multiple": {{ "mid": 20, "good": 25 }}
}}

Use your own reasonable values instead of the example above.
Do NOT wrap the JSON in markdown code fences and do NOT add any text after
the JSON.
"#
    )
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::ticker::Ticker;

    fn record() -> FundamentalsRecord {
        let mut record = FundamentalsRecord::new(Ticker::from_str("MSFT").unwrap());
        record.share_price = Some(400.0);
        record.revenue_qtr = Some(60_000_000.0);
        record
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt(&record(), &ScenarioAssumptions::default());

        assert!(prompt.contains("MSFT"));
        assert!(prompt.contains(SCENARIO_JSON_MARKER));
        for key in ScenarioKey::iter() {
            assert!(prompt.contains(&key.to_string()), "missing key {key}");
            assert!(prompt.contains(key.label()), "missing label {}", key.label());
        }
    }

    #[test]
    fn test_split_report() {
        let text = r#"### 1. Company snapshot
A fine company.

SCENARIO_JSON_START
{
  "expected_rev_cagr_5y": { "mid": 0.15, "good": 0.25 },
  "tax_rate": { "mid": 0.21, "good": 0.21 }
}"#;

        let summary = split_report(text).unwrap();
        assert_eq!(
            summary.report,
            "### 1. Company snapshot\nA fine company.\n\n"
        );
        assert_eq!(summary.assumptions.mid(ScenarioKey::RevenueCagr), Some(0.15));
        assert_eq!(summary.assumptions.good(ScenarioKey::TaxRate), Some(0.21));
    }

    #[test]
    fn test_split_report_missing_marker() {
        let result = split_report("No marker here, just text.");
        assert!(matches!(
            result,
            Err(StkvalError::Invalid("LLM_CONTRACT", _))
        ));
    }

    #[test]
    fn test_split_report_repairs_code_fences() {
        let text = r#"Report text.
SCENARIO_JSON_START
```json
{ "lt_earning_multiple": { "mid": 18, "good": 22 } }
```"#;

        let summary = split_report(text).unwrap();
        assert_eq!(
            summary.assumptions.mid(ScenarioKey::EarningMultiple),
            Some(18.0)
        );
    }

    #[test]
    fn test_split_report_invalid_json() {
        let text = "Report.\nSCENARIO_JSON_START\nnot json at all {";
        assert!(split_report(text).is_err());
    }
}

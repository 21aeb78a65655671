use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// The seven scenario assumption slots suggested by the LLM.
///
/// Serialized keys are the JSON field names of the scenario contract,
/// messages are the sheet row labels.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::EnumIter,
    strum::EnumMessage,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ScenarioKey {
    #[strum(message = "Expected Revenue CAGR (5y)", serialize = "expected_rev_cagr_5y")]
    RevenueCagr,

    #[strum(message = "E Operated Margin", serialize = "expected_op_margin")]
    OperatingMargin,

    #[strum(message = "E Dilution (5yr)", serialize = "expected_dilution")]
    Dilution,

    #[strum(message = "LT Net Debt", serialize = "lt_net_debt")]
    LongTermNetDebt,

    #[strum(message = "Interest Rate on Debt", serialize = "interest_rate_debt")]
    InterestRateOnDebt,

    #[strum(message = "Tax Rate", serialize = "tax_rate")]
    TaxRate,

    #[strum(message = "LT Earning Multiple", serialize = "lt_earning_multiple")]
    EarningMultiple,
}

impl ScenarioKey {
    pub fn label(&self) -> &'static str {
        use strum::EnumMessage;
        self.get_message().unwrap_or_default()
    }
}

/// Mid/good value pair for one scenario slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScenarioPair {
    pub mid: Option<f64>,
    pub good: Option<f64>,
}

/// Scenario assumptions keyed by [`ScenarioKey`], absent slots stay null
#[derive(Clone, Debug, Default)]
pub struct ScenarioAssumptions {
    pairs: HashMap<ScenarioKey, ScenarioPair>,
}

impl ScenarioAssumptions {
    pub fn get(&self, key: ScenarioKey) -> ScenarioPair {
        self.pairs.get(&key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: ScenarioKey, pair: ScenarioPair) {
        self.pairs.insert(key, pair);
    }

    /// Read the scenario object of the LLM contract. A missing "good"
    /// value falls back to "mid"; non-numeric values stay null.
    pub fn from_json(json: &Value) -> Self {
        use strum::IntoEnumIterator;

        let mut assumptions = Self::default();

        for key in ScenarioKey::iter() {
            let slot = &json[key.to_string()];
            if slot.is_null() {
                continue;
            }

            let mid = slot["mid"].as_f64();
            let good = slot["good"].as_f64().or(mid);

            assumptions.set(key, ScenarioPair { mid, good });
        }

        assumptions
    }

    pub fn mid(&self, key: ScenarioKey) -> Option<f64> {
        self.get(key).mid
    }

    pub fn good(&self, key: ScenarioKey) -> Option<f64> {
        self.get(key).good
    }
}

/// Inputs of the 5-year scenario projection
#[derive(Clone, Copy, Debug, Default)]
pub struct ScenarioInputs {
    /// Latest quarterly revenue, thousands
    pub revenue_qtr: Option<f64>,
    /// Shares outstanding, thousands
    pub shares_outstanding: Option<f64>,
    /// Expected revenue CAGR over 5 years, decimal fraction
    pub rev_cagr: Option<f64>,
    /// Expected operating margin, decimal fraction
    pub op_margin: Option<f64>,
    /// Tax rate, decimal fraction
    pub tax_rate: Option<f64>,
    /// Share dilution over 5 years, decimal fraction; null is treated as 0
    pub dilution: Option<f64>,
    /// Terminal earnings multiple
    pub multiple: Option<f64>,
}

/// 5-year-forward projection for one case (mid or good)
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ScenarioProjection {
    pub revenue_5y: Option<f64>,
    pub ebit_5y: Option<f64>,
    pub earnings_5y: Option<f64>,
    pub shares_5y: Option<f64>,
    pub eps_5y: Option<f64>,
    pub price_5y: Option<f64>,
    pub price_5y_discounted: Option<f64>,
}

/// The three headline numbers of a run
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ValuationTargets {
    pub current_price: Option<f64>,
    pub mid_target: Option<f64>,
    pub good_target: Option<f64>,
}

// NOTE: the sheet's "Predicted Share Price" row compounds the 5-year price
// by 1.05^5 instead of dividing by it. Kept as-is to stay consistent with
// the valuation template.
fn discount_factor() -> f64 {
    1.05_f64.powi(5)
}

/// Project a 5-year scenario. Any missing required input yields a null
/// projection; a zero diluted share count yields null price and EPS.
pub fn project(inputs: &ScenarioInputs) -> ScenarioProjection {
    let (Some(revenue_qtr), Some(shares_outstanding), Some(rev_cagr), Some(op_margin)) = (
        inputs.revenue_qtr,
        inputs.shares_outstanding,
        inputs.rev_cagr,
        inputs.op_margin,
    ) else {
        return ScenarioProjection::default();
    };

    let (Some(tax_rate), Some(multiple)) = (inputs.tax_rate, inputs.multiple) else {
        return ScenarioProjection::default();
    };

    let annual_revenue = revenue_qtr * 4.0;
    let revenue_5y = annual_revenue * (1.0 + rev_cagr).powi(5);
    let ebit_5y = revenue_5y * op_margin;
    let earnings_5y = ebit_5y * (1.0 - tax_rate);
    let equity_value_5y = earnings_5y * multiple;
    let shares_5y = shares_outstanding * (1.0 + inputs.dilution.unwrap_or(0.0));

    let price_5y = if shares_5y != 0.0 {
        Some(equity_value_5y / shares_5y)
    } else {
        None
    };
    let price_5y_discounted = price_5y.map(|p| p * discount_factor());
    let eps_5y = if shares_5y != 0.0 {
        Some(earnings_5y / shares_5y)
    } else {
        None
    };

    ScenarioProjection {
        revenue_5y: Some(revenue_5y),
        ebit_5y: Some(ebit_5y),
        earnings_5y: Some(earnings_5y),
        shares_5y: Some(shares_5y),
        eps_5y,
        price_5y,
        price_5y_discounted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64, tolerance: f64) {
        let actual = actual.expect("value should be present");
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    fn inputs() -> ScenarioInputs {
        ScenarioInputs {
            revenue_qtr: Some(1_000.0),
            shares_outstanding: Some(100.0),
            rev_cagr: Some(0.20),
            op_margin: Some(0.25),
            tax_rate: Some(0.21),
            dilution: Some(0.05),
            multiple: Some(20.0),
        }
    }

    #[test]
    fn test_projection_fixture() {
        let projection = project(&inputs());

        assert_close(projection.revenue_5y, 9_953.28, 0.01);
        assert_close(projection.ebit_5y, 2_488.32, 0.01);
        assert_close(projection.earnings_5y, 1_965.77, 0.01);
        assert_close(projection.shares_5y, 105.0, 1e-9);
        assert_close(projection.price_5y, 374.43, 0.01);
        // 477.92 is quoted from 2-decimal rounded intermediates
        // (374.43 * 1.2763), the exact product is 477.8818...
        assert_close(projection.price_5y_discounted, 477.92, 0.05);
        assert_close(projection.eps_5y, 1_965.77 / 105.0, 0.01);
    }

    #[test]
    fn test_projection_formula_exactness() {
        let projection = project(&inputs());

        let expected = (1_000.0 * 4.0 * 1.2_f64.powi(5) * 0.25 * (1.0 - 0.21) * 20.0)
            / (100.0 * 1.05)
            * 1.05_f64.powi(5);
        assert_close(projection.price_5y_discounted, expected, 1e-9);
    }

    #[test]
    fn test_projection_zero_shares() {
        let mut inputs = inputs();
        inputs.shares_outstanding = Some(0.0);

        let projection = project(&inputs);
        assert!(projection.revenue_5y.is_some());
        assert_eq!(projection.price_5y, None);
        assert_eq!(projection.price_5y_discounted, None);
        assert_eq!(projection.eps_5y, None);
    }

    #[test]
    fn test_projection_missing_input() {
        let mut inputs = inputs();
        inputs.rev_cagr = None;

        let projection = project(&inputs);
        assert_eq!(projection.revenue_5y, None);
        assert_eq!(projection.price_5y_discounted, None);
    }

    #[test]
    fn test_projection_missing_dilution_defaults_to_zero() {
        let mut inputs = inputs();
        inputs.dilution = None;

        let projection = project(&inputs);
        assert_close(projection.shares_5y, 100.0, 1e-9);
    }

    #[test]
    fn test_assumptions_from_json() {
        let json: Value = serde_json::from_str(
            r#"
{
    "expected_rev_cagr_5y": { "mid": 0.35, "good": 0.50 },
    "tax_rate": { "mid": 0.20 },
    "lt_earning_multiple": { "mid": "twenty", "good": 25 }
}
"#,
        )
        .unwrap();

        let assumptions = ScenarioAssumptions::from_json(&json);

        assert_eq!(assumptions.mid(ScenarioKey::RevenueCagr), Some(0.35));
        assert_eq!(assumptions.good(ScenarioKey::RevenueCagr), Some(0.50));

        // missing "good" falls back to "mid"
        assert_eq!(assumptions.good(ScenarioKey::TaxRate), Some(0.20));

        // non-numeric mid stays null, numeric good survives
        assert_eq!(assumptions.mid(ScenarioKey::EarningMultiple), None);
        assert_eq!(assumptions.good(ScenarioKey::EarningMultiple), Some(25.0));

        // absent slot stays null
        assert_eq!(assumptions.mid(ScenarioKey::Dilution), None);
    }
}

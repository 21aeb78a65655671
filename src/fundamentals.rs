use serde::Serialize;

use crate::ticker::Ticker;

/// Latest-quarter fundamentals for one ticker.
///
/// All monetary values are in thousands, except `share_price` which is in
/// absolute currency. Ratios are decimal fractions.
#[derive(Clone, Debug, Serialize)]
pub struct FundamentalsRecord {
    pub ticker: Ticker,
    pub share_price: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub revenue_qtr: Option<f64>,
    pub cogs: Option<f64>,
    pub opex: Option<f64>,
    pub operating_profit: Option<f64>,
    pub cash: Option<f64>,
    pub debt: Option<f64>,
}

impl FundamentalsRecord {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            share_price: None,
            shares_outstanding: None,
            revenue_qtr: None,
            cogs: None,
            opex: None,
            operating_profit: None,
            cash: None,
            debt: None,
        }
    }

    pub fn market_cap(&self) -> Option<f64> {
        mul(self.share_price, self.shares_outstanding)
    }

    pub fn gross_profit(&self) -> Option<f64> {
        sub(self.revenue_qtr, self.cogs)
    }

    pub fn gross_margin(&self) -> Option<f64> {
        div(self.gross_profit(), self.revenue_qtr)
    }

    pub fn operating_margin(&self) -> Option<f64> {
        div(self.operating_profit, self.revenue_qtr)
    }

    pub fn net_cash(&self) -> Option<f64> {
        sub(self.cash, self.debt)
    }

    pub fn ebitda_per_share(&self) -> Option<f64> {
        div(self.operating_profit, self.shares_outstanding)
    }
}

fn mul(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a * b),
        _ => None,
    }
}

fn sub(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a - b),
        _ => None,
    }
}

/// Division that yields None on a missing or zero denominator
pub(crate) fn div(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn record() -> FundamentalsRecord {
        FundamentalsRecord {
            ticker: Ticker::from_str("TEST").unwrap(),
            share_price: Some(100.0),
            shares_outstanding: Some(1_000.0),
            revenue_qtr: Some(2_000.0),
            cogs: Some(800.0),
            opex: Some(600.0),
            operating_profit: Some(600.0),
            cash: Some(500.0),
            debt: Some(200.0),
        }
    }

    #[test]
    fn test_derived_fields() {
        let record = record();

        assert_eq!(record.market_cap(), Some(100_000.0));
        assert_eq!(record.gross_profit(), Some(1_200.0));
        assert_eq!(record.gross_margin(), Some(0.6));
        assert_eq!(record.operating_margin(), Some(0.3));
        assert_eq!(record.net_cash(), Some(300.0));
        assert_eq!(record.ebitda_per_share(), Some(0.6));
    }

    #[test]
    fn test_derived_fields_null_propagation() {
        let mut no_revenue = record();
        no_revenue.revenue_qtr = None;
        assert_eq!(no_revenue.gross_profit(), None);
        assert_eq!(no_revenue.gross_margin(), None);
        assert_eq!(no_revenue.operating_margin(), None);

        let mut zero_shares = record();
        zero_shares.shares_outstanding = Some(0.0);
        assert_eq!(zero_shares.market_cap(), Some(0.0));
        assert_eq!(zero_shares.ebitda_per_share(), None);
    }
}

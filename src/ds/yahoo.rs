use log::debug;
use serde_json::Value;

use crate::{
    error::{StkvalError, StkvalResult},
    fundamentals::FundamentalsRecord,
    ticker::Ticker,
};

static QUOTE_SUMMARY_BASE: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

static QUOTE_SUMMARY_MODULES: &str = "price,financialData,defaultKeyStatistics,incomeStatementHistoryQuarterly,balanceSheetHistoryQuarterly";

// Yahoo rejects requests without a browser-like agent
static USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Fetch the latest quarterly fundamentals of a ticker. A failed provider
/// call is fatal for the run.
pub async fn fetch_fundamentals(ticker: &Ticker) -> StkvalResult<FundamentalsRecord> {
    let json = call_quote_summary(ticker).await?;
    debug!("[Yahoo quoteSummary] {json}");

    map_quote_summary(ticker, &json)
}

async fn call_quote_summary(ticker: &Ticker) -> StkvalResult<Value> {
    let request_url = format!("{QUOTE_SUMMARY_BASE}/{}", ticker.symbol);

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    let response = client
        .get(request_url)
        .query(&[("modules", QUOTE_SUMMARY_MODULES)])
        .send()
        .await?;

    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(StkvalError::HttpStatusError(format!(
            "{} {}",
            response.status(),
            response.text().await.unwrap_or_default()
        )))
    }
}

/// Map the provider response to the internal schema.
///
/// Magnitudes are converted to thousands; missing upstream fields default
/// to zero so downstream arithmetic stays total (shares outstanding
/// included, divisions guard against the zero).
pub(crate) fn map_quote_summary(ticker: &Ticker, json: &Value) -> StkvalResult<FundamentalsRecord> {
    let result = &json["quoteSummary"]["result"][0];
    if result.is_null() {
        return Err(StkvalError::NoData(
            "NO_QUOTE_SUMMARY",
            format!(
                "No quote summary for '{}': {}",
                ticker,
                json["quoteSummary"]["error"]["description"]
                    .as_str()
                    .unwrap_or("empty result")
            ),
        ));
    }

    let raw = |value: &Value| value["raw"].as_f64().unwrap_or(0.0);

    let share_price = result["financialData"]["currentPrice"]["raw"]
        .as_f64()
        .or_else(|| result["price"]["regularMarketPrice"]["raw"].as_f64())
        .unwrap_or(0.0);

    let shares_outstanding = raw(&result["defaultKeyStatistics"]["sharesOutstanding"]);

    let income = &result["incomeStatementHistoryQuarterly"]["incomeStatementHistory"][0];
    let revenue = raw(&income["totalRevenue"]);
    let cogs = raw(&income["costOfRevenue"]);
    // the provider rarely reports a single OPEX figure, sum the components
    let opex = raw(&income["researchDevelopment"]) + raw(&income["sellingGeneralAdministrative"]);
    let operating_profit = raw(&income["operatingIncome"]);

    let balance = &result["balanceSheetHistoryQuarterly"]["balanceSheetStatements"][0];
    let cash = raw(&balance["cash"]);
    let debt = raw(&balance["shortLongTermDebt"]) + raw(&balance["longTermDebt"]);

    let mut record = FundamentalsRecord::new(ticker.clone());
    record.share_price = Some(share_price);
    record.shares_outstanding = Some(shares_outstanding / 1_000.0);
    record.revenue_qtr = Some(revenue / 1_000.0);
    record.cogs = Some(cogs / 1_000.0);
    record.opex = Some(opex / 1_000.0);
    record.operating_profit = Some(operating_profit / 1_000.0);
    record.cash = Some(cash / 1_000.0);
    record.debt = Some(debt / 1_000.0);

    Ok(record)
}

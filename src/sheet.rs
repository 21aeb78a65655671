use std::{collections::HashMap, path::Path, str::FromStr};

use log::{debug, warn};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    error::{StkvalError, StkvalResult},
    fundamentals::FundamentalsRecord,
    scenario::{
        ScenarioAssumptions, ScenarioInputs, ScenarioKey, ScenarioPair, ValuationTargets, project,
    },
    ticker::Ticker,
};

/// Rows 1..=CONTEXT_ROWS are the label/mid/good context range read back
/// into fundamentals and scenario assumptions.
const CONTEXT_ROWS: usize = 35;

const ROW_COUNT: usize = 40;

/// Fixed row slots of the valuation template, one metric per row.
///
/// This enum is the sheet schema: every named metric has one fixed row and
/// one canonical label. Read-back still goes through exact label matching,
/// so an artifact edited with a mangled label leaves the field null.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RowSlot {
    Ticker,
    SharePrice,
    SharesOutstanding,
    MarketCap,
    RevenueQtr,
    Cogs,
    GrossProfit,
    GrossMargin,
    Opex,
    OperatingProfit,
    OperatingMargin,
    EbitdaPerShare,
    Cash,
    Debt,
    NetCash,
    Scenario(ScenarioKey),
    ProjectedRevenue,
    ProjectedEbitda,
    ProjectedEarnings,
    ProjectedShares,
    ProjectedEps,
    PredictedPrice5y,
    PredictedPrice,
    AiSummary,
}

impl RowSlot {
    /// Every slot of the template, the scenario slot expanded per key
    fn all() -> impl Iterator<Item = Self> {
        [
            Self::Ticker,
            Self::SharePrice,
            Self::SharesOutstanding,
            Self::MarketCap,
            Self::RevenueQtr,
            Self::Cogs,
            Self::GrossProfit,
            Self::GrossMargin,
            Self::Opex,
            Self::OperatingProfit,
            Self::OperatingMargin,
            Self::EbitdaPerShare,
            Self::Cash,
            Self::Debt,
            Self::NetCash,
        ]
        .into_iter()
        .chain(ScenarioKey::iter().map(Self::Scenario))
        .chain([
            Self::ProjectedRevenue,
            Self::ProjectedEbitda,
            Self::ProjectedEarnings,
            Self::ProjectedShares,
            Self::ProjectedEps,
            Self::PredictedPrice5y,
            Self::PredictedPrice,
            Self::AiSummary,
        ])
    }

    /// 1-based template row of this slot
    pub fn row(&self) -> usize {
        match self {
            Self::Ticker => 3,
            Self::SharePrice => 4,
            Self::SharesOutstanding => 5,
            Self::MarketCap => 6,
            Self::RevenueQtr => 7,
            Self::Cogs => 8,
            Self::GrossProfit => 9,
            Self::GrossMargin => 10,
            Self::Opex => 12,
            Self::OperatingProfit => 13,
            Self::OperatingMargin => 14,
            Self::EbitdaPerShare => 15,
            Self::Cash => 17,
            Self::Debt => 18,
            Self::NetCash => 19,
            Self::Scenario(key) => match key {
                ScenarioKey::RevenueCagr => 22,
                ScenarioKey::OperatingMargin => 23,
                ScenarioKey::Dilution => 24,
                ScenarioKey::LongTermNetDebt => 25,
                ScenarioKey::InterestRateOnDebt => 26,
                ScenarioKey::TaxRate => 27,
                ScenarioKey::EarningMultiple => 28,
            },
            Self::ProjectedRevenue => 30,
            Self::ProjectedEbitda => 31,
            Self::ProjectedEarnings => 32,
            Self::ProjectedShares => 33,
            Self::ProjectedEps => 34,
            Self::PredictedPrice5y => 36,
            Self::PredictedPrice => 38,
            Self::AiSummary => 40,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ticker => "Ticker",
            Self::SharePrice => "Share Price",
            Self::SharesOutstanding => "Shares Outstanding",
            Self::MarketCap => "Market Cap (auto)",
            Self::RevenueQtr => "Revenue (Qtr)",
            Self::Cogs => "COGS",
            Self::GrossProfit => "Gross Profit",
            Self::GrossMargin => "Gross Margin",
            Self::Opex => "OPEX",
            Self::OperatingProfit => "Operating Profit",
            Self::OperatingMargin => "Operating Margin",
            Self::EbitdaPerShare => "EBITDA PS",
            Self::Cash => "Cash",
            Self::Debt => "Debt",
            Self::NetCash => "Net Cash (auto)",
            Self::Scenario(key) => key.label(),
            Self::ProjectedRevenue => "E Revenue",
            Self::ProjectedEbitda => "E EBITDA",
            Self::ProjectedEarnings => "Earning",
            Self::ProjectedShares => "E Shares Outstanding",
            Self::ProjectedEps => "Expected EPS",
            Self::PredictedPrice5y => "Predicted Share Price (5 yr)",
            Self::PredictedPrice => "Predicted Share Price",
            Self::AiSummary => "AI Summary",
        }
    }
}

/// One cell value, either numeric or text
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    fn from_field(field: &str) -> Option<Self> {
        if field.is_empty() {
            return None;
        }

        match field.parse::<f64>() {
            Ok(n) => Some(Self::Number(n)),
            Err(_) => Some(Self::Text(field.to_string())),
        }
    }

    fn to_field(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// One sheet row: label, mid value, good value, free-text note
#[derive(Clone, Debug, Default, Serialize)]
pub struct Row {
    pub label: String,
    pub mid: Option<Cell>,
    pub good: Option<Cell>,
    pub note: Option<String>,
}

/// The valuation sheet: a fixed 40-row label/mid/good table persisted as
/// CSV. Formula evaluation is an explicit in-process derivation pass
/// ([`Sheet::recalc`]), the file itself is pure I/O schema.
#[derive(Clone, Debug)]
pub struct Sheet {
    rows: Vec<Row>,
}

impl Sheet {
    pub fn template() -> Self {
        let mut rows = vec![Row::default(); ROW_COUNT];

        rows[0].label = "Fundamentals (000s)".to_string();
        rows[20].label = "Scenarios".to_string();

        for slot in RowSlot::all() {
            rows[slot.row() - 1].label = slot.label().to_string();
        }

        Self { rows }
    }

    fn row(&self, slot: RowSlot) -> &Row {
        &self.rows[slot.row() - 1]
    }

    fn row_mut(&mut self, slot: RowSlot) -> &mut Row {
        &mut self.rows[slot.row() - 1]
    }

    pub fn mid(&self, slot: RowSlot) -> Option<f64> {
        self.row(slot).mid.as_ref().and_then(Cell::as_f64)
    }

    pub fn good(&self, slot: RowSlot) -> Option<f64> {
        self.row(slot).good.as_ref().and_then(Cell::as_f64)
    }

    fn set_mid(&mut self, slot: RowSlot, value: Option<f64>) {
        self.row_mut(slot).mid = value.map(Cell::Number);
    }

    fn set_good(&mut self, slot: RowSlot, value: Option<f64>) {
        self.row_mut(slot).good = value.map(Cell::Number);
    }

    /// Write fetched fundamentals into the fixed input rows
    pub fn fill(&mut self, record: &FundamentalsRecord) {
        self.row_mut(RowSlot::Ticker).mid = Some(Cell::Text(record.ticker.symbol.clone()));

        self.set_mid(RowSlot::SharePrice, record.share_price);
        self.set_mid(RowSlot::SharesOutstanding, record.shares_outstanding);
        self.set_mid(RowSlot::RevenueQtr, record.revenue_qtr);
        self.set_mid(RowSlot::Cogs, record.cogs);
        self.set_mid(RowSlot::Opex, record.opex);
        self.set_mid(RowSlot::OperatingProfit, record.operating_profit);
        self.set_mid(RowSlot::Cash, record.cash);
        self.set_mid(RowSlot::Debt, record.debt);
    }

    /// Recompute every derived row from the current cell values.
    ///
    /// Missing inputs clear the derived cells and log a warning instead of
    /// failing the run.
    pub fn recalc(&mut self) {
        let record = self.input_record();

        self.set_mid(RowSlot::MarketCap, record.market_cap());
        self.set_mid(RowSlot::GrossProfit, record.gross_profit());
        self.set_mid(RowSlot::GrossMargin, record.gross_margin());
        self.set_mid(RowSlot::OperatingMargin, record.operating_margin());
        self.set_mid(RowSlot::EbitdaPerShare, record.ebitda_per_share());
        self.set_mid(RowSlot::NetCash, record.net_cash());

        if record.revenue_qtr.is_none() || record.shares_outstanding.unwrap_or(0.0) == 0.0 {
            warn!("Sheet recalc is degraded: revenue or shares outstanding is missing");
        }

        let assumption =
            |sheet: &Self, key: ScenarioKey| -> (Option<f64>, Option<f64>) {
                let mid = sheet.mid(RowSlot::Scenario(key));
                let good = sheet.good(RowSlot::Scenario(key)).or(mid);
                (mid, good)
            };

        let (cagr_mid, cagr_good) = assumption(self, ScenarioKey::RevenueCagr);
        let (margin_mid, margin_good) = assumption(self, ScenarioKey::OperatingMargin);
        let (dilution_mid, dilution_good) = assumption(self, ScenarioKey::Dilution);
        let (tax_mid, tax_good) = assumption(self, ScenarioKey::TaxRate);
        let (multiple_mid, multiple_good) = assumption(self, ScenarioKey::EarningMultiple);

        let base = ScenarioInputs {
            revenue_qtr: record.revenue_qtr,
            shares_outstanding: record.shares_outstanding,
            ..ScenarioInputs::default()
        };

        let mid_projection = project(&ScenarioInputs {
            rev_cagr: cagr_mid,
            op_margin: margin_mid,
            tax_rate: tax_mid,
            dilution: dilution_mid,
            multiple: multiple_mid,
            ..base
        });
        let good_projection = project(&ScenarioInputs {
            rev_cagr: cagr_good,
            op_margin: margin_good,
            tax_rate: tax_good,
            dilution: dilution_good,
            multiple: multiple_good,
            ..base
        });

        self.set_mid(RowSlot::ProjectedRevenue, mid_projection.revenue_5y);
        self.set_good(RowSlot::ProjectedRevenue, good_projection.revenue_5y);
        self.set_mid(RowSlot::ProjectedEbitda, mid_projection.ebit_5y);
        self.set_good(RowSlot::ProjectedEbitda, good_projection.ebit_5y);
        self.set_mid(RowSlot::ProjectedEarnings, mid_projection.earnings_5y);
        self.set_good(RowSlot::ProjectedEarnings, good_projection.earnings_5y);
        self.set_mid(RowSlot::ProjectedShares, mid_projection.shares_5y);
        self.set_good(RowSlot::ProjectedShares, good_projection.shares_5y);
        self.set_mid(RowSlot::ProjectedEps, mid_projection.eps_5y);
        self.set_good(RowSlot::ProjectedEps, good_projection.eps_5y);
        self.set_mid(RowSlot::PredictedPrice5y, mid_projection.price_5y);
        self.set_good(RowSlot::PredictedPrice5y, good_projection.price_5y);
        self.set_mid(RowSlot::PredictedPrice, mid_projection.price_5y_discounted);
        self.set_good(RowSlot::PredictedPrice, good_projection.price_5y_discounted);
    }

    /// Fundamentals assembled from the fixed input rows, bypassing label
    /// matching. Used by [`Sheet::recalc`].
    fn input_record(&self) -> FundamentalsRecord {
        let ticker = self
            .row(RowSlot::Ticker)
            .mid
            .as_ref()
            .and_then(|cell| match cell {
                Cell::Text(s) => Ticker::from_str(s).ok(),
                Cell::Number(_) => None,
            })
            .unwrap_or(Ticker {
                symbol: "UNKNOWN".to_string(),
            });

        let mut record = FundamentalsRecord::new(ticker);
        record.share_price = self.mid(RowSlot::SharePrice);
        record.shares_outstanding = self.mid(RowSlot::SharesOutstanding);
        record.revenue_qtr = self.mid(RowSlot::RevenueQtr);
        record.cogs = self.mid(RowSlot::Cogs);
        record.opex = self.mid(RowSlot::Opex);
        record.operating_profit = self.mid(RowSlot::OperatingProfit);
        record.cash = self.mid(RowSlot::Cash);
        record.debt = self.mid(RowSlot::Debt);

        record
    }

    /// Read rows 1..=35 back into fundamentals and scenario assumptions.
    ///
    /// Labels are matched exactly after trimming; unmatched labels are
    /// ignored and the corresponding fields stay null. A blank "good"
    /// column falls back to "mid".
    pub fn read_context(&self) -> StkvalResult<(FundamentalsRecord, ScenarioAssumptions)> {
        let mut table: HashMap<&str, (Option<&Cell>, Option<&Cell>)> = HashMap::new();

        for row in self.rows.iter().take(CONTEXT_ROWS) {
            let label = row.label.trim();
            if label.is_empty() {
                continue;
            }

            let mid = row.mid.as_ref();
            let good = row.good.as_ref().or(mid);

            // first match wins
            table.entry(label).or_insert((mid, good));
        }

        let number = |label: &str| -> Option<f64> {
            table.get(label).and_then(|(mid, _)| mid.and_then(Cell::as_f64))
        };

        let ticker_cell = table
            .get(RowSlot::Ticker.label())
            .and_then(|(mid, _)| *mid)
            .ok_or(StkvalError::Required(
                "TICKER_REQUIRED",
                "Sheet has no ticker row".to_string(),
            ))?;
        let ticker = match ticker_cell {
            Cell::Text(s) => Ticker::from_str(s)?,
            Cell::Number(_) => {
                return Err(StkvalError::Invalid(
                    "TICKER_INVALID",
                    "Ticker cell is not text".to_string(),
                ));
            }
        };

        let mut record = FundamentalsRecord::new(ticker);
        record.share_price = number(RowSlot::SharePrice.label());
        record.shares_outstanding = number(RowSlot::SharesOutstanding.label());
        record.revenue_qtr = number(RowSlot::RevenueQtr.label());
        record.cogs = number(RowSlot::Cogs.label());
        record.opex = number(RowSlot::Opex.label());
        record.operating_profit = number(RowSlot::OperatingProfit.label());
        record.cash = number(RowSlot::Cash.label());
        record.debt = number(RowSlot::Debt.label());

        let mut assumptions = ScenarioAssumptions::default();
        for key in ScenarioKey::iter() {
            if let Some((mid, good)) = table.get(key.label()) {
                let mid = mid.and_then(Cell::as_f64);
                let good = good.and_then(Cell::as_f64);

                if mid.is_some() || good.is_some() {
                    assumptions.set(key, ScenarioPair { mid, good });
                }
            }
        }

        Ok((record, assumptions))
    }

    /// Write the narrative report into the summary note cell
    pub fn write_report(&mut self, report: &str) {
        self.row_mut(RowSlot::AiSummary).note = Some(report.to_string());
    }

    pub fn report(&self) -> Option<&str> {
        self.row(RowSlot::AiSummary).note.as_deref()
    }

    /// Write scenario mid/good pairs into the rows whose labels match
    /// exactly after trimming; unmatched labels are skipped.
    pub fn write_assumptions(&mut self, assumptions: &ScenarioAssumptions) {
        for key in ScenarioKey::iter() {
            let pair = assumptions.get(key);
            if pair.mid.is_none() && pair.good.is_none() {
                continue;
            }

            let good = pair.good.or(pair.mid);

            match self
                .rows
                .iter_mut()
                .find(|row| row.label.trim() == key.label())
            {
                Some(row) => {
                    row.mid = pair.mid.map(Cell::Number);
                    row.good = good.map(Cell::Number);
                }
                None => {
                    debug!("No sheet row labeled '{}', value skipped", key.label());
                }
            }
        }
    }

    /// The three headline cells: current price and the discounted mid/good
    /// predictions
    pub fn targets(&self) -> ValuationTargets {
        ValuationTargets {
            current_price: self.mid(RowSlot::SharePrice),
            mid_target: self.mid(RowSlot::PredictedPrice),
            good_target: self.good(RowSlot::PredictedPrice),
        }
    }

    /// Non-blank fundamentals rows, for display
    pub fn fundamentals_rows(&self) -> Vec<Row> {
        self.view_rows(2, 19)
    }

    /// Non-blank scenario rows (assumptions and projections), for display
    pub fn scenario_rows(&self) -> Vec<Row> {
        self.view_rows(21, ROW_COUNT - 2)
    }

    fn view_rows(&self, from: usize, to: usize) -> Vec<Row> {
        self.rows[from..to]
            .iter()
            .filter(|row| !row.label.trim().is_empty() && row.mid.is_some())
            .cloned()
            .collect()
    }

    pub fn save(&self, path: &Path) -> StkvalResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.write_record([
                row.label.as_str(),
                &row.mid.as_ref().map(Cell::to_field).unwrap_or_default(),
                &row.good.as_ref().map(Cell::to_field).unwrap_or_default(),
                row.note.as_deref().unwrap_or_default(),
            ])?;
        }
        writer.flush()?;

        Ok(())
    }

    pub fn load(path: &Path) -> StkvalResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = vec![];
        for record in reader.records() {
            let record = record?;

            rows.push(Row {
                label: record.get(0).unwrap_or_default().to_string(),
                mid: Cell::from_field(record.get(1).unwrap_or_default()),
                good: Cell::from_field(record.get(2).unwrap_or_default()),
                note: match record.get(3).unwrap_or_default() {
                    "" => None,
                    note => Some(note.to_string()),
                },
            });
        }

        if rows.is_empty() {
            return Err(StkvalError::NoData(
                "SHEET_EMPTY",
                format!("No rows in '{}'", path.display()),
            ));
        }

        Ok(Self { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FundamentalsRecord {
        let mut record = FundamentalsRecord::new(Ticker {
            symbol: "TEST".to_string(),
        });
        record.share_price = Some(50.0);
        record.shares_outstanding = Some(100.0);
        record.revenue_qtr = Some(1_000.0);
        record.cogs = Some(400.0);
        record.opex = Some(350.0);
        record.operating_profit = Some(250.0);
        record.cash = Some(900.0);
        record.debt = Some(300.0);
        record
    }

    fn assumptions() -> ScenarioAssumptions {
        let mut assumptions = ScenarioAssumptions::default();
        assumptions.set(
            ScenarioKey::RevenueCagr,
            ScenarioPair {
                mid: Some(0.20),
                good: Some(0.30),
            },
        );
        assumptions.set(
            ScenarioKey::OperatingMargin,
            ScenarioPair {
                mid: Some(0.25),
                good: Some(0.30),
            },
        );
        assumptions.set(
            ScenarioKey::Dilution,
            ScenarioPair {
                mid: Some(0.05),
                good: None,
            },
        );
        assumptions.set(
            ScenarioKey::TaxRate,
            ScenarioPair {
                mid: Some(0.21),
                good: Some(0.21),
            },
        );
        assumptions.set(
            ScenarioKey::EarningMultiple,
            ScenarioPair {
                mid: Some(20.0),
                good: Some(25.0),
            },
        );
        assumptions
    }

    #[test]
    fn test_template_labels_every_slot() {
        let sheet = Sheet::template();

        for key in ScenarioKey::iter() {
            assert_eq!(
                sheet.rows[RowSlot::Scenario(key).row() - 1].label,
                key.label()
            );
        }

        assert_eq!(sheet.rows[RowSlot::Ticker.row() - 1].label, "Ticker");
        assert_eq!(
            sheet.rows[RowSlot::AiSummary.row() - 1].label,
            "AI Summary"
        );
        assert_eq!(RowSlot::all().count(), 23 + ScenarioKey::iter().count());
    }

    #[test]
    fn test_fill_and_recalc_derived_fundamentals() {
        let mut sheet = Sheet::template();
        sheet.fill(&record());
        sheet.recalc();

        assert_eq!(sheet.mid(RowSlot::MarketCap), Some(5_000.0));
        assert_eq!(sheet.mid(RowSlot::GrossProfit), Some(600.0));
        assert_eq!(sheet.mid(RowSlot::GrossMargin), Some(0.6));
        assert_eq!(sheet.mid(RowSlot::OperatingMargin), Some(0.25));
        assert_eq!(sheet.mid(RowSlot::EbitdaPerShare), Some(2.5));
        assert_eq!(sheet.mid(RowSlot::NetCash), Some(600.0));

        // no assumptions yet, projections stay blank
        assert_eq!(sheet.mid(RowSlot::PredictedPrice), None);
    }

    #[test]
    fn test_scenario_recalc_and_targets() {
        let mut sheet = Sheet::template();
        sheet.fill(&record());
        sheet.write_assumptions(&assumptions());
        sheet.recalc();

        let mid = sheet.mid(RowSlot::PredictedPrice).unwrap();
        let expected_mid = (1_000.0 * 4.0 * 1.2_f64.powi(5) * 0.25 * 0.79 * 20.0)
            / (100.0 * 1.05)
            * 1.05_f64.powi(5);
        assert!((mid - expected_mid).abs() < 1e-9);

        // "good" dilution falls back to mid at write time
        let shares_good = sheet.good(RowSlot::ProjectedShares).unwrap();
        assert!((shares_good - 105.0).abs() < 1e-9);

        let targets = sheet.targets();
        assert_eq!(targets.current_price, Some(50.0));
        assert_eq!(targets.mid_target, sheet.mid(RowSlot::PredictedPrice));
        assert_eq!(targets.good_target, sheet.good(RowSlot::PredictedPrice));
        assert!(targets.good_target.unwrap() > targets.mid_target.unwrap());
    }

    #[test]
    fn test_context_round_trip() {
        let mut sheet = Sheet::template();
        sheet.fill(&record());
        sheet.write_assumptions(&assumptions());
        sheet.recalc();

        let (read_record, read_assumptions) = sheet.read_context().unwrap();

        assert_eq!(read_record.ticker.symbol, "TEST");
        assert_eq!(read_record.share_price, Some(50.0));
        assert_eq!(read_record.revenue_qtr, Some(1_000.0));
        assert_eq!(read_record.debt, Some(300.0));

        assert_eq!(read_assumptions.mid(ScenarioKey::RevenueCagr), Some(0.20));
        assert_eq!(read_assumptions.good(ScenarioKey::RevenueCagr), Some(0.30));
        // blank good fell back to mid
        assert_eq!(read_assumptions.good(ScenarioKey::Dilution), Some(0.05));
    }

    #[test]
    fn test_label_match_is_exact_after_trim() {
        let mut sheet = Sheet::template();
        sheet.fill(&record());

        // trailing whitespace in the sheet label still matches after trim
        sheet.rows[RowSlot::Scenario(ScenarioKey::TaxRate).row() - 1].label =
            "Tax Rate  ".to_string();
        // differing case must not match
        sheet.rows[RowSlot::Scenario(ScenarioKey::RevenueCagr).row() - 1].label =
            "expected revenue cagr (5y)".to_string();

        sheet.write_assumptions(&assumptions());

        assert_eq!(
            sheet.mid(RowSlot::Scenario(ScenarioKey::TaxRate)),
            Some(0.21)
        );
        assert_eq!(sheet.mid(RowSlot::Scenario(ScenarioKey::RevenueCagr)), None);

        let (_, read_assumptions) = sheet.read_context().unwrap();
        assert_eq!(read_assumptions.mid(ScenarioKey::TaxRate), Some(0.21));
        assert_eq!(read_assumptions.mid(ScenarioKey::RevenueCagr), None);
    }

    #[test]
    fn test_csv_round_trip() {
        let mut sheet = Sheet::template();
        sheet.fill(&record());
        sheet.write_assumptions(&assumptions());
        sheet.recalc();
        sheet.write_report("### Snapshot\nA test report, with a comma.");

        let dir = std::env::temp_dir().join("stkval-test-sheet");
        let path = dir.join("TEST.csv");
        sheet.save(&path).unwrap();

        let loaded = Sheet::load(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(
            loaded.mid(RowSlot::SharePrice),
            sheet.mid(RowSlot::SharePrice)
        );
        assert_eq!(
            loaded.mid(RowSlot::PredictedPrice),
            sheet.mid(RowSlot::PredictedPrice)
        );
        assert_eq!(
            loaded.report(),
            Some("### Snapshot\nA test report, with a comma.")
        );

        let (record, assumptions) = loaded.read_context().unwrap();
        assert_eq!(record.ticker.symbol, "TEST");
        assert_eq!(assumptions.good(ScenarioKey::EarningMultiple), Some(25.0));
    }

    #[test]
    fn test_display_rows_split() {
        let mut sheet = Sheet::template();
        sheet.fill(&record());
        sheet.write_assumptions(&assumptions());
        sheet.recalc();

        let fundamentals = sheet.fundamentals_rows();
        assert!(
            fundamentals
                .iter()
                .any(|row| row.label == "Market Cap (auto)")
        );
        assert!(!fundamentals.iter().any(|row| row.label.is_empty()));

        let scenarios = sheet.scenario_rows();
        assert!(
            scenarios
                .iter()
                .any(|row| row.label == "Predicted Share Price")
        );
        assert!(!scenarios.iter().any(|row| row.label == "Share Price"));
    }
}

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{DateTime, Local};
use log::debug;
use serde::Serialize;

use crate::{
    APP_DATA_DIR,
    ds::yahoo,
    error::*,
    llm,
    scenario::ValuationTargets,
    sheet::{Row, Sheet},
    summary,
    ticker::Ticker,
};

#[derive(Debug, Default)]
pub struct AnalyzeOptions {
    /// Where sheets are written, the default is the app data dir
    pub output_dir: Option<PathBuf>,
}

/// Everything one run produces for display
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub ticker: Ticker,
    pub targets: ValuationTargets,
    pub fundamentals: Vec<Row>,
    pub scenarios: Vec<Row>,
    pub report: String,
    pub artifact_path: PathBuf,
    pub generated_at: DateTime<Local>,
}

pub fn output_dir(options: &AnalyzeOptions) -> PathBuf {
    options
        .output_dir
        .clone()
        .unwrap_or_else(|| APP_DATA_DIR.join("valuations"))
}

/// Path of the finished per-ticker artifact under the output dir
pub fn artifact_path(output_dir: &Path, ticker: &Ticker) -> PathBuf {
    output_dir
        .join("ai-summaries")
        .join(format!("{ticker}_ai.csv"))
}

/// Run the whole pipeline for one ticker: fetch fundamentals, fill and
/// recompute the sheet, generate the LLM summary, write results back,
/// persist the artifact and extract the headline targets.
pub async fn run(ticker: &str, options: &AnalyzeOptions) -> StkvalResult<Analysis> {
    let ticker = Ticker::from_str(ticker)?;
    debug!("{ticker:?}");

    let record = yahoo::fetch_fundamentals(&ticker).await?;
    debug!("{record:?}");

    let mut sheet = Sheet::template();
    sheet.fill(&record);
    sheet.recalc();

    let output_dir = output_dir(options);
    let pre_ai_path = output_dir.join(format!("{ticker}.csv"));
    sheet.save(&pre_ai_path)?;

    let (context_record, context_assumptions) = sheet.read_context()?;
    debug!("{context_record:?} {context_assumptions:?}");

    // credentials are resolved once here and passed down
    let cfg = llm::Config::load()?;
    let summary = summary::generate(&cfg, &context_record, &context_assumptions).await?;

    sheet.write_report(&summary.report);
    sheet.write_assumptions(&summary.assumptions);
    sheet.recalc();

    let artifact_path = artifact_path(&output_dir, &ticker);
    sheet.save(&artifact_path)?;

    if let Err(err) = std::fs::remove_file(&pre_ai_path) {
        debug!(
            "Could not remove pre-AI sheet '{}': {err}",
            pre_ai_path.display()
        );
    }

    // the returned analysis reflects the persisted artifact
    let sheet = Sheet::load(&artifact_path)?;

    Ok(Analysis {
        ticker,
        targets: sheet.targets(),
        fundamentals: sheet.fundamentals_rows(),
        scenarios: sheet.scenario_rows(),
        report: sheet.report().unwrap_or_default().to_string(),
        artifact_path,
        generated_at: Local::now(),
    })
}

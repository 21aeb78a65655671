use std::path::PathBuf;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use stkval::{api, api::SheetCell, api::SheetRow, error::StkvalError};
use tabled::settings::{Color, Width, measurement::Percent, object::Columns, peaker::Priority};
use tokio::time::Duration;

#[derive(clap::Args)]
pub struct AnalyzeCommand {
    #[arg(
        short = 'o',
        long = "out",
        help = "Directory to write valuation sheets, the default is the app data dir"
    )]
    out: Option<PathBuf>,

    #[arg(help = "Ticker to analyze, e.g. AAPL")]
    ticker: String,
}

impl AnalyzeCommand {
    pub async fn exec(&self) {
        let options = api::AnalyzeOptions {
            output_dir: self.out.clone(),
        };

        let spinner = ProgressBar::new_spinner();
        spinner
            .set_style(ProgressStyle::with_template("{msg} {spinner:.cyan} [{elapsed}]").unwrap());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("[{}]", self.ticker.to_uppercase()));

        match api::analyze(&self.ticker, &options).await {
            Ok(analysis) => {
                spinner
                    .finish_with_message(format!("[{}]", analysis.ticker.to_string().cyan()));

                println!();
                println!(
                    "  Current Price  {}",
                    fmt_target(analysis.targets.current_price).cyan()
                );
                println!(
                    "  Mid Target     {}",
                    fmt_target(analysis.targets.mid_target).yellow()
                );
                println!(
                    "  Good Target    {}",
                    fmt_target(analysis.targets.good_target).green()
                );
                println!();

                print_table(
                    &analysis.fundamentals,
                    &["Fundamentals (000s)", "Qtr Value"],
                    false,
                );
                println!();
                print_table(&analysis.scenarios, &["Scenarios", "Mid", "Good"], true);

                println!();
                println!("{}", analysis.report);
                println!();
                println!("Saved to '{}'", analysis.artifact_path.display().to_string().green());
            }
            Err(err) => {
                spinner.finish_with_message(format!("[{}] {}", self.ticker, err.to_string().red()));

                if let StkvalError::Required(code, _) = err {
                    if code == "LLM_NOT_CONFIGURED" {
                        println!(
                            "[I] Run `{}` command to configure the LLM provider",
                            "stkval llm config".green()
                        );
                    }
                }
            }
        }
    }
}

fn print_table(rows: &[SheetRow], header: &[&str], with_good: bool) {
    let mut table_data: Vec<Vec<String>> = vec![header.iter().map(|s| s.to_string()).collect()];
    for row in rows {
        let mut columns = vec![row.label.clone(), fmt_cell(row.mid.as_ref())];
        if with_good {
            columns.push(fmt_cell(row.good.as_ref()));
        }
        table_data.push(columns);
    }

    let mut table = tabled::builder::Builder::from_iter(&table_data).build();
    table.modify(Columns::first(), Color::FG_CYAN);
    table.with((
        Width::wrap(Percent(30)).priority(Priority::max(true)),
        Width::increase(Percent(30)).priority(Priority::min(true)),
    ));
    println!("{table}");
}

fn fmt_cell(cell: Option<&SheetCell>) -> String {
    match cell {
        Some(SheetCell::Number(n)) => fmt_number(*n),
        Some(SheetCell::Text(s)) => s.clone(),
        None => String::new(),
    }
}

fn fmt_target(value: Option<f64>) -> String {
    value.map(fmt_number).unwrap_or_else(|| "N/A".to_string())
}

fn fmt_number(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{int_grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(374.43), "374.43");
        assert_eq!(fmt_number(9953.28), "9,953.28");
        assert_eq!(fmt_number(-1234567.891), "-1,234,567.89");
        assert_eq!(fmt_number(0.25), "0.25");
    }

    #[test]
    fn test_fmt_target() {
        assert_eq!(fmt_target(Some(477.92)), "477.92");
        assert_eq!(fmt_target(None), "N/A");
    }
}

use std::{convert::Infallible, net::SocketAddr, str::FromStr, sync::Arc};

use log::{error, info};
use warp::{Filter, Rejection, Reply, http::StatusCode};

use crate::{
    analyze::{self, AnalyzeOptions},
    error::StkvalResult,
    ticker::Ticker,
};

#[derive(Debug)]
struct ApiError {
    message: String,
}

impl warp::reject::Reject for ApiError {}

/// Serve the web UI and the JSON API until the process is stopped
pub async fn run(port: u16, options: AnalyzeOptions) -> StkvalResult<()> {
    let options = Arc::new(options);
    let options_filter = warp::any().map(move || options.clone());

    let index_route = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(INDEX_HTML));

    let analyze_route = warp::path!("api" / "v1" / "analyze" / String)
        .and(warp::get())
        .and(options_filter.clone())
        .and_then(analyze_handler);

    let download_route = warp::path!("api" / "v1" / "download" / String)
        .and(warp::get())
        .and(options_filter.clone())
        .and_then(download_handler);

    let routes = index_route
        .or(analyze_route)
        .or(download_route)
        .recover(handle_rejection);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Serving on http://{addr}");

    warp::serve(routes).run(addr).await;

    Ok(())
}

async fn analyze_handler(
    ticker: String,
    options: Arc<AnalyzeOptions>,
) -> Result<impl Reply, Rejection> {
    match analyze::run(&ticker, &options).await {
        Ok(analysis) => {
            info!("Analysis for '{}' complete", analysis.ticker);
            Ok(warp::reply::json(&analysis))
        }
        Err(err) => {
            error!("Analysis for '{ticker}' failed: {err}");
            Err(warp::reject::custom(ApiError {
                message: err.to_string(),
            }))
        }
    }
}

async fn download_handler(
    ticker: String,
    options: Arc<AnalyzeOptions>,
) -> Result<impl Reply, Rejection> {
    let ticker = Ticker::from_str(&ticker).map_err(|err| {
        warp::reject::custom(ApiError {
            message: err.to_string(),
        })
    })?;

    let path = analyze::artifact_path(&analyze::output_dir(&options), &ticker);
    match std::fs::read(&path) {
        Ok(bytes) => Ok(warp::reply::with_header(
            warp::reply::with_header(bytes, "content-type", "text/csv"),
            "content-disposition",
            format!("attachment; filename=\"{ticker}_ai.csv\""),
        )),
        Err(_) => Err(warp::reject::not_found()),
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = api_error.message.clone();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message })),
        code,
    ))
}

static INDEX_HTML: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>AI Stock Valuation</title>
<style>
  body { font-family: sans-serif; margin: 2rem auto; max-width: 72rem; color: #111827; }
  input { padding: 0.45rem 0.75rem; border: 1px solid #e5e7eb; border-radius: 8px; }
  button { padding: 0.45rem 1.2rem; border: 0; border-radius: 8px; background: #2563eb; color: #fff; cursor: pointer; }
  .cards { display: flex; gap: 1rem; margin: 1rem 0; }
  .card { flex: 1; border: 1px solid #e5e7eb; border-radius: 8px; padding: 0.8rem; }
  .card .value { font-size: 1.6rem; font-weight: 600; }
  .panes { display: flex; gap: 1rem; align-items: flex-start; }
  .pane { flex: 1; }
  .pane.report { flex: 2; background: #f9fafb; border-radius: 8px; padding: 0.8rem; white-space: pre-wrap; }
  table { border-collapse: collapse; width: 100%; font-size: 0.9rem; }
  th, td { border: 1px solid #e5e7eb; padding: 0.45rem 0.75rem; text-align: left; }
  th { background: #f3f4f6; }
  td.num { text-align: right; }
  #status { margin: 1rem 0; color: #6b7280; }
  #error { color: #b91c1c; }
</style>
</head>
<body>
<h1>AI Stock Valuation</h1>
<p>Enter a ticker symbol to generate a valuation model and an AI investment report.</p>
<form id="form">
  <input id="ticker" placeholder="e.g. AAPL, MSFT" required>
  <button type="submit">Run Analysis</button>
</form>
<div id="status"></div>
<div id="error"></div>
<div id="results" style="display:none">
  <div class="cards">
    <div class="card"><div>Current Price</div><div class="value" id="current"></div></div>
    <div class="card"><div>Mid Target</div><div class="value" id="mid"></div></div>
    <div class="card"><div>Good Target</div><div class="value" id="good"></div></div>
  </div>
  <p><a id="download" href="#">Download valuation sheet</a></p>
  <div class="panes">
    <div class="pane"><h3>Fundamentals</h3><table id="fundamentals"></table></div>
    <div class="pane"><h3>Scenarios</h3><table id="scenarios"></table></div>
    <div class="pane report"><h3>AI Analysis</h3><div id="report"></div></div>
  </div>
</div>
<script>
const fmt = (v) => v === null || v === undefined ? "N/A"
  : typeof v === "number" ? v.toLocaleString(undefined, { maximumFractionDigits: 2 }) : v;

function renderTable(el, rows, columns) {
  el.innerHTML = "<tr>" + columns.map(c => "<th>" + c + "</th>").join("") + "</tr>";
  for (const row of rows) {
    const tr = document.createElement("tr");
    tr.innerHTML = "<td>" + row.label + "</td>"
      + "<td class=num>" + fmt(row.mid) + "</td>"
      + (columns.length > 2 ? "<td class=num>" + fmt(row.good) + "</td>" : "");
    el.appendChild(tr);
  }
}

document.getElementById("form").addEventListener("submit", async (ev) => {
  ev.preventDefault();
  const ticker = document.getElementById("ticker").value.trim().toUpperCase();
  const status = document.getElementById("status");
  const error = document.getElementById("error");
  error.textContent = "";
  status.textContent = "Running analysis for " + ticker + "...";
  document.getElementById("results").style.display = "none";
  try {
    const resp = await fetch("/api/v1/analyze/" + ticker);
    const data = await resp.json();
    if (!resp.ok) throw new Error(data.error || "analysis failed");
    status.textContent = "Analysis complete.";
    document.getElementById("current").textContent = fmt(data.targets.current_price);
    document.getElementById("mid").textContent = fmt(data.targets.mid_target);
    document.getElementById("good").textContent = fmt(data.targets.good_target);
    document.getElementById("download").href = "/api/v1/download/" + ticker;
    renderTable(document.getElementById("fundamentals"), data.fundamentals, ["Metric", "Qtr Value (000s)"]);
    renderTable(document.getElementById("scenarios"), data.scenarios, ["Metric", "Mid", "Good"]);
    document.getElementById("report").textContent = data.report;
    document.getElementById("results").style.display = "";
  } catch (err) {
    status.textContent = "";
    error.textContent = "An error occurred: " + err.message;
  }
});
</script>
</body>
</html>
"##;

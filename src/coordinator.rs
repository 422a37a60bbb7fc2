// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one report run: config -> window -> rows -> single spreadsheet append
// role: processing/orchestrator
// inputs: RunOptions (config path, optional date/timezone, dry-run); environment credentials
// outputs: RunSummary; in dry-run mode the rows as JSON on stdout
// side_effects: Network calls through the gateways; one Sheets append per run at most
// invariants:
// - Config is loaded before credentials are read and before any network call
// - Credentials are resolved before any network call
// - Zero in-window commits ⇒ no append call
// - Any error aborts before the append; rows are appended all together or not at all
// errors: ReportError propagated to main, which logs and exits non-zero
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Display;

use chrono::{NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::cli::RunOptions;
use crate::config::{load_config, RunConfig};
use crate::error::Result;
use crate::gateway::github::{github_token_from_env, GithubHttpApi};
use crate::gateway::sheets::{sheets_token, SheetsHttpApi};
use crate::gateway::{InsertDataOption, SourceControl, Spreadsheet, ValueInputOption};
use crate::model::{AppendOutcome, ReportRow, ValueRange};
use crate::report::build_rows;
use crate::window::{compute_window, previous_day, DayWindow, ReportZone};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  pub date: NaiveDate,
  pub window_start: String,
  pub window_end: String,
  pub rows: usize,
  /// `None` when nothing was appended (no commits, or dry run).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_range: Option<String>,
}

#[derive(Debug, Serialize)]
struct Preview<'a> {
  summary: &'a RunSummary,
  spreadsheet_id: &'a str,
  range: &'a str,
  values: &'a [ReportRow],
}

fn summarize<Tz: TimeZone>(window: &DayWindow<Tz>, rows: usize, outcome: Option<AppendOutcome>) -> RunSummary
where
  Tz::Offset: Display,
{
  RunSummary {
    date: window.date,
    window_start: window.start.to_rfc3339(),
    window_end: window.end.to_rfc3339(),
    rows,
    updated_range: outcome.and_then(|o| o.updated_range),
  }
}

/// Window plus oldest-first rows for `target`.
pub fn prepare<Tz>(
  cfg: &RunConfig,
  target: NaiveDate,
  tz: &Tz,
  scm: &dyn SourceControl,
) -> Result<(DayWindow<Tz>, Vec<ReportRow>)>
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  let window = compute_window(target, tz)?;
  tracing::info!(start = %window.start, end = %window.end, "report window");

  let rows = build_rows(scm, cfg, &window, tz)?;
  Ok((window, rows))
}

/// Append `rows` in one call; nothing is sent when there are no rows.
pub fn publish(cfg: &RunConfig, rows: Vec<ReportRow>, sheet: &dyn Spreadsheet) -> Result<Option<AppendOutcome>> {
  if rows.is_empty() {
    tracing::info!("no commits in window; skipping spreadsheet append");
    return Ok(None);
  }

  let body = ValueRange::rows(rows);
  let outcome = sheet.append_values(
    &cfg.spreadsheet_id,
    &cfg.column_range,
    &body,
    ValueInputOption::UserEntered,
    InsertDataOption::InsertRows,
  )?;

  tracing::info!(
    rows = body.values.len(),
    updated_rows = outcome.updated_rows,
    updated_range = outcome.updated_range.as_deref().unwrap_or("-"),
    "appended rows"
  );

  Ok(Some(outcome))
}

/// Build the day's rows and append them.
pub fn run<Tz>(
  cfg: &RunConfig,
  target: NaiveDate,
  tz: &Tz,
  scm: &dyn SourceControl,
  sheet: &dyn Spreadsheet,
) -> Result<RunSummary>
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  let (window, rows) = prepare(cfg, target, tz, scm)?;
  let count = rows.len();
  let outcome = publish(cfg, rows, sheet)?;

  Ok(summarize(&window, count, outcome))
}

/// Full process flow behind the binary.
pub fn execute(opts: &RunOptions) -> Result<RunSummary> {
  // Phase 1: config (fatal before anything touches credentials or the network)
  let cfg = load_config(&opts.config_path)?;
  let zone = opts.tz.unwrap_or(cfg.timezone);
  let target = match opts.date {
    Some(d) => d,
    None => previous_day(zone.today(Utc::now()))?,
  };
  tracing::info!(
    owner = %cfg.owner,
    repository = %cfg.repository,
    branch = %cfg.branch,
    date = %target,
    timezone = %zone,
    date_format = cfg.date_format.chrono_format(),
    "loaded config"
  );

  // Phase 2: credentials, before any request
  let scm = GithubHttpApi::new(&cfg.github_api_url, github_token_from_env()?)?;

  // Phase 3: build and publish
  match zone {
    ReportZone::Local => execute_in(&cfg, opts, target, &chrono::Local, &scm),
    ReportZone::Named(tz) => execute_in(&cfg, opts, target, &tz, &scm),
  }
}

fn execute_in<Tz>(
  cfg: &RunConfig,
  opts: &RunOptions,
  target: NaiveDate,
  tz: &Tz,
  scm: &dyn SourceControl,
) -> Result<RunSummary>
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  if opts.dry_run {
    let (window, rows) = prepare(cfg, target, tz, scm)?;
    let summary = summarize(&window, rows.len(), None);
    print_preview(cfg, &summary, &rows);
    return Ok(summary);
  }

  let sheet = SheetsHttpApi::new(&cfg.sheets_api_url, sheets_token(&cfg.sheets_token_file)?)?;
  run(cfg, target, tz, scm, &sheet)
}

fn print_preview(cfg: &RunConfig, summary: &RunSummary, rows: &[ReportRow]) {
  let preview = Preview {
    summary,
    spreadsheet_id: &cfg.spreadsheet_id,
    range: &cfg.column_range,
    values: rows,
  };

  match serde_json::to_string_pretty(&preview) {
    Ok(text) => println!("{}", text),
    Err(e) => tracing::warn!(error = %e, "could not render dry-run preview"),
  }
}

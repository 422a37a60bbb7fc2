// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Command-line surface: config location, optional target day/timezone overrides, dry-run, man page
// role: cli/parsing
// inputs: argv
// outputs: Cli (raw flags) normalized into RunOptions consumed by the coordinator
// invariants:
// - --date and --tz are validated by clap before any file or network access
// - Without --date the coordinator reports on yesterday in the effective timezone
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::window::{parse_target_date, ReportZone};

#[derive(Parser, Debug)]
#[command(
    name = "commit-ledger",
    version,
    about = "Append yesterday's commits and their build status to a Google Sheet",
    long_about = None
)]
pub struct Cli {
  /// Path to the YAML run configuration
  #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH)]
  pub config: PathBuf,

  /// Report on this day (YYYY-MM-DD) instead of yesterday
  #[arg(long, value_parser = parse_target_date)]
  pub date: Option<NaiveDate>,

  /// Timezone for the day window and row dates (IANA name or "local"); overrides the config
  #[arg(long, value_parser = ReportZone::parse)]
  pub tz: Option<ReportZone>,

  /// Print the rows as JSON instead of appending them to the spreadsheet
  #[arg(long)]
  pub dry_run: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
  pub config_path: PathBuf,
  pub date: Option<NaiveDate>,
  pub tz: Option<ReportZone>,
  pub dry_run: bool,
}

pub fn normalize(cli: Cli) -> RunOptions {
  RunOptions {
    config_path: cli.config,
    date: cli.date,
    tz: cli.tz,
    dry_run: cli.dry_run,
  }
}

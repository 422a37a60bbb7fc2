use std::process::ExitCode;

use clap::Parser;

use commit_ledger::cli::{normalize, Cli};
use commit_ledger::{coordinator, util};

fn main() -> ExitCode {
  util::init_tracing();
  let cli = Cli::parse();

  if cli.gen_man {
    return match util::render_man_page::<Cli>() {
      Ok(page) => {
        print!("{}", page);
        ExitCode::SUCCESS
      }
      Err(e) => {
        tracing::error!("{:#}", e);
        ExitCode::FAILURE
      }
    };
  }

  tracing::info!("warming up the copier");

  // Phase 1: normalize CLI; Phase 2: run; errors end here and only here
  let opts = normalize(cli);

  match coordinator::execute(&opts) {
    Ok(summary) => {
      if opts.dry_run {
        tracing::info!(rows = summary.rows, date = %summary.date, "dry run complete; spreadsheet untouched");
      } else {
        tracing::info!(rows = summary.rows, date = %summary.date, "updated spreadsheet");
      }
      ExitCode::SUCCESS
    }
    Err(e) => {
      tracing::error!(error = %e, "report run failed");
      ExitCode::FAILURE
    }
  }
}

// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Process-level helpers: tracing subscriber setup and man page rendering
// role: utilities/helpers
// inputs: RUST_LOG; clap CommandFactory
// outputs: Installed global subscriber writing to stderr; man page text
// invariants:
// - init_tracing is idempotent; later calls are no-ops
// - Logs go to stderr so stdout stays clean for --dry-run JSON and --gen-man
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::IsTerminal;

use clap::CommandFactory;
use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global `tracing` subscriber, honoring `RUST_LOG` (default `info`).
pub fn init_tracing() {
  static INIT: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .with_ansi(std::io::stderr().is_terminal())
      .with_target(false)
      .try_init();
  });
  Lazy::force(&INIT);
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}

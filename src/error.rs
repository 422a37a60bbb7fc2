// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed failure taxonomy for a report run (config, credentials, gateways, date window)
// role: errors/taxonomy
// outputs: ReportError and the crate-wide Result alias
// invariants: Every variant is fatal; only main logs and maps errors to an exit code
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReportError {
  /// Config file missing, unreadable, unparsable or semantically invalid.
  #[error("failed to load config {}: {message}", .path.display())]
  ConfigLoad { path: PathBuf, message: String },

  /// A required credential is absent.
  #[error("missing credential: {0}")]
  Auth(String),

  /// Any network/API failure from either gateway, including absent fields
  /// and empty status lists.
  #[error("gateway error: {0}")]
  Gateway(String),

  /// The target date has no representable local midnight.
  #[error("invalid report window: {0}")]
  Window(String),
}

impl ReportError {
  pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
    ReportError::ConfigLoad {
      path: path.into(),
      message: message.into(),
    }
  }

  pub fn gateway(message: impl Into<String>) -> Self {
    ReportError::Gateway(message.into())
  }
}

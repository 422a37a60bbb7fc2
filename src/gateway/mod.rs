// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Trait seams for the two external services (source control, spreadsheet) plus shared HTTP plumbing
// role: gateway/namespace
// outputs: SourceControl and Spreadsheet traits; ureq agent construction; JSON response decoding
// side_effects: None here; implementations perform network calls
// invariants:
// - One blocking request per trait call; no retries
// - Non-2xx responses become ReportError::Gateway carrying the service's own error message when present
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{ReportError, Result};
use crate::ext::serde_json::JsonFetch;
use crate::model::{AppendOutcome, Commit, CommitStatus, ValueRange};

pub mod github;
pub mod sheets;

pub const USER_AGENT: &str = concat!("commit-ledger/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// --- Trait seam for the source-control host ---
pub trait SourceControl {
  /// Commits on `branch` authored in `[since, until]`, newest first as the host returns them.
  fn list_commits(
    &self,
    owner: &str,
    repository: &str,
    branch: &str,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Vec<Commit>>;

  /// Statuses reported against `reference`, most recent first.
  fn list_statuses(
    &self,
    owner: &str,
    repository: &str,
    reference: &str,
    page: u32,
    per_page: u32,
  ) -> Result<Vec<CommitStatus>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
  UserEntered,
}

impl ValueInputOption {
  pub fn as_str(self) -> &'static str {
    match self {
      ValueInputOption::UserEntered => "USER_ENTERED",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertDataOption {
  InsertRows,
}

impl InsertDataOption {
  pub fn as_str(self) -> &'static str {
    match self {
      InsertDataOption::InsertRows => "INSERT_ROWS",
    }
  }
}

// --- Trait seam for the spreadsheet ---
pub trait Spreadsheet {
  fn append_values(
    &self,
    spreadsheet_id: &str,
    range: &str,
    body: &ValueRange,
    input: ValueInputOption,
    insert: InsertDataOption,
  ) -> Result<AppendOutcome>;
}

pub(crate) fn build_agent() -> ureq::Agent {
  ureq::Agent::config_builder()
    .timeout_global(Some(HTTP_TIMEOUT))
    .http_status_as_error(false)
    .build()
    .into()
}

pub(crate) fn parse_base_url(base: &str) -> Result<url::Url> {
  url::Url::parse(base).map_err(|e| ReportError::gateway(format!("invalid API base URL {:?}: {}", base, e)))
}

/// Decode a JSON body, turning transport errors and non-2xx statuses into gateway errors.
pub(crate) fn read_json(
  what: &str,
  response: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<serde_json::Value> {
  read_json_page(what, response).map(|(v, _)| v)
}

/// Like [`read_json`], also returning the `rel="next"` target of the `Link` header.
pub(crate) fn read_json_page(
  what: &str,
  response: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<(serde_json::Value, Option<String>)> {
  let mut response = response.map_err(|e| ReportError::gateway(format!("{} request failed: {}", what, e)))?;
  let status = response.status();
  let next = response
    .headers()
    .get("link")
    .and_then(|h| h.to_str().ok())
    .and_then(parse_next_link);
  let body = response
    .body_mut()
    .read_to_string()
    .map_err(|e| ReportError::gateway(format!("{}: could not read response body: {}", what, e)))?;

  if !status.is_success() {
    let detail = extract_error_message(&body).unwrap_or_else(|| body.trim().to_string());
    return Err(ReportError::gateway(format!(
      "{} returned HTTP {}: {}",
      what,
      status.as_u16(),
      detail
    )));
  }

  let v = serde_json::from_str(&body).map_err(|e| ReportError::gateway(format!("{}: response is not JSON: {}", what, e)))?;
  Ok((v, next))
}

// <https://api.github.com/...&page=2>; rel="next", <...>; rel="last"
pub(crate) fn parse_next_link(header: &str) -> Option<String> {
  header.split(',').find_map(|entry| {
    let mut parts = entry.split(';');
    let target = parts.next()?.trim().strip_prefix('<')?.strip_suffix('>')?;
    let is_next = parts.any(|param| {
      let param = param.trim();
      param
        .strip_prefix("rel=")
        .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
        .unwrap_or(false)
    });
    is_next.then(|| target.to_string())
  })
}

// GitHub: {"message": ...}; Google: {"error": {"message": ...}}
fn extract_error_message(body: &str) -> Option<String> {
  let v: serde_json::Value = serde_json::from_str(body).ok()?;
  v.fetch("message")
    .to::<String>()
    .or_else(|| v.fetch("error.message").to::<String>())
}

/// First non-empty value among the given environment variables.
pub(crate) fn env_token(vars: &[&str]) -> Option<String> {
  vars
    .iter()
    .filter_map(|name| std::env::var(name).ok())
    .map(|t| t.trim().to_string())
    .find(|t| !t.is_empty())
}

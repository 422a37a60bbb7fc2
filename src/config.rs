// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load and validate the run configuration (config.yml) into an immutable RunConfig
// role: config/loader
// inputs: Path to a YAML file with owner/repository/branch/spreadsheetID/columnRange/goTimeFormat/commitTrimLength
// outputs: RunConfig passed by reference to the report builder and coordinator
// side_effects: Reads one file
// invariants:
// - Loaded once per run; never mutated afterwards
// - Required strings are non-empty; trim length > 0; timezone names resolve via chrono-tz
// - Relative sheetsTokenFile paths resolve against the config file's directory
// errors: Every failure is ReportError::ConfigLoad carrying the config path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ReportError, Result};
use crate::layout::DateFormat;
use crate::window::ReportZone;

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const DEFAULT_TRIM_LENGTH: usize = 100;
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEETS_TOKEN_FILE: &str = "token.json";

#[derive(Debug, Clone)]
pub struct RunConfig {
  pub owner: String,
  pub repository: String,
  pub branch: String,
  pub spreadsheet_id: String,
  pub column_range: String,
  pub date_format: DateFormat,
  pub trim_length: usize,
  pub timezone: ReportZone,
  pub github_api_url: String,
  pub sheets_api_url: String,
  pub sheets_token_file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
  owner: String,
  repository: String,
  branch: String,
  #[serde(rename = "spreadsheetID", alias = "spreadsheetId")]
  spreadsheet_id: String,
  column_range: String,
  #[serde(rename = "goTimeFormat", alias = "dateFormat")]
  date_format: DateFormat,
  #[serde(default = "default_trim_length", alias = "trimLength")]
  commit_trim_length: usize,
  #[serde(default)]
  timezone: Option<String>,
  #[serde(default)]
  github_api_url: Option<String>,
  #[serde(default)]
  sheets_api_url: Option<String>,
  #[serde(default)]
  sheets_token_file: Option<PathBuf>,
}

fn default_trim_length() -> usize {
  DEFAULT_TRIM_LENGTH
}

/// Read and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<RunConfig> {
  let text = std::fs::read_to_string(path)
    .map_err(|e| ReportError::config(path, format!("could not read file: {}", e)))?;

  parse_config(&text, path)
}

/// Parse YAML text; `origin` is used for error messages and to anchor relative paths.
pub fn parse_config(text: &str, origin: &Path) -> Result<RunConfig> {
  let raw: RawConfig =
    serde_yaml::from_str(text).map_err(|e| ReportError::config(origin, format!("could not parse YAML: {}", e)))?;

  let required = [
    ("owner", &raw.owner),
    ("repository", &raw.repository),
    ("branch", &raw.branch),
    ("spreadsheetID", &raw.spreadsheet_id),
    ("columnRange", &raw.column_range),
  ];

  for (key, value) in required {
    if value.trim().is_empty() {
      return Err(ReportError::config(origin, format!("{} must not be empty", key)));
    }
  }

  if raw.commit_trim_length == 0 {
    return Err(ReportError::config(origin, "commitTrimLength must be greater than zero"));
  }

  let timezone = match raw.timezone.as_deref().map(str::trim) {
    None | Some("") => ReportZone::Local,
    Some(name) => ReportZone::parse(name).map_err(|e| ReportError::config(origin, e))?,
  };

  let base_dir = origin.parent().unwrap_or_else(|| Path::new(""));
  let token_file = raw
    .sheets_token_file
    .unwrap_or_else(|| PathBuf::from(DEFAULT_SHEETS_TOKEN_FILE));
  let sheets_token_file = if token_file.is_absolute() {
    token_file
  } else {
    base_dir.join(token_file)
  };

  Ok(RunConfig {
    owner: raw.owner.trim().to_string(),
    repository: raw.repository.trim().to_string(),
    branch: raw.branch.trim().to_string(),
    spreadsheet_id: raw.spreadsheet_id.trim().to_string(),
    column_range: raw.column_range.trim().to_string(),
    date_format: raw.date_format,
    trim_length: raw.commit_trim_length,
    timezone,
    github_api_url: trim_base_url(raw.github_api_url, DEFAULT_GITHUB_API_URL),
    sheets_api_url: trim_base_url(raw.sheets_api_url, DEFAULT_SHEETS_API_URL),
    sheets_token_file,
  })
}

fn trim_base_url(value: Option<String>, default: &str) -> String {
  value
    .map(|s| s.trim().trim_end_matches('/').to_string())
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| default.to_string())
}

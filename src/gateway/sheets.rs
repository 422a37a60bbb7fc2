// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Google Sheets v4 REST implementation of Spreadsheet (values.append)
// role: gateway/sheets
// inputs: API base URL from config; bearer token from SHEETS_ACCESS_TOKEN or the stored OAuth token file
// outputs: AppendOutcome (updated range and row count as reported by Sheets)
// side_effects: One POST per append; reads the token file when the env var is unset
// invariants:
// - Range is sent as a single encoded path segment suffixed with ":append"
// - valueInputOption and insertDataOption are always sent explicitly
// errors: ReportError::Auth for missing/unusable credentials; ReportError::Gateway for request failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use super::{
  build_agent, env_token, parse_base_url, read_json, InsertDataOption, Spreadsheet, ValueInputOption, USER_AGENT,
};
use crate::error::{ReportError, Result};
use crate::ext::serde_json::JsonFetch;
use crate::model::{AppendOutcome, ValueRange};

pub const TOKEN_VAR: &str = "SHEETS_ACCESS_TOKEN";

/// Sheets bearer token: the env var wins, otherwise `access_token` from the OAuth token file.
pub fn sheets_token(token_file: &Path) -> Result<String> {
  if let Some(t) = env_token(&[TOKEN_VAR]) {
    return Ok(t);
  }

  let text = std::fs::read_to_string(token_file).map_err(|e| {
    ReportError::Auth(format!(
      "set {} or provide an OAuth token file at {} ({})",
      TOKEN_VAR,
      token_file.display(),
      e
    ))
  })?;

  let v: serde_json::Value = serde_json::from_str(&text)
    .map_err(|e| ReportError::Auth(format!("token file {} is not JSON: {}", token_file.display(), e)))?;

  v.fetch("access_token")
    .to::<String>()
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
    .ok_or_else(|| ReportError::Auth(format!("token file {} has no access_token", token_file.display())))
}

pub struct SheetsHttpApi {
  base_url: url::Url,
  token: String,
  agent: ureq::Agent,
}

impl std::fmt::Debug for SheetsHttpApi {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SheetsHttpApi")
      .field("base_url", &self.base_url.as_str())
      .field("token", &"[REDACTED]")
      .finish()
  }
}

impl SheetsHttpApi {
  pub fn new(base_url: &str, token: String) -> Result<Self> {
    Ok(Self {
      base_url: parse_base_url(base_url)?,
      token,
      agent: build_agent(),
    })
  }

  fn append_url(
    &self,
    spreadsheet_id: &str,
    range: &str,
    input: ValueInputOption,
    insert: InsertDataOption,
  ) -> Result<url::Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| ReportError::gateway(format!("API base URL {} cannot carry a path", self.base_url)))?
      .pop_if_empty()
      .extend(["v4", "spreadsheets", spreadsheet_id, "values"])
      .push(&format!("{}:append", range));
    url
      .query_pairs_mut()
      .append_pair("valueInputOption", input.as_str())
      .append_pair("insertDataOption", insert.as_str());
    Ok(url)
  }
}

impl Spreadsheet for SheetsHttpApi {
  fn append_values(
    &self,
    spreadsheet_id: &str,
    range: &str,
    body: &ValueRange,
    input: ValueInputOption,
    insert: InsertDataOption,
  ) -> Result<AppendOutcome> {
    let url = self.append_url(spreadsheet_id, range, input, insert)?;
    tracing::debug!(url = %url, rows = body.values.len(), "POST");

    let response = self
      .agent
      .post(url.as_str())
      .header("Accept", "application/json")
      .header("User-Agent", USER_AGENT)
      .header("Authorization", &format!("Bearer {}", self.token))
      .send_json(body);

    let v = read_json("append values", response)?;

    Ok(AppendOutcome {
      updated_range: v.fetch("updates.updatedRange").to::<String>(),
      updated_rows: v.fetch("updates.updatedRows").to_or_default::<u64>(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn append_url_encodes_range_and_options() {
    let api = SheetsHttpApi::new("https://sheets.googleapis.com", "t".into()).unwrap();
    let url = api
      .append_url("abc", "Daily Log!A:E", ValueInputOption::UserEntered, InsertDataOption::InsertRows)
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://sheets.googleapis.com/v4/spreadsheets/abc/values/Daily%20Log!A:E:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS"
    );
  }

  #[test]
  #[serial]
  fn token_prefers_env_then_file() {
    let td = tempfile::TempDir::new().unwrap();
    let file = td.path().join("token.json");
    std::fs::write(&file, r#"{"access_token":"from-file","token_type":"Bearer"}"#).unwrap();

    std::env::set_var(TOKEN_VAR, "from-env");
    assert_eq!(sheets_token(&file).unwrap(), "from-env");

    std::env::remove_var(TOKEN_VAR);
    assert_eq!(sheets_token(&file).unwrap(), "from-file");
  }

  #[test]
  #[serial]
  fn missing_token_everywhere_is_auth_error() {
    std::env::remove_var(TOKEN_VAR);
    let td = tempfile::TempDir::new().unwrap();
    let err = sheets_token(&td.path().join("token.json")).unwrap_err();
    assert!(matches!(err, ReportError::Auth(_)));
    assert!(err.to_string().contains(TOKEN_VAR));

    let empty = td.path().join("empty.json");
    std::fs::write(&empty, r#"{"access_token":""}"#).unwrap();
    assert!(matches!(sheets_token(&empty).unwrap_err(), ReportError::Auth(_)));
  }
}

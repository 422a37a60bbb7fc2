// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Types shared by the gateways and the report builder (commits, statuses, rows, Sheets payloads)
// role: model/types
// outputs: Commit, CommitStatus, BuildStatus, ReportRow, ValueRange, AppendOutcome
// invariants:
// - ReportRow serializes as ["", "", date, message, code] in that column order
// - BuildStatus::Success is code 0; everything else is 1
// - ValueRange wire names follow the Sheets v4 REST API (majorDimension/values)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

pub const SUCCESS_STATE: &str = "success";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
  pub sha: String,
  pub author_date: DateTime<Utc>,
  pub message: String,
}

/// One entry of a commit's status list; only the state is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitStatus {
  pub state: String,
  #[serde(default)]
  pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
  Success,
  NotSuccess,
}

impl BuildStatus {
  pub fn from_state(state: &str) -> Self {
    if state == SUCCESS_STATE {
      BuildStatus::Success
    } else {
      BuildStatus::NotSuccess
    }
  }

  /// Spreadsheet encoding: 0 = good, nonzero = attention needed.
  pub fn code(self) -> u8 {
    match self {
      BuildStatus::Success => 0,
      BuildStatus::NotSuccess => 1,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
  pub date: String,
  pub message: String,
  pub status: BuildStatus,
}

impl Serialize for ReportRow {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(5))?;
    seq.serialize_element("")?;
    seq.serialize_element("")?;
    seq.serialize_element(&self.date)?;
    seq.serialize_element(&self.message)?;
    seq.serialize_element(&self.status.code())?;
    seq.end()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MajorDimension {
  #[serde(rename = "ROWS")]
  Rows,
}

/// Request body of `spreadsheets.values.append`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
  pub major_dimension: MajorDimension,
  pub values: Vec<ReportRow>,
}

impl ValueRange {
  pub fn rows(values: Vec<ReportRow>) -> Self {
    Self {
      major_dimension: MajorDimension::Rows,
      values,
    }
  }
}

/// What the spreadsheet reported back after an append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
  pub updated_range: Option<String>,
  pub updated_rows: u64,
}

use std::path::PathBuf;

pub const LONG_MESSAGE: &str = "first commit message that is exactly long enough to need trimming because it exceeds one hundred characters in total length";

/// Write a config.yml into `dir`; `extra` is appended verbatim (overrides, API URLs).
#[allow(dead_code)]
pub fn write_config(dir: &std::path::Path, extra: &str) -> PathBuf {
  let path = dir.join("config.yml");
  let text = format!(
    "owner: o\nrepository: r\nbranch: main\nspreadsheetID: sheet-1\ncolumnRange: Log!A:E\ngoTimeFormat: \"02.01.2006\"\ncommitTrimLength: 100\n{}",
    extra
  );
  std::fs::write(&path, text).unwrap();
  path
}

/// GitHub list-commits item with only the fields the report reads.
#[allow(dead_code)]
pub fn commit_json(sha: &str, date: &str, message: &str) -> serde_json::Value {
  serde_json::json!({
    "sha": sha,
    "commit": {
      "message": message,
      "author": { "name": "Fixture Bot", "email": "fixture@example.com", "date": date }
    }
  })
}

#[allow(dead_code)]
pub fn init_tracing() {
  commit_ledger::util::init_tracing();
}

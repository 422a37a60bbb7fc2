// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path lookups into GitHub/Sheets JSON payloads with typed extraction
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper (optional, defaulted or required extraction)
// invariants: No panics; missing paths yield None; `require` names the missing path in its error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

use crate::error::ReportError;

/// A JSON location resolved by [`JsonFetch::fetch`], extracted in a second step.
pub struct JsonFetched<'a> {
  path: String,
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self
      .inner
      .filter(|v| !v.is_null())
      .and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Existence check for response fields the report cannot do without.
  ///
  /// `what` names the payload (e.g. "commit") so the error reads
  /// `commit response is missing commit.author.date`.
  pub fn require<T>(&self, what: &str) -> Result<T, ReportError>
  where
    T: DeserializeOwned,
  {
    self
      .to::<T>()
      .ok_or_else(|| ReportError::gateway(format!("{} response is missing {}", what, self.path)))
  }
}

pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    let mut cur = Some(self);

    if !path.is_empty() {
      for key in path.split('.') {
        cur = cur.and_then(|v| v.get(key));
      }
    }

    JsonFetched {
      path: path.to_string(),
      inner: cur,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fetch_nested_commit_fields() {
    let v: serde_json::Value = serde_json::json!({
      "sha": "abc123",
      "commit": { "message": "fix: tidy", "author": { "date": "2025-08-12T14:03:00Z" } }
    });

    assert_eq!(v.fetch("sha").to::<String>().as_deref(), Some("abc123"));
    assert_eq!(v.fetch("commit.author.date").to::<String>().as_deref(), Some("2025-08-12T14:03:00Z"));
    assert_eq!(v.fetch("commit.committer.date").to::<String>(), None);
    assert!(v.fetch("").to::<serde_json::Value>().is_some());
  }

  #[test]
  fn null_is_treated_as_missing() {
    let v = serde_json::json!({ "commit": { "author": null } });
    assert_eq!(v.fetch("commit.author").to::<serde_json::Value>(), None);
    let s: String = v.fetch("commit.message").to_or_default();
    assert_eq!(s, "");
  }

  #[test]
  fn require_names_the_missing_path() {
    let v = serde_json::json!({ "sha": "abc" });
    let err = v.fetch("commit.message").require::<String>("commit").unwrap_err();
    assert!(matches!(err, ReportError::Gateway(_)));
    assert_eq!(err.to_string(), "gateway error: commit response is missing commit.message");
  }
}

// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build the day's report rows: fetch commits in the window, resolve build status per commit, trim and format
// role: report/builder
// inputs: RunConfig, DayWindow, SourceControl gateway, reporting timezone
// outputs: Vec<ReportRow> ordered oldest-first
// side_effects: One list-commits call and one list-statuses call per commit (sequential)
// invariants:
// - Row count equals the number of in-window commits; rows are the reverse of gateway order
// - Commits authored outside [window.start, window.end] never produce a row
// - An empty status list is an explicit gateway error, never an unchecked index
// - Trimming counts chars (Unicode scalar values) and never splits UTF-8
// errors: Propagates ReportError from gateways unchanged
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Display;

use chrono::TimeZone;

use crate::config::RunConfig;
use crate::error::{ReportError, Result};
use crate::gateway::SourceControl;
use crate::model::{BuildStatus, Commit, ReportRow};
use crate::window::DayWindow;

/// Only the most recent status entry is consulted.
const STATUS_PAGE: u32 = 1;
const STATUS_PER_PAGE: u32 = 1;

/// Commits on the configured branch authored inside `window`, in gateway order.
pub fn fetch_commits<Tz: TimeZone>(
  scm: &dyn SourceControl,
  cfg: &RunConfig,
  window: &DayWindow<Tz>,
) -> Result<Vec<Commit>> {
  let commits = scm.list_commits(
    &cfg.owner,
    &cfg.repository,
    &cfg.branch,
    window.start_utc(),
    window.end_utc(),
  )?;

  let total = commits.len();
  let kept: Vec<Commit> = commits
    .into_iter()
    .filter(|c| {
      let inside = window.contains(&c.author_date);
      if !inside {
        tracing::warn!(sha = %c.sha, author_date = %c.author_date, "dropping commit authored outside the window");
      }
      inside
    })
    .collect();

  tracing::info!(returned = total, kept = kept.len(), branch = %cfg.branch, "fetched commits");

  Ok(kept)
}

/// Latest build status for `reference`.
pub fn resolve_status(scm: &dyn SourceControl, cfg: &RunConfig, reference: &str) -> Result<BuildStatus> {
  let statuses = scm.list_statuses(&cfg.owner, &cfg.repository, reference, STATUS_PAGE, STATUS_PER_PAGE)?;

  let latest = statuses
    .first()
    .ok_or_else(|| ReportError::gateway(format!("no status entries for ref {}", reference)))?;

  let status = BuildStatus::from_state(&latest.state);
  tracing::debug!(reference, state = %latest.state, code = status.code(), "resolved status");

  Ok(status)
}

/// Blunt truncation to at most `limit` chars.
pub fn trim_message(message: &str, limit: usize) -> String {
  match message.char_indices().nth(limit) {
    Some((cut, _)) => message[..cut].to_string(),
    None => message.to_string(),
  }
}

/// One row per commit, oldest first. `statuses[i]` belongs to `commits[i]`.
pub fn format_rows<Tz>(commits: &[Commit], statuses: &[BuildStatus], cfg: &RunConfig, tz: &Tz) -> Vec<ReportRow>
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  commits
    .iter()
    .zip(statuses.iter())
    .rev()
    .map(|(commit, status)| ReportRow {
      date: cfg.date_format.render(&commit.author_date.with_timezone(tz)),
      message: trim_message(&commit.message, cfg.trim_length),
      status: *status,
    })
    .collect()
}

/// Fetch, resolve and format the rows for `window`.
///
/// Any gateway error aborts the whole build; no partial row set is returned.
pub fn build_rows<Tz>(scm: &dyn SourceControl, cfg: &RunConfig, window: &DayWindow<Tz>, tz: &Tz) -> Result<Vec<ReportRow>>
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  let commits = fetch_commits(scm, cfg, window)?;

  let mut statuses = Vec::with_capacity(commits.len());
  for commit in &commits {
    statuses.push(resolve_status(scm, cfg, &commit.sha)?);
  }

  Ok(format_rows(&commits, &statuses, cfg, tz))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::parse_config;
  use crate::model::CommitStatus;
  use crate::window::compute_window;
  use chrono::{DateTime, NaiveDate, Utc};
  use proptest::prelude::*;
  use std::cell::RefCell;
  use std::collections::HashMap;
  use std::path::Path;

  fn cfg() -> RunConfig {
    parse_config(
      "owner: o\nrepository: r\nbranch: main\nspreadsheetID: s\ncolumnRange: A:E\ngoTimeFormat: \"02.01.2006 15:04\"\ncommitTrimLength: 10\n",
      Path::new("config.yml"),
    )
    .unwrap()
  }

  fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 12, h, m, s).unwrap()
  }

  fn commit(sha: &str, date: DateTime<Utc>, message: &str) -> Commit {
    Commit {
      sha: sha.into(),
      author_date: date,
      message: message.into(),
    }
  }

  #[derive(Default)]
  struct FakeScm {
    commits: Vec<Commit>,
    states: HashMap<String, Vec<&'static str>>,
    status_calls: RefCell<Vec<(String, u32, u32)>>,
  }

  impl SourceControl for FakeScm {
    fn list_commits(&self, _: &str, _: &str, _: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<Commit>> {
      Ok(self.commits.clone())
    }

    fn list_statuses(&self, _: &str, _: &str, reference: &str, page: u32, per_page: u32) -> Result<Vec<CommitStatus>> {
      self.status_calls.borrow_mut().push((reference.to_string(), page, per_page));
      match self.states.get(reference) {
        Some(states) => Ok(
          states
            .iter()
            .map(|s| CommitStatus {
              state: s.to_string(),
              context: None,
            })
            .collect(),
        ),
        None => Err(ReportError::gateway(format!("HTTP 404 for {}", reference))),
      }
    }
  }

  #[test]
  fn trim_keeps_short_messages_and_cuts_long_ones() {
    assert_eq!(trim_message("short", 10), "short");
    assert_eq!(trim_message("exactly10!", 10), "exactly10!");
    assert_eq!(trim_message("eleven chars", 10), "eleven cha");
    assert_eq!(trim_message("anything", 0), "");
  }

  #[test]
  fn trim_counts_chars_not_bytes() {
    assert_eq!(trim_message("héllo wörld", 7), "héllo w");
    assert_eq!(trim_message("日本語のコミット", 3), "日本語");
  }

  proptest! {
    #[test]
    fn trim_never_exceeds_limit(message in ".{0,200}", limit in 0usize..150) {
      let out = trim_message(&message, limit);
      prop_assert!(out.chars().count() <= limit);
      prop_assert!(message.starts_with(&out));
      if message.chars().count() <= limit {
        prop_assert_eq!(out, message);
      }
    }
  }

  #[test]
  fn status_uses_single_latest_entry() {
    let mut scm = FakeScm::default();
    scm.states.insert("ok".into(), vec!["success", "failure"]);
    scm.states.insert("bad".into(), vec!["failure", "success"]);
    scm.states.insert("wait".into(), vec!["pending"]);

    assert_eq!(resolve_status(&scm, &cfg(), "ok").unwrap(), BuildStatus::Success);
    assert_eq!(resolve_status(&scm, &cfg(), "bad").unwrap(), BuildStatus::NotSuccess);
    assert_eq!(resolve_status(&scm, &cfg(), "wait").unwrap(), BuildStatus::NotSuccess);
    assert!(scm.status_calls.borrow().iter().all(|(_, page, per)| *page == 1 && *per == 1));
  }

  #[test]
  fn empty_status_list_is_an_explicit_error() {
    let mut scm = FakeScm::default();
    scm.states.insert("lonely".into(), vec![]);

    let err = resolve_status(&scm, &cfg(), "lonely").unwrap_err();
    assert!(matches!(err, ReportError::Gateway(_)));
    assert_eq!(err.to_string(), "gateway error: no status entries for ref lonely");
  }

  #[test]
  fn format_rows_reverses_and_formats_in_zone() {
    let commits = vec![
      commit("c3", at(18, 45, 0), "third"),
      commit("c2", at(12, 0, 0), "second commit is long"),
      commit("c1", at(6, 30, 0), "first"),
    ];
    let statuses = vec![BuildStatus::Success, BuildStatus::NotSuccess, BuildStatus::Success];
    let tz = chrono::FixedOffset::east_opt(3600).unwrap();

    let rows = format_rows(&commits, &statuses, &cfg(), &tz);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].date, "12.08.2025 07:30");
    assert_eq!(rows[0].message, "first");
    assert_eq!(rows[1].message, "second com");
    assert_eq!(rows[1].status, BuildStatus::NotSuccess);
    assert_eq!(rows[2].date, "12.08.2025 19:45");
    assert_eq!(rows[2].status, BuildStatus::Success);
  }

  #[test]
  fn fetch_drops_commits_outside_the_window() {
    let scm = FakeScm {
      commits: vec![
        commit("late", at(23, 59, 30), "after the 23:59:00 bound"),
        commit("edge", at(23, 59, 0), "on the bound"),
        commit("early", at(0, 0, 0), "at midnight"),
      ],
      ..Default::default()
    };
    let window = compute_window(NaiveDate::from_ymd_opt(2025, 8, 12).unwrap(), &Utc).unwrap();

    let kept = fetch_commits(&scm, &cfg(), &window).unwrap();
    let shas: Vec<&str> = kept.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["edge", "early"]);
  }

  #[test]
  fn dropped_commits_are_reported_at_warn() {
    let scm = FakeScm {
      commits: vec![commit("late", at(23, 59, 30), "after the bound"), commit("kept", at(9, 0, 0), "inside")],
      ..Default::default()
    };
    let window = compute_window(NaiveDate::from_ymd_opt(2025, 8, 12).unwrap(), &Utc).unwrap();

    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
    impl std::io::Write for SharedBuf {
      fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(data)
      }
      fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
      }
    }

    let buf = std::sync::Arc::new(std::sync::Mutex::new(Vec::<u8>::new()));
    let writer_buf = buf.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(move || SharedBuf(writer_buf.clone()))
      .with_ansi(false)
      .with_max_level(tracing::Level::WARN)
      .finish();
    let kept = tracing::subscriber::with_default(subscriber, || fetch_commits(&scm, &cfg(), &window)).unwrap();

    assert_eq!(kept.len(), 1);
    let logged = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    assert!(logged.contains("WARN"), "{}", logged);
    assert!(logged.contains("late"), "{}", logged);
    assert!(!logged.contains("kept"), "{}", logged);
  }

  #[test]
  fn build_rows_aborts_on_first_status_failure() {
    let mut scm = FakeScm {
      commits: vec![commit("c2", at(15, 0, 0), "two"), commit("c1", at(9, 0, 0), "one")],
      ..Default::default()
    };
    scm.states.insert("c2".into(), vec!["success"]);
    let window = compute_window(NaiveDate::from_ymd_opt(2025, 8, 12).unwrap(), &Utc).unwrap();

    let err = build_rows(&scm, &cfg(), &window, &Utc).unwrap_err();
    assert!(err.to_string().contains("c1"));
    assert_eq!(scm.status_calls.borrow().len(), 2);
  }
}

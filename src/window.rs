// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Compute the single-day report window and resolve the reporting timezone
// role: time/windowing
// inputs: Target calendar date; a chrono TimeZone (Local or a chrono-tz zone from config)
// outputs: DayWindow { start, end } and the default target date (yesterday)
// invariants:
// - start is the target date at 00:00:00 and end at 23:59:00 in the zone; both bounds inclusive
// - Seconds 23:59:01..=23:59:59 fall outside the window
// - A DST gap at a bound shifts forward to the first valid instant; an ambiguous bound takes the earlier instant
// errors: ReportError::Window when a bound cannot be represented
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{ReportError, Result};

/// Timezone the report window and row dates are computed in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReportZone {
  Local,
  Named(chrono_tz::Tz),
}

impl ReportZone {
  pub fn parse(name: &str) -> std::result::Result<Self, String> {
    if name.eq_ignore_ascii_case("local") {
      return Ok(ReportZone::Local);
    }

    name
      .parse::<chrono_tz::Tz>()
      .map(ReportZone::Named)
      .map_err(|_| format!("unknown timezone {:?}", name))
  }

  /// Calendar date of `now` as seen in this zone.
  pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
    match self {
      ReportZone::Local => now.with_timezone(&chrono::Local).date_naive(),
      ReportZone::Named(tz) => now.with_timezone(tz).date_naive(),
    }
  }
}

impl fmt::Display for ReportZone {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReportZone::Local => f.write_str("local"),
      ReportZone::Named(tz) => write!(f, "{}", tz.name()),
    }
  }
}

#[derive(Clone, Debug)]
pub struct DayWindow<Tz: TimeZone> {
  pub date: NaiveDate,
  pub start: DateTime<Tz>,
  pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> DayWindow<Tz> {
  pub fn start_utc(&self) -> DateTime<Utc> {
    self.start.with_timezone(&Utc)
  }

  pub fn end_utc(&self) -> DateTime<Utc> {
    self.end.with_timezone(&Utc)
  }

  pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
    self.start_utc() <= *instant && *instant <= self.end_utc()
  }
}

/// The window for `date`: [00:00:00, 23:59:00] in `tz`.
pub fn compute_window<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DayWindow<Tz>> {
  let bound = |h, m| {
    date
      .and_hms_opt(h, m, 0)
      .ok_or_else(|| ReportError::Window(format!("{} has no {:02}:{:02}", date, h, m)))
  };
  let start = resolve_local(tz, bound(0, 0)?)?;
  let end = resolve_local(tz, bound(23, 59)?)?;

  Ok(DayWindow { date, start, end })
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
  match tz.from_local_datetime(&naive) {
    LocalResult::Single(dt) => Ok(dt),
    LocalResult::Ambiguous(earliest, _) => Ok(earliest),
    LocalResult::None => {
      // Gaps are at most an hour in practice; step forward a minute at a time.
      for minutes in 1..=120 {
        if let Some(dt) = tz.from_local_datetime(&(naive + Duration::minutes(minutes))).earliest() {
          return Ok(dt);
        }
      }
      Err(ReportError::Window(format!("{} does not exist in the report timezone", naive)))
    }
  }
}

/// The day before `today`; the default report target.
pub fn previous_day(today: NaiveDate) -> Result<NaiveDate> {
  today
    .pred_opt()
    .ok_or_else(|| ReportError::Window(format!("no day precedes {}", today)))
}

/// Parse a `--date` value (YYYY-MM-DD).
pub fn parse_target_date(raw: &str) -> std::result::Result<NaiveDate, String> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("invalid date {:?} (expected YYYY-MM-DD): {}", raw, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{FixedOffset, Timelike};

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn window_spans_midnight_to_2359_exactly() {
    let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
    let w = compute_window(date(2025, 8, 12), &tz).unwrap();

    assert_eq!(w.start, tz.with_ymd_and_hms(2025, 8, 12, 0, 0, 0).single().unwrap());
    assert_eq!(w.end, tz.with_ymd_and_hms(2025, 8, 12, 23, 59, 0).single().unwrap());
    assert_eq!(w.end.second(), 0);
  }

  #[test]
  fn last_minute_seconds_are_excluded() {
    let w = compute_window(date(2025, 8, 12), &Utc).unwrap();

    assert!(w.contains(&Utc.with_ymd_and_hms(2025, 8, 12, 0, 0, 0).unwrap()));
    assert!(w.contains(&Utc.with_ymd_and_hms(2025, 8, 12, 23, 59, 0).unwrap()));
    assert!(!w.contains(&Utc.with_ymd_and_hms(2025, 8, 12, 23, 59, 1).unwrap()));
    assert!(!w.contains(&Utc.with_ymd_and_hms(2025, 8, 11, 23, 59, 59).unwrap()));
  }

  #[test]
  fn window_in_local_zone_starts_at_local_midnight() {
    let w = compute_window(date(2025, 3, 4), &chrono::Local).unwrap();
    assert_eq!(w.start.naive_local(), date(2025, 3, 4).and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(w.end.naive_local(), date(2025, 3, 4).and_hms_opt(23, 59, 0).unwrap());
  }

  #[test]
  fn dst_gap_at_midnight_moves_forward() {
    // America/Santiago springs forward at 00:00 -> 01:00 on 2024-09-08.
    let tz = chrono_tz::America::Santiago;
    let w = compute_window(date(2024, 9, 8), &tz).unwrap();
    assert_eq!(w.start.naive_local(), date(2024, 9, 8).and_hms_opt(1, 0, 0).unwrap());
    assert_eq!(w.end.naive_local(), date(2024, 9, 8).and_hms_opt(23, 59, 0).unwrap());
  }

  #[test]
  fn previous_day_crosses_month_and_year() {
    assert_eq!(previous_day(date(2025, 3, 1)).unwrap(), date(2025, 2, 28));
    assert_eq!(previous_day(date(2025, 1, 1)).unwrap(), date(2024, 12, 31));
  }

  #[test]
  fn zone_today_uses_the_zone_calendar() {
    let now = Utc.with_ymd_and_hms(2025, 8, 12, 23, 30, 0).unwrap();
    let tokyo = ReportZone::parse("Asia/Tokyo").unwrap();
    assert_eq!(tokyo.today(now), date(2025, 8, 13));
    assert_eq!(ReportZone::parse("UTC").unwrap().today(now), date(2025, 8, 12));
    assert_eq!(ReportZone::parse("local").unwrap(), ReportZone::Local);
    assert!(ReportZone::parse("Nowhere/Special").is_err());
  }

  #[test]
  fn parse_target_date_accepts_iso_days_only() {
    assert_eq!(parse_target_date("2025-08-12").unwrap(), date(2025, 8, 12));
    assert!(parse_target_date("12.08.2025").is_err());
  }
}

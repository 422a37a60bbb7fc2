// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Date format handling for report rows: Go reference layouts (goTimeFormat) or chrono strftime strings
// role: formatting/date-layout
// inputs: Raw format string from config.yml
// outputs: DateFormat holding a validated chrono format string
// invariants:
// - A string containing '%' is taken as strftime verbatim; anything else is a Go layout
// - Construction rejects formats chrono cannot render, so `render` never panics
// - Go's Z07:00-style offsets print "Z" at a zero offset, numeric otherwise
// errors: String messages surfaced by config loading as ConfigLoad
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Display;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Offset, TimeZone};
use serde::Deserialize;

// Longest tokens first so that e.g. "2006" wins over "2" and "January" over "Jan".
// The third column marks Go's Z-prefixed offsets, which print a literal "Z" for UTC.
const GO_TOKENS: &[(&str, &str, bool)] = &[
  (".000000000", "%.9f", false),
  ("Z07:00:00", "%::z", true),
  ("-07:00:00", "%::z", false),
  (".000000", "%.6f", false),
  ("January", "%B", false),
  ("Monday", "%A", false),
  ("Z07:00", "%:z", true),
  ("-07:00", "%:z", false),
  ("_2006", "_%Y", false),
  ("Z0700", "%z", true),
  ("-0700", "%z", false),
  ("2006", "%Y", false),
  (".000", "%.3f", false),
  ("Jan", "%b", false),
  ("Mon", "%a", false),
  ("MST", "%Z", false),
  ("002", "%j", false),
  ("Z07", "%:::z", true),
  ("-07", "%:::z", false),
  ("01", "%m", false),
  ("02", "%d", false),
  ("03", "%I", false),
  ("04", "%M", false),
  ("05", "%S", false),
  ("06", "%y", false),
  ("15", "%H", false),
  ("_2", "%e", false),
  ("PM", "%p", false),
  ("pm", "%P", false),
  ("1", "%-m", false),
  ("2", "%-d", false),
  ("3", "%-I", false),
  ("4", "%-M", false),
  ("5", "%-S", false),
];

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
  Chrono(String),
  /// Offset spec rendered as "Z" when the offset is zero.
  Zulu(&'static str),
}

fn go_layout_pieces(layout: &str) -> Vec<Piece> {
  let mut pieces = Vec::new();
  let mut cur = String::with_capacity(layout.len() * 2);
  let mut rest = layout;

  'outer: while !rest.is_empty() {
    for (token, spec, zulu) in GO_TOKENS {
      if let Some(tail) = rest.strip_prefix(token) {
        if *zulu {
          if !cur.is_empty() {
            pieces.push(Piece::Chrono(std::mem::take(&mut cur)));
          }
          pieces.push(Piece::Zulu(*spec));
        } else {
          cur.push_str(spec);
        }
        rest = tail;
        continue 'outer;
      }
    }

    let mut chars = rest.chars();
    if let Some(c) = chars.next() {
      if c == '%' {
        cur.push_str("%%");
      } else {
        cur.push(c);
      }
    }
    rest = chars.as_str();
  }

  if !cur.is_empty() {
    pieces.push(Piece::Chrono(cur));
  }
  pieces
}

/// Translate a Go reference layout (`Mon Jan 2 15:04:05 MST 2006`) into a chrono format string.
///
/// Literal text is copied through, with `%` escaped. Z-prefixed offsets map to the
/// numeric chrono spec; [`DateFormat::render`] prints "Z" for them at UTC.
pub fn go_layout_to_chrono(layout: &str) -> String {
  join_pieces(&go_layout_pieces(layout))
}

fn join_pieces(pieces: &[Piece]) -> String {
  pieces
    .iter()
    .map(|p| match p {
      Piece::Chrono(s) => s.as_str(),
      Piece::Zulu(spec) => *spec,
    })
    .collect()
}

/// Validated date format used for the row's date column.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct DateFormat {
  chrono: String,
  pieces: Vec<Piece>,
}

impl DateFormat {
  pub fn parse(raw: &str) -> Result<Self, String> {
    if raw.trim().is_empty() {
      return Err("date format is empty".into());
    }

    let pieces = if raw.contains('%') {
      vec![Piece::Chrono(raw.to_string())]
    } else {
      go_layout_pieces(raw)
    };
    let chrono = join_pieces(&pieces);

    if StrftimeItems::new(&chrono).any(|item| matches!(item, Item::Error)) {
      return Err(format!("unsupported date format {:?}", raw));
    }

    Ok(Self { chrono, pieces })
  }

  pub fn chrono_format(&self) -> &str {
    &self.chrono
  }

  pub fn render<Tz>(&self, dt: &DateTime<Tz>) -> String
  where
    Tz: TimeZone,
    Tz::Offset: Display,
  {
    let utc = dt.offset().fix().local_minus_utc() == 0;

    self
      .pieces
      .iter()
      .map(|p| match p {
        Piece::Zulu(_) if utc => "Z".to_string(),
        Piece::Zulu(spec) => dt.format(spec).to_string(),
        Piece::Chrono(s) => dt.format(s).to_string(),
      })
      .collect()
  }
}

impl TryFrom<String> for DateFormat {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    DateFormat::parse(&value)
  }
}

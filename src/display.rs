use crate::types::StatusRecord;
use chrono::{DateTime, TimeZone, Utc};
use console::Style;
use std::{borrow::Cow, fmt};
use unicode_segmentation::UnicodeSegmentation;

/// Rendered in place of an absent value.
pub const NONE: &str = "-";

/// Relative time from a given now.
pub trait RelativeTo {
    fn relative_to(&self, now: &DateTime<Utc>) -> Since;
}

impl<T> RelativeTo for DateTime<T>
where
    T: TimeZone,
{
    fn relative_to(&self, now: &DateTime<Utc>) -> Since {
        let duration = now.signed_duration_since(self.clone());
        Since(duration)
    }
}

/// Formats an optional timestamp relative to `now`, `-` when absent.
pub fn format_relative(at: Option<&DateTime<Utc>>, now: &DateTime<Utc>) -> String {
    match at {
        Some(at) => at.relative_to(now).to_string(),
        None => NONE.to_owned(),
    }
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Since(chrono::Duration);

/// Coarse unit an elapsed duration is reported in.
///
/// Variants are ordered from the finest to the coarsest unit, so the derived ordering follows
/// elapsed time.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
pub enum Bucket {
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks(i64),
    Months(i64),
    Years(i64),
}

impl Since {
    pub fn bucket(&self) -> Bucket {
        let seconds = self.0.num_seconds();
        if seconds < 60 {
            return Bucket::Minutes(1);
        }
        let minutes = seconds / 60;
        if minutes < 60 {
            return Bucket::Minutes(minutes);
        }
        let hours = minutes / 60;
        if hours < 24 {
            return Bucket::Hours(hours);
        }
        let days = hours / 24;
        if days < 7 {
            return Bucket::Days(days);
        }
        let weeks = days / 7;
        if weeks < 5 {
            return Bucket::Weeks(weeks);
        }
        let months = days / 30;
        if months < 12 {
            return Bucket::Months(months);
        }
        // 360 to 364 days are 12 months but not yet a year
        Bucket::Years((days / 365).max(1))
    }
}

impl fmt::Display for Since {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bucket() {
            Bucket::Minutes(n) => write!(f, "{n} min ago"),
            Bucket::Hours(n) => write!(f, "{n} hr ago"),
            Bucket::Days(1) => write!(f, "1 day ago"),
            Bucket::Days(n) => write!(f, "{n} days ago"),
            Bucket::Weeks(n) => write!(f, "{n} wk ago"),
            Bucket::Months(n) => write!(f, "{n} mo ago"),
            Bucket::Years(n) => write!(f, "{n} yr ago"),
        }
    }
}


/// Horizontal alignment of a table column.
#[derive(PartialEq, Copy, Clone, Debug)]
enum Align {
    Left,
    Right,
}

/// Role of a cell, mapped to a color by [Palette].
#[derive(PartialEq, Copy, Clone, Debug)]
enum Tone {
    Header,
    Muted,
    Issues,
    PullRequests,
    Stars,
    Release,
    Accent,
}

/// Applies colors when enabled, otherwise passes text through.
#[derive(PartialEq, Copy, Clone, Debug)]
struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint<'a>(&self, text: &'a str, tone: Tone) -> Cow<'a, str> {
        if !self.enabled {
            return text.into();
        }
        let style = match tone {
            Tone::Header => Style::new().bold().white(),
            Tone::Muted => Style::new().magenta(),
            Tone::Issues => Style::new().red(),
            Tone::PullRequests => Style::new().red().bright(),
            Tone::Stars => Style::new().yellow(),
            Tone::Release => Style::new().white(),
            Tone::Accent => Style::new().cyan(),
        };
        style.apply_to(text).force_styling(true).to_string().into()
    }
}

const HEADERS: [&str; 7] = ["ACTIVITY", "ISSUES", "PR", "STAR", "REL", "RELEASED", "REPO"];

const ALIGNS: [Align; 7] =
    [Align::Left, Align::Right, Align::Right, Align::Right, Align::Left, Align::Left, Align::Left];

const COLUMN_GAP: &str = "  ";

#[derive(Debug)]
struct Cell {
    text: String,
    tone: Tone,
}

impl Cell {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self { text: text.into(), tone }
    }

    fn count(n: u64, tone: Tone) -> Self {
        let tone = if n > 0 { tone } else { Tone::Muted };
        Self::new(n.to_string(), tone)
    }

    fn optional(text: Option<String>) -> Self {
        match text {
            Some(x) => Self::new(x, Tone::Release),
            None => Self::new(NONE, Tone::Muted),
        }
    }
}

fn row_cells(record: &StatusRecord) -> [Cell; 7] {
    [
        Cell::new(record.last_activity.as_str(), Tone::Muted),
        Cell::count(record.open_issues, Tone::Issues),
        Cell::count(record.open_pull_requests, Tone::PullRequests),
        Cell::count(record.stars, Tone::Stars),
        Cell::optional(record.release_tag.clone()),
        Cell::optional(record.release_date.map(|x| x.format("%Y-%m-%d").to_string())),
        Cell::new(record.repo_id.to_string(), Tone::Accent),
    ]
}

fn text_width(text: &str) -> usize {
    text.graphemes(true).count()
}

fn pad(text: &str, width: usize, align: Align) -> String {
    // calc. how many spaces required to fill the column
    let deficit = width.saturating_sub(text_width(text));
    let spaces = " ".repeat(deficit);
    match align {
        Align::Left => format!("{text}{spaces}"),
        Align::Right => format!("{spaces}{text}"),
    }
}

/// Renders records as an aligned table, one line per record below a header line.
///
/// Text is padded before it is colored, so escape sequences never affect alignment. The last
/// column is not padded.
pub fn render_table(records: &[StatusRecord], color: bool) -> String {
    let palette = Palette { enabled: color };
    let rows: Vec<_> = records.iter().map(row_cells).collect();

    // find max length for each column
    let mut widths = HEADERS.map(text_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(text_width(&cell.text));
        }
    }

    let last = HEADERS.len() - 1;
    let mut out = String::new();

    let header: Vec<_> = HEADERS
        .iter()
        .enumerate()
        .map(|(idx, h)| if idx == last { h.to_string() } else { pad(h, widths[idx], ALIGNS[idx]) })
        .collect();
    out.push_str(&palette.paint(&header.join(COLUMN_GAP), Tone::Header));
    out.push('\n');

    for row in &rows {
        let line: Vec<_> = row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let text = if idx == last {
                    cell.text.clone()
                } else {
                    pad(&cell.text, widths[idx], ALIGNS[idx])
                };
                palette.paint(&text, cell.tone).into_owned()
            })
            .collect();
        out.push_str(&line.join(COLUMN_GAP));
        out.push('\n');
    }

    out
}
